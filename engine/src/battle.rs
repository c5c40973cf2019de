//! The per-battle state machine: HP, shields, counters, cooldowns, win
//! detection. Pure state, no locking and no wall clock; callers pass `now`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{BattleId, EpochMs, Loadout, PlayerId, PowerId, PowerType};

/// HP both players start with.
pub const STARTING_HP: i32 = 10;
/// HP ceiling; HP is always clamped to `[0, MAX_HP]`.
pub const MAX_HP: i32 = 10;
/// Damage dealt by a plain (power-less) attack.
pub const BASE_ATTACK_DAMAGE: i32 = 2;
/// How long an armed counter stance stays active.
pub const COUNTER_WINDOW_MS: u64 = 3_000;
/// How long a finished battle is retained so both clients can observe the
/// terminal state before it is garbage-collected.
pub const FINISHED_RETENTION_MS: u64 = 5_000;

/// One of the two seats in a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleStatus {
    Active,
    Finished,
}

/// Result of an attack resolution (plain or attack-type power).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackOutcome {
    pub player1_hp: i32,
    pub player2_hp: i32,
    /// The defender's shield absorbed the hit; no HP changed.
    pub blocked: bool,
    /// The defender's counter stance reflected the hit onto the attacker.
    pub countered: bool,
    /// Damage the attacker took from a counter (0 unless `countered`).
    pub damage_taken: i32,
    pub finished: bool,
    pub winner_id: Option<PlayerId>,
}

/// Result of using a power.
#[derive(Debug, Clone)]
pub enum PowerOutcome {
    /// An attack-type power resolved like a plain attack with its damage.
    Struck(AttackOutcome),
    /// A defense power raised a shield.
    Shielded { until: EpochMs, duration_secs: u32 },
    /// A counter power armed a counter stance.
    CounterArmed { until: EpochMs },
}

/// A single battle between two players.
///
/// Invariant: `player1 < player2` by numeric id; this ordering is the sole
/// tie-break clients use to map "me" vs "opponent" and is stable for the
/// battle's lifetime.
#[derive(Debug, Clone)]
pub struct Battle {
    pub id: BattleId,
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub(crate) hp: [i32; 2],
    pub(crate) shield_until: [EpochMs; 2],
    pub(crate) counter_until: [EpochMs; 2],
    counter_damage: [i32; 2],
    /// Per-side, per-power earliest next-use timestamp. Server-side authority;
    /// the client's cooldown display is advisory only.
    cooldown_ready_at: [HashMap<PowerId, EpochMs>; 2],
    loadouts: [Loadout; 2],
    pub status: BattleStatus,
    pub winner: Option<PlayerId>,
    pub(crate) finished_at: Option<EpochMs>,
}

impl Battle {
    /// Create a battle between two players with their snapshotted loadouts.
    /// Seats are assigned by ascending player id regardless of argument order.
    pub fn new(
        id: BattleId,
        a: PlayerId,
        loadout_a: Loadout,
        b: PlayerId,
        loadout_b: Loadout,
    ) -> Self {
        debug_assert_ne!(a, b);
        let ((player1, loadout1), (player2, loadout2)) = if a < b {
            ((a, loadout_a), (b, loadout_b))
        } else {
            ((b, loadout_b), (a, loadout_a))
        };
        Self {
            id,
            player1,
            player2,
            hp: [STARTING_HP; 2],
            shield_until: [0; 2],
            counter_until: [0; 2],
            counter_damage: [0; 2],
            cooldown_ready_at: [HashMap::new(), HashMap::new()],
            loadouts: [loadout1, loadout2],
            status: BattleStatus::Active,
            winner: None,
            finished_at: None,
        }
    }

    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if player == self.player1 {
            Some(Side::One)
        } else if player == self.player2 {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn player_at(&self, side: Side) -> PlayerId {
        match side {
            Side::One => self.player1,
            Side::Two => self.player2,
        }
    }

    pub fn hp(&self, side: Side) -> i32 {
        self.hp[side.index()]
    }

    pub fn is_active(&self) -> bool {
        self.status == BattleStatus::Active
    }

    fn require_active(&self) -> EngineResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(EngineError::BattleFinished)
        }
    }

    fn require_side(&self, player: PlayerId) -> EngineResult<Side> {
        self.side_of(player)
            .ok_or(EngineError::NotAParticipant { player })
    }

    /// Plain attack for the fixed base damage.
    pub fn attack(&mut self, actor: PlayerId, now: EpochMs) -> EngineResult<AttackOutcome> {
        self.require_active()?;
        let side = self.require_side(actor)?;
        Ok(self.strike(side, BASE_ATTACK_DAMAGE, now))
    }

    /// Use a power from the actor's snapshotted loadout.
    ///
    /// The cooldown starts on every use, whatever the outcome; a blocked
    /// attack power still goes on cooldown.
    pub fn use_power(
        &mut self,
        actor: PlayerId,
        power_id: PowerId,
        now: EpochMs,
    ) -> EngineResult<PowerOutcome> {
        self.require_active()?;
        let side = self.require_side(actor)?;
        let power = self.loadouts[side.index()]
            .get(power_id)
            .cloned()
            .ok_or(EngineError::PowerNotEquipped { power: power_id })?;

        let ready_at = self.cooldown_ready_at[side.index()]
            .get(&power_id)
            .copied()
            .unwrap_or(0);
        if now < ready_at {
            return Err(EngineError::PowerOnCooldown {
                ready_in_ms: ready_at - now,
            });
        }
        self.cooldown_ready_at[side.index()].insert(power_id, now + power.cooldown_ms());

        let outcome = match power.power_type {
            PowerType::Attack => PowerOutcome::Struck(self.strike(side, power.damage, now)),
            PowerType::Defense => {
                let until = now + u64::from(power.shield_duration_secs) * 1000;
                self.shield_until[side.index()] = until;
                PowerOutcome::Shielded {
                    until,
                    duration_secs: power.shield_duration_secs,
                }
            }
            PowerType::Counter => {
                let until = now + COUNTER_WINDOW_MS;
                self.counter_until[side.index()] = until;
                self.counter_damage[side.index()] = power.damage;
                PowerOutcome::CounterArmed { until }
            }
        };
        Ok(outcome)
    }

    /// Resolve a hit from `attacker` against the opposite side.
    ///
    /// Shield is checked before counter. A triggered counter is consumed; a
    /// shield persists until it expires on its own.
    fn strike(&mut self, attacker: Side, damage: i32, now: EpochMs) -> AttackOutcome {
        let defender = attacker.opponent();

        if self.shield_until[defender.index()] > now {
            return self.outcome(true, false, 0);
        }

        if self.counter_until[defender.index()] > now {
            let reflected = self.counter_damage[defender.index()];
            self.counter_until[defender.index()] = 0;
            self.counter_damage[defender.index()] = 0;
            self.hp[attacker.index()] = (self.hp[attacker.index()] - reflected).clamp(0, MAX_HP);
            self.check_end(attacker, now);
            return self.outcome(false, true, reflected);
        }

        self.hp[defender.index()] = (self.hp[defender.index()] - damage).clamp(0, MAX_HP);
        self.check_end(attacker, now);
        self.outcome(false, false, 0)
    }

    /// Finish the battle if either HP reached zero. Winner is the side with
    /// HP left; if both are at zero the attacker loses.
    fn check_end(&mut self, attacker: Side, now: EpochMs) {
        if self.hp[0] > 0 && self.hp[1] > 0 {
            return;
        }
        let winner = if self.hp[0] <= 0 && self.hp[1] <= 0 {
            attacker.opponent()
        } else if self.hp[0] > 0 {
            Side::One
        } else {
            Side::Two
        };
        self.status = BattleStatus::Finished;
        self.winner = Some(self.player_at(winner));
        self.finished_at = Some(now);
        log::info!(
            "battle {} finished, winner {}",
            self.id,
            self.player_at(winner)
        );
    }

    fn outcome(&self, blocked: bool, countered: bool, damage_taken: i32) -> AttackOutcome {
        AttackOutcome {
            player1_hp: self.hp[0],
            player2_hp: self.hp[1],
            blocked,
            countered,
            damage_taken,
            finished: self.status == BattleStatus::Finished,
            winner_id: self.winner,
        }
    }
}
