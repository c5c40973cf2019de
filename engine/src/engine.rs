//! The arena: concurrent owner of all active battles and the matchmaking
//! queue.
//!
//! Locking discipline: the battle table is a keyed store of per-battle
//! mutexes, so mutations to one battle never contend with another. Pairing
//! holds the queue lock across battle insertion so two concurrent polls can
//! never pair the same player twice. Lock order is queue, then table, then a
//! single battle; nothing slow or remote runs inside any of these sections
//! ([`PlayerStore`] implementations are expected to be local and bounded).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::battle::{
    AttackOutcome, Battle, PowerOutcome, FINISHED_RETENTION_MS,
};
use crate::catalog::Catalog;
use crate::error::{EngineError, EngineResult};
use crate::matchmaking::MatchQueue;
use crate::rewards::{PlayerDelta, PlayerStore};
use crate::spin::SpinResolver;
use crate::types::{BattleId, EpochMs, Loadout, PlayerId, PowerId};
use crate::view::{BattleView, MatchView};

#[derive(Default)]
struct BattleTable {
    next_id: BattleId,
    by_id: HashMap<BattleId, Arc<Mutex<Battle>>>,
    by_player: HashMap<PlayerId, BattleId>,
}

pub struct Arena {
    accounts: Arc<dyn PlayerStore>,
    spins: SpinResolver,
    queue: Mutex<MatchQueue>,
    battles: Mutex<BattleTable>,
}

impl Arena {
    pub fn new(catalog: Arc<Catalog>, accounts: Arc<dyn PlayerStore>, spin_seed: u64) -> Self {
        Self {
            accounts,
            spins: SpinResolver::new(catalog, spin_seed),
            queue: Mutex::new(MatchQueue::new()),
            battles: Mutex::new(BattleTable {
                next_id: 1,
                ..BattleTable::default()
            }),
        }
    }

    // ==========================================
    // Matchmaking
    // ==========================================

    /// Add a player to the matchmaking queue without pairing.
    pub fn enqueue(&self, player: PlayerId, now: EpochMs) -> EngineResult<()> {
        if self.active_battle_of(player).is_some() {
            return Err(EngineError::AlreadyInBattle);
        }
        let mut queue = self.queue.lock().expect("queue lock poisoned");
        queue.expire_stale(now);
        queue.enqueue(player, now)
    }

    /// Poll-style matchmaking: report an existing match, otherwise join the
    /// queue (idempotent) and pair the earliest waiting players FIFO.
    pub fn find_match(&self, player: PlayerId, now: EpochMs) -> EngineResult<MatchView> {
        if let Some(handle) = self.active_battle_of(player) {
            let battle = handle.lock().expect("battle lock poisoned");
            return Ok(MatchView::matched_for(&battle, player));
        }

        let mut queue = self.queue.lock().expect("queue lock poisoned");
        queue.expire_stale(now);
        if !queue.is_queued(player) {
            queue.enqueue(player, now)?;
        }

        let mut matched = MatchView::searching();
        while let Some((a, b)) = queue.peek_pair() {
            // Loadouts are snapshotted while the pair is still queued, so a
            // store failure leaves both players searching instead of
            // silently dropping them half-paired.
            let loadout_a = self.accounts.loadout(a)?;
            let loadout_b = self.accounts.loadout(b)?;
            let _ = queue.take_pair();
            let handle = self.create_battle(a, loadout_a, b, loadout_b);
            if a == player || b == player {
                let battle = handle.lock().expect("battle lock poisoned");
                matched = MatchView::matched_for(&battle, player);
            }
        }
        Ok(matched)
    }

    /// Passive query: is the player in an active battle?
    pub fn check_match(&self, player: PlayerId) -> MatchView {
        match self.active_battle_of(player) {
            Some(handle) => {
                let battle = handle.lock().expect("battle lock poisoned");
                MatchView::matched_for(&battle, player)
            }
            None => MatchView::searching(),
        }
    }

    /// Remove the player's queue entry. Idempotent; returns whether an entry
    /// was removed so the caller can apply the cancel refund exactly once.
    pub fn cancel_search(&self, player: PlayerId) -> bool {
        self.queue
            .lock()
            .expect("queue lock poisoned")
            .cancel(player)
    }

    fn create_battle(
        &self,
        a: PlayerId,
        loadout_a: Loadout,
        b: PlayerId,
        loadout_b: Loadout,
    ) -> Arc<Mutex<Battle>> {
        let mut table = self.battles.lock().expect("battle table lock poisoned");
        let id = table.next_id;
        table.next_id += 1;

        let battle = Battle::new(id, a, loadout_a, b, loadout_b);
        log::info!(
            "battle {id} created: {} vs {}",
            battle.player1,
            battle.player2
        );
        let handle = Arc::new(Mutex::new(battle));
        table.by_id.insert(id, Arc::clone(&handle));
        table.by_player.insert(a, id);
        table.by_player.insert(b, id);
        handle
    }

    // ==========================================
    // Battle commands
    // ==========================================

    /// Plain attack for the fixed base damage.
    pub fn attack(
        &self,
        battle_id: BattleId,
        actor: PlayerId,
        now: EpochMs,
    ) -> EngineResult<AttackOutcome> {
        let handle = self.battle_handle(battle_id)?;
        let (outcome, settlement) = {
            let mut battle = handle.lock().expect("battle lock poisoned");
            let outcome = battle.attack(actor, now)?;
            (outcome.clone(), settlement_of(&battle, &outcome))
        };
        if let Some((winner, loser)) = settlement {
            self.settle(winner, loser);
        }
        Ok(outcome)
    }

    /// Use a power from the actor's snapshotted loadout.
    pub fn use_power(
        &self,
        battle_id: BattleId,
        actor: PlayerId,
        power_id: PowerId,
        now: EpochMs,
    ) -> EngineResult<PowerOutcome> {
        let handle = self.battle_handle(battle_id)?;
        let (outcome, settlement) = {
            let mut battle = handle.lock().expect("battle lock poisoned");
            let outcome = battle.use_power(actor, power_id, now)?;
            let settlement = match &outcome {
                PowerOutcome::Struck(attack) => settlement_of(&battle, attack),
                _ => None,
            };
            (outcome, settlement)
        };
        if let Some((winner, loser)) = settlement {
            self.settle(winner, loser);
        }
        Ok(outcome)
    }

    /// Non-blocking snapshot of a battle's committed state. Keeps answering
    /// for finished battles until they are garbage-collected.
    pub fn battle_state(&self, battle_id: BattleId) -> EngineResult<BattleView> {
        let handle = self.battle_handle(battle_id)?;
        let battle = handle.lock().expect("battle lock poisoned");
        Ok(BattleView::from_battle(&battle))
    }

    /// Draw a power for one spin credit.
    pub fn spin(&self, player: PlayerId) -> EngineResult<crate::types::Power> {
        self.spins.spin(&*self.accounts, player)
    }

    // ==========================================
    // Housekeeping
    // ==========================================

    /// Periodic sweep: expire stale queue entries and drop finished battles
    /// past their retention window. Called by the server on a timer.
    pub fn maintain(&self, now: EpochMs) {
        self.queue
            .lock()
            .expect("queue lock poisoned")
            .expire_stale(now);

        let mut table = self.battles.lock().expect("battle table lock poisoned");
        let mut dead: Vec<BattleId> = Vec::new();
        for (id, handle) in &table.by_id {
            let battle = handle.lock().expect("battle lock poisoned");
            if let Some(finished_at) = battle.finished_at {
                if now.saturating_sub(finished_at) >= FINISHED_RETENTION_MS {
                    dead.push(*id);
                }
            }
        }
        for id in dead {
            if let Some(handle) = table.by_id.remove(&id) {
                let battle = handle.lock().expect("battle lock poisoned");
                // The players may already be mapped to a newer battle.
                for player in [battle.player1, battle.player2] {
                    if table.by_player.get(&player) == Some(&id) {
                        table.by_player.remove(&player);
                    }
                }
                log::debug!("battle {id} garbage-collected");
            }
        }
    }

    fn battle_handle(&self, battle_id: BattleId) -> EngineResult<Arc<Mutex<Battle>>> {
        let table = self.battles.lock().expect("battle table lock poisoned");
        table
            .by_id
            .get(&battle_id)
            .cloned()
            .ok_or(EngineError::BattleNotFound { battle_id })
    }

    fn active_battle_of(&self, player: PlayerId) -> Option<Arc<Mutex<Battle>>> {
        let table = self.battles.lock().expect("battle table lock poisoned");
        let id = table.by_player.get(&player)?;
        let handle = table.by_id.get(id).cloned()?;
        if handle.lock().expect("battle lock poisoned").is_active() {
            Some(handle)
        } else {
            None
        }
    }

    /// Credit both players once, on the `Active -> Finished` transition only.
    /// The transition happens under the battle lock exactly once, so a
    /// settlement pair is produced exactly once per battle; later commands
    /// fail `BattleFinished` before reaching resolution.
    fn settle(&self, winner: PlayerId, loser: PlayerId) {
        if let Err(err) = self.accounts.apply(winner, PlayerDelta::victory()) {
            log::error!("victory settlement for player {winner} failed: {err}");
        }
        if let Err(err) = self.accounts.apply(loser, PlayerDelta::defeat()) {
            log::error!("defeat settlement for player {loser} failed: {err}");
        }
        log::info!("settled battle rewards: winner {winner}, loser {loser}");
    }
}

/// Winner/loser pair when this outcome is the finishing one, `None` otherwise.
fn settlement_of(battle: &Battle, outcome: &AttackOutcome) -> Option<(PlayerId, PlayerId)> {
    if !outcome.finished {
        return None;
    }
    let winner = outcome.winner_id?;
    let loser = if winner == battle.player1 {
        battle.player2
    } else {
        battle.player1
    };
    Some((winner, loser))
}
