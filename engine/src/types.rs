use serde::{Deserialize, Serialize};

/// Unique identifier for players. Assigned by the external user store.
pub type PlayerId = u32;

/// Unique identifier for catalog powers.
pub type PowerId = u32;

/// Unique identifier for battles.
pub type BattleId = u64;

/// Epoch timestamp in milliseconds. `0` means "never" / "not active".
pub type EpochMs = u64;

/// Maximum number of equipped powers per player.
pub const MAX_LOADOUT_SLOTS: usize = 3;

/// What a power does when used in battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerType {
    /// Deals its `damage` to the opponent, subject to shield/counter resolution.
    Attack,
    /// Raises a shield on the user for `shield_duration_secs`.
    Defense,
    /// Arms a counter stance that reflects `damage` onto the next attacker.
    Counter,
}

/// A catalog-defined ability. Read-only to the engine.
///
/// Invariant: exactly one of `damage` / `shield_duration_secs` is nonzero,
/// determined by `power_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Power {
    pub id: PowerId,
    pub name: String,
    pub rarity: String,
    pub power_type: PowerType,
    pub cooldown_secs: u32,
    pub damage: i32,
    pub shield_duration_secs: u32,
}

impl Power {
    pub fn attack(id: PowerId, name: &str, rarity: &str, cooldown_secs: u32, damage: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            rarity: rarity.to_string(),
            power_type: PowerType::Attack,
            cooldown_secs,
            damage,
            shield_duration_secs: 0,
        }
    }

    pub fn defense(
        id: PowerId,
        name: &str,
        rarity: &str,
        cooldown_secs: u32,
        shield_duration_secs: u32,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            rarity: rarity.to_string(),
            power_type: PowerType::Defense,
            cooldown_secs,
            damage: 0,
            shield_duration_secs,
        }
    }

    pub fn counter(id: PowerId, name: &str, rarity: &str, cooldown_secs: u32, damage: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            rarity: rarity.to_string(),
            power_type: PowerType::Counter,
            cooldown_secs,
            damage,
            shield_duration_secs: 0,
        }
    }

    /// Cooldown in milliseconds, the unit battle timestamps use.
    pub fn cooldown_ms(&self) -> u64 {
        u64::from(self.cooldown_secs) * 1000
    }
}

/// A catalog rarity tier with its gacha weight and display color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rarity {
    pub id: u32,
    pub name: String,
    /// Drop weight as a percentage. The spin resolver renormalizes, so the
    /// catalog does not have to sum to exactly 100.
    pub drop_chance: f64,
    pub color: String,
}

/// A player's equipped powers, snapshotted by value at battle start.
///
/// Slot order is preserved; equip changes after the snapshot never affect a
/// running battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    powers: Vec<Power>,
}

impl Loadout {
    /// Build a loadout from equipped powers, keeping at most
    /// [`MAX_LOADOUT_SLOTS`] entries.
    pub fn new(mut powers: Vec<Power>) -> Self {
        powers.truncate(MAX_LOADOUT_SLOTS);
        Self { powers }
    }

    pub fn empty() -> Self {
        Self { powers: Vec::new() }
    }

    pub fn get(&self, power_id: PowerId) -> Option<&Power> {
        self.powers.iter().find(|p| p.id == power_id)
    }

    pub fn powers(&self) -> &[Power] {
        &self.powers
    }
}
