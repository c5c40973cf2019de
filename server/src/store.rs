//! In-memory stand-ins for the external user, inventory and catalog services.
//!
//! The engine only ever talks to these through its [`PlayerStore`] seam; a
//! real deployment would back them with the authoritative user store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use powerclash_engine::{
    Catalog, EngineError, EngineResult, Loadout, PlayerDelta, PlayerId, PlayerStore, Power,
    PowerId, Rarity, MAX_LOADOUT_SLOTS,
};

#[derive(Debug, Clone, Default)]
pub struct UserRecord {
    pub money: i64,
    pub spins: i32,
    pub wins: u32,
    pub losses: u32,
    pub inventory: Vec<PowerId>,
    pub equipped: Vec<PowerId>,
}

pub struct MemoryStore {
    catalog: Arc<Catalog>,
    users: Mutex<HashMap<PlayerId, UserRecord>>,
}

impl MemoryStore {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Unknown players are created lazily with zero balances, the way the
    /// auth service registers them.
    pub fn record(&self, player: PlayerId) -> UserRecord {
        self.users
            .lock()
            .expect("user store poisoned")
            .entry(player)
            .or_default()
            .clone()
    }

    /// The player's equipped powers, resolved against the catalog.
    pub fn equipped_powers(&self, player: PlayerId) -> Vec<Power> {
        self.record(player)
            .equipped
            .iter()
            .filter_map(|id| self.catalog.power(*id).cloned())
            .collect()
    }
}

impl PlayerStore for MemoryStore {
    fn loadout(&self, player: PlayerId) -> EngineResult<Loadout> {
        Ok(Loadout::new(self.equipped_powers(player)))
    }

    fn apply(&self, player: PlayerId, delta: PlayerDelta) -> EngineResult<()> {
        let mut users = self.users.lock().expect("user store poisoned");
        let record = users.entry(player).or_default();
        if record.spins + delta.spins < 0 {
            return Err(EngineError::InsufficientSpins);
        }
        record.money += delta.money;
        record.spins += delta.spins;
        record.wins += delta.wins;
        record.losses += delta.losses;
        Ok(())
    }

    fn grant_power(&self, player: PlayerId, power: PowerId) -> EngineResult<()> {
        let mut users = self.users.lock().expect("user store poisoned");
        let record = users.entry(player).or_default();
        record.inventory.push(power);
        // Stand-in equip policy: newly drawn powers fill free loadout slots
        // until the external inventory service manages equips.
        if record.equipped.len() < MAX_LOADOUT_SLOTS && !record.equipped.contains(&power) {
            record.equipped.push(power);
        }
        Ok(())
    }
}

/// Default catalog seeded at startup. A real deployment reads this from the
/// admin/catalog service.
pub fn default_catalog() -> Catalog {
    let rarities = vec![
        Rarity {
            id: 1,
            name: "Common".to_string(),
            drop_chance: 70.0,
            color: "#9ca3af".to_string(),
        },
        Rarity {
            id: 2,
            name: "Rare".to_string(),
            drop_chance: 20.0,
            color: "#3b82f6".to_string(),
        },
        Rarity {
            id: 3,
            name: "Epic".to_string(),
            drop_chance: 9.0,
            color: "#a855f7".to_string(),
        },
        Rarity {
            id: 4,
            name: "Legendary".to_string(),
            drop_chance: 1.0,
            color: "#f59e0b".to_string(),
        },
    ];
    let powers = vec![
        Power::attack(1, "Quick Jab", "Common", 3, 1),
        Power::attack(2, "Fireball", "Common", 5, 3),
        Power::defense(3, "Stone Skin", "Common", 8, 3),
        Power::defense(4, "Shield Wall", "Rare", 10, 5),
        Power::counter(5, "Riposte", "Rare", 8, 3),
        Power::attack(6, "Lightning Strike", "Epic", 10, 5),
        Power::counter(7, "Mirror Ward", "Epic", 12, 4),
        Power::attack(8, "Meteor", "Legendary", 20, 7),
    ];
    Catalog::new(powers, rarities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_user_creation_starts_at_zero() {
        let store = MemoryStore::new(Arc::new(default_catalog()));
        let record = store.record(42);
        assert_eq!(record.money, 0);
        assert_eq!(record.spins, 0);
    }

    #[test]
    fn test_granted_powers_fill_free_slots() {
        let store = MemoryStore::new(Arc::new(default_catalog()));
        for id in [1, 2, 3, 4] {
            store.grant_power(9, id).unwrap();
        }
        let record = store.record(9);
        assert_eq!(record.inventory, vec![1, 2, 3, 4]);
        assert_eq!(record.equipped, vec![1, 2, 3]);

        let loadout = store.loadout(9).unwrap();
        assert!(loadout.get(1).is_some());
        assert!(loadout.get(4).is_none());
    }

    #[test]
    fn test_spin_debit_needs_balance() {
        let store = MemoryStore::new(Arc::new(default_catalog()));
        assert_eq!(
            store.apply(1, PlayerDelta::spin_debit()),
            Err(EngineError::InsufficientSpins)
        );
    }
}
