mod combat;
mod spin;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::*;

/// Arbitrary fixed "now" for tests that don't care about the wall clock.
pub const T0: EpochMs = 1_000_000;

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

pub fn fireball() -> Power {
    Power::attack(10, "Fireball", "Common", 5, 3)
}

pub fn shield_wall() -> Power {
    Power::defense(11, "Shield Wall", "Rare", 10, 5)
}

pub fn riposte() -> Power {
    Power::counter(12, "Riposte", "Epic", 8, 3)
}

pub fn meteor() -> Power {
    Power::attack(13, "Meteor", "Legendary", 20, 5)
}

pub fn fixture_rarities() -> Vec<Rarity> {
    vec![
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
    ]
}

pub fn fixture_catalog() -> Catalog {
    Catalog::new(
        vec![fireball(), shield_wall(), riposte(), meteor()],
        fixture_rarities(),
    )
}

pub fn full_loadout() -> Loadout {
    Loadout::new(vec![fireball(), shield_wall(), riposte()])
}

/// A fresh battle between players 1 and 2, both with the full loadout.
pub fn fresh_battle() -> Battle {
    Battle::new(1, 1, full_loadout(), 2, full_loadout())
}

// ==========================================
// IN-MEMORY PLAYER STORE
// ==========================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRecord {
    pub money: i64,
    pub spins: i32,
    pub wins: u32,
    pub losses: u32,
    pub inventory: Vec<PowerId>,
}

#[derive(Default)]
pub struct TestAccounts {
    users: Mutex<HashMap<PlayerId, UserRecord>>,
    equipped: Mutex<HashMap<PlayerId, Vec<Power>>>,
}

impl TestAccounts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn give_spins(&self, player: PlayerId, spins: i32) {
        self.users
            .lock()
            .unwrap()
            .entry(player)
            .or_default()
            .spins += spins;
    }

    pub fn equip(&self, player: PlayerId, powers: Vec<Power>) {
        self.equipped.lock().unwrap().insert(player, powers);
    }

    pub fn record(&self, player: PlayerId) -> UserRecord {
        self.users
            .lock()
            .unwrap()
            .get(&player)
            .cloned()
            .unwrap_or_default()
    }
}

impl PlayerStore for TestAccounts {
    fn loadout(&self, player: PlayerId) -> EngineResult<Loadout> {
        let equipped = self.equipped.lock().unwrap();
        Ok(Loadout::new(
            equipped.get(&player).cloned().unwrap_or_default(),
        ))
    }

    fn apply(&self, player: PlayerId, delta: PlayerDelta) -> EngineResult<()> {
        let mut users = self.users.lock().unwrap();
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
        self.users
            .lock()
            .unwrap()
            .entry(player)
            .or_default()
            .inventory
            .push(power);
        Ok(())
    }
}

// ==========================================
// ARENA HELPERS
// ==========================================

pub fn new_arena() -> (Arc<Arena>, Arc<TestAccounts>) {
    let accounts = TestAccounts::new();
    let arena = Arc::new(Arena::new(
        Arc::new(fixture_catalog()),
        accounts.clone(),
        7,
    ));
    (arena, accounts)
}

/// Queue both players and return the battle id they were paired into.
pub fn start_battle(arena: &Arena, a: PlayerId, b: PlayerId) -> BattleId {
    assert!(!arena.find_match(a, T0).unwrap().matched);
    let view = arena.find_match(b, T0).unwrap();
    assert!(view.matched);
    view.battle_id.unwrap()
}
