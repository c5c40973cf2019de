//! Reward settlement and the user-record seam
//!
//! The engine never owns the authoritative player record; it issues deltas
//! through [`PlayerStore`] exactly once per terminal transition.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::types::{Loadout, PlayerId, PowerId};

/// Money credited to a battle winner.
pub const VICTORY_MONEY: i64 = 100;
/// Spins credited to a battle winner.
pub const VICTORY_SPINS: i32 = 1;
/// Money refunded when a player cancels a match search.
pub const SEARCH_REFUND_MONEY: i64 = 10;

/// A delta against a player record. Positive values credit, negative debit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDelta {
    pub money: i64,
    pub spins: i32,
    pub wins: u32,
    pub losses: u32,
}

impl PlayerDelta {
    pub fn victory() -> Self {
        Self {
            money: VICTORY_MONEY,
            spins: VICTORY_SPINS,
            wins: 1,
            ..Self::default()
        }
    }

    pub fn defeat() -> Self {
        Self {
            losses: 1,
            ..Self::default()
        }
    }

    pub fn search_refund() -> Self {
        Self {
            money: SEARCH_REFUND_MONEY,
            ..Self::default()
        }
    }

    /// One spin consumed by the spin resolver.
    pub fn spin_debit() -> Self {
        Self {
            spins: -1,
            ..Self::default()
        }
    }
}

/// External user-record store consumed by the engine.
///
/// `apply` must reject a delta that would drive the spin balance negative
/// with [`crate::EngineError::InsufficientSpins`], and must apply each call
/// atomically with respect to other calls for the same player.
pub trait PlayerStore: Send + Sync {
    /// The player's currently equipped powers, read once at battle start.
    fn loadout(&self, player: PlayerId) -> EngineResult<Loadout>;

    /// Apply a balance/record delta to the player.
    fn apply(&self, player: PlayerId, delta: PlayerDelta) -> EngineResult<()>;

    /// Append a drawn power to the player's inventory.
    fn grant_power(&self, player: PlayerId, power: PowerId) -> EngineResult<()>;
}
