//! Error types for engine operations
//!
//! Enum-based errors rather than strings so the server can map variants to
//! status codes and clients can branch on the `type` tag.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{BattleId, PlayerId, PowerId};

/// Errors that can occur while driving matchmaking, battles or spins.
///
/// All variants are recoverable, client-facing conditions. The engine keeps
/// serving other battles and players regardless of one request's failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineError {
    /// No battle with this id (never created, or already garbage-collected).
    BattleNotFound { battle_id: BattleId },
    /// The acting player is not one of the battle's two participants.
    NotAParticipant { player: PlayerId },
    /// Command issued against a battle that already finished.
    BattleFinished,
    /// The power is not in the actor's snapshotted loadout.
    PowerNotEquipped { power: PowerId },
    /// The power was used before its cooldown elapsed.
    PowerOnCooldown { ready_in_ms: u64 },
    /// The player is already waiting in the matchmaking queue.
    AlreadyQueued,
    /// The player is already fighting an active battle.
    AlreadyInBattle,
    /// Spin requested with a zero spin balance.
    InsufficientSpins,
    /// The catalog has no powers to draw from.
    CatalogEmpty,
    /// The player is unknown to the user store.
    UnknownPlayer { player: PlayerId },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BattleNotFound { battle_id } => write!(f, "battle {battle_id} not found"),
            Self::NotAParticipant { player } => {
                write!(f, "player {player} is not a participant in this battle")
            }
            Self::BattleFinished => write!(f, "battle is not active"),
            Self::PowerNotEquipped { power } => write!(f, "power {power} is not equipped"),
            Self::PowerOnCooldown { ready_in_ms } => {
                write!(f, "power on cooldown for another {ready_in_ms}ms")
            }
            Self::AlreadyQueued => write!(f, "already searching for a match"),
            Self::AlreadyInBattle => write!(f, "already in an active battle"),
            Self::InsufficientSpins => write!(f, "not enough spins"),
            Self::CatalogEmpty => write!(f, "power catalog is empty"),
            Self::UnknownPlayer { player } => write!(f, "player {player} not found"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
