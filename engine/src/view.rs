//! Serializable snapshot views for the polling endpoints
//!
//! Field names match the wire contract (`player1_hp`, `battle_id`, ...), so
//! these serialize with serde defaults, no renaming.

use serde::Serialize;

use crate::battle::{Battle, BattleStatus};
use crate::types::{BattleId, EpochMs, PlayerId};

/// Read-only battle snapshot for `battle_state`. Never blocks on anything
/// beyond the battle's own lock; always the latest committed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleView {
    pub battle_id: BattleId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub player1_hp: i32,
    pub player2_hp: i32,
    pub player1_shield_until: EpochMs,
    pub player2_shield_until: EpochMs,
    pub player1_counter_until: EpochMs,
    pub player2_counter_until: EpochMs,
    pub status: BattleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<PlayerId>,
}

impl BattleView {
    pub fn from_battle(battle: &Battle) -> Self {
        Self {
            battle_id: battle.id,
            player1_id: battle.player1,
            player2_id: battle.player2,
            player1_hp: battle.hp[0],
            player2_hp: battle.hp[1],
            player1_shield_until: battle.shield_until[0],
            player2_shield_until: battle.shield_until[1],
            player1_counter_until: battle.counter_until[0],
            player2_counter_until: battle.counter_until[1],
            status: battle.status,
            winner_id: battle.winner,
        }
    }
}

/// Matchmaking snapshot for `find_match` / `check_match`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchView {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battle_id: Option<BattleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1_hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2_hp: Option<i32>,
}

impl MatchView {
    pub fn searching() -> Self {
        Self {
            matched: false,
            battle_id: None,
            opponent_id: None,
            player1_id: None,
            player2_id: None,
            player1_hp: None,
            player2_hp: None,
        }
    }

    /// Matched view from `viewer`'s perspective (fills `opponent_id`).
    pub fn matched_for(battle: &Battle, viewer: PlayerId) -> Self {
        let opponent = if viewer == battle.player1 {
            battle.player2
        } else {
            battle.player1
        };
        Self {
            matched: true,
            battle_id: Some(battle.id),
            opponent_id: Some(opponent),
            player1_id: Some(battle.player1),
            player2_id: Some(battle.player2),
            player1_hp: Some(battle.hp[0]),
            player2_hp: Some(battle.hp[1]),
        }
    }
}
