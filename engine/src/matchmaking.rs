//! FIFO matchmaking queue
//!
//! Plain data structure with `&mut` operations; [`crate::Arena`] wraps it in a
//! mutex so that pairing and battle insertion share one critical section.

use std::collections::VecDeque;

use crate::error::{EngineError, EngineResult};
use crate::types::{EpochMs, PlayerId};

/// Queue entries older than this are expired server-side. Matches the
/// client's search timeout, but never relies on the client calling cancel.
pub const QUEUE_TIMEOUT_MS: u64 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    pub player: PlayerId,
    pub enqueued_at: EpochMs,
}

#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: VecDeque<QueueEntry>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player to the back of the queue.
    pub fn enqueue(&mut self, player: PlayerId, now: EpochMs) -> EngineResult<()> {
        if self.is_queued(player) {
            return Err(EngineError::AlreadyQueued);
        }
        self.entries.push_back(QueueEntry {
            player,
            enqueued_at: now,
        });
        log::debug!("player {player} enqueued for matchmaking");
        Ok(())
    }

    pub fn is_queued(&self, player: PlayerId) -> bool {
        self.entries.iter().any(|e| e.player == player)
    }

    /// Remove a player's entry. Idempotent; reports whether one was removed.
    pub fn cancel(&mut self, player: PlayerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.player != player);
        before != self.entries.len()
    }

    /// The two earliest-enqueued players, without removing them. Lets the
    /// caller run fallible pre-pairing work (loadout snapshots) while both
    /// entries are still safely queued.
    pub fn peek_pair(&self) -> Option<(PlayerId, PlayerId)> {
        if self.entries.len() < 2 {
            return None;
        }
        Some((self.entries[0].player, self.entries[1].player))
    }

    /// Pop the two earliest-enqueued players for pairing.
    ///
    /// First-available pairing: strictly FIFO, no skill matching. Returns
    /// `None` unless at least two players are waiting.
    pub fn take_pair(&mut self) -> Option<(PlayerId, PlayerId)> {
        if self.entries.len() < 2 {
            return None;
        }
        let first = self.entries.pop_front()?;
        let second = self.entries.pop_front()?;
        Some((first.player, second.player))
    }

    /// Drop entries older than [`QUEUE_TIMEOUT_MS`]. Expiry has no side
    /// effect on player state.
    pub fn expire_stale(&mut self, now: EpochMs) -> Vec<PlayerId> {
        let mut expired = Vec::new();
        self.entries.retain(|e| {
            let stale = now.saturating_sub(e.enqueued_at) >= QUEUE_TIMEOUT_MS;
            if stale {
                expired.push(e.player);
            }
            !stale
        });
        for player in &expired {
            log::debug!("matchmaking entry for player {player} expired");
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
