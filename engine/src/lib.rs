mod battle;
mod catalog;
mod engine;
mod error;
mod matchmaking;
mod rewards;
mod rng;
mod spin;
mod types;
mod view;

#[cfg(test)]
mod tests;

pub use battle::*;
pub use catalog::Catalog;
pub use engine::Arena;
pub use error::{EngineError, EngineResult};
pub use matchmaking::{MatchQueue, QueueEntry, QUEUE_TIMEOUT_MS};
pub use rewards::{PlayerDelta, PlayerStore, SEARCH_REFUND_MONEY, VICTORY_MONEY, VICTORY_SPINS};
pub use rng::{DrawRng, XorShiftRng};
pub use spin::SpinResolver;
pub use types::*;
pub use view::*;
