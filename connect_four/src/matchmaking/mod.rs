//! Matchmaking: strictly FIFO human pairing with a timed bot fallback.

pub mod matchmaker;
pub mod queue;

pub use matchmaker::Matchmaker;
pub use queue::{MatchmakingQueue, Pairing};
