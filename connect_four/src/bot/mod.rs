//! Automated opponent used when no second human arrives in time.
//!
//! The bot plays a fixed heuristic with no search:
//!
//! 1. Take a column that wins immediately.
//! 2. Otherwise block a column where the opponent would win immediately.
//! 3. Otherwise play the center column if it is open.
//! 4. Otherwise play the lowest-indexed open column.
//!
//! Ties inside a tier go to the lowest column index.

pub mod decision;

pub use decision::{BotDecision, BotDecisionMaker, DecisionReason, choose_column};
