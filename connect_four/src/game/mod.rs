//! Connect Four rules: the drop grid, win detection and the values that
//! describe a game in progress.

pub mod board;
pub mod entities;
pub mod errors;

pub use board::{Board, CENTER_COLUMN, COLS, ROWS};
pub use entities::{MoveRecord, Outcome, PlayerNumber, StateSnapshot};
pub use errors::{MoveError, MoveResult};
