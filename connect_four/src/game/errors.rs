//! Illegal move taxonomy.

use thiserror::Error;

use super::entities::PlayerNumber;
use crate::session::SessionId;

/// Reasons a move is rejected. Rejected moves never mutate the board and
/// never trigger a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Session already reached a terminal state
    #[error("Game is already over")]
    GameOver,

    /// Mover is not the current-turn player
    #[error("Not your turn: current player is {expected}, move came from {actual}")]
    NotYourTurn {
        expected: PlayerNumber,
        actual: PlayerNumber,
    },

    /// Column index outside the grid
    #[error("Column {0} is out of range")]
    ColumnOutOfRange(i64),

    /// Column top cell is occupied
    #[error("Column {0} is full")]
    ColumnFull(usize),

    /// Participant has not been paired yet
    #[error("Participant has no active session")]
    NoActiveSession,

    /// Session id is not in the registry
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),

    /// Participant is not seated in the session
    #[error("Participant is not seated in this session")]
    NotInSession,
}

/// Result type for move operations
pub type MoveResult<T> = Result<T, MoveError>;
