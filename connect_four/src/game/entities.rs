use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::board::{Board, COLS, ROWS};

/// Seat number inside a session. Player one always moves first.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PlayerNumber {
    One,
    Two,
}

impl PlayerNumber {
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl From<PlayerNumber> for u8 {
    fn from(value: PlayerNumber) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for PlayerNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("invalid player number {other}")),
        }
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// How a finished session ended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner(PlayerNumber),
    /// Full board without four in a row.
    Draw,
}

impl Outcome {
    /// Wire code for the winner: 0 for a draw, otherwise the player number.
    pub fn winner_code(&self) -> u8 {
        match self {
            Self::Winner(player) => player.as_u8(),
            Self::Draw => 0,
        }
    }
}

/// One accepted drop, kept for post-game persistence.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MoveRecord {
    pub column: usize,
    pub player: PlayerNumber,
    pub timestamp: DateTime<Utc>,
}

/// Authoritative view of a session pushed to both participants.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Row 0 is the top of the grid.
    pub board: [[u8; COLS]; ROWS],
    pub current_player: PlayerNumber,
    pub game_over: bool,
    /// 0 = none or draw, otherwise the winning player number.
    pub winner: u8,
}

impl StateSnapshot {
    pub fn new(board: &Board, current_player: PlayerNumber, outcome: Option<Outcome>) -> Self {
        Self {
            board: board.to_grid(),
            current_player,
            game_over: outcome.is_some(),
            winner: outcome.map_or(0, |o| o.winner_code()),
        }
    }
}
