use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    game::{Outcome, PlayerNumber},
    session::SessionId,
};

/// Analytics event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEventKind {
    GameStarted,
    GameFinished,
}

/// Session lifecycle event published for analytics consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub event_type: GameEventKind,
    pub game_id: SessionId,
    pub player1: String,
    pub player2: String,
    /// Winner's name, empty for a draw or an unfinished game
    pub winner: String,
    /// Seconds since the session started
    pub duration: i64,
    /// Unix seconds
    pub timestamp: i64,
}

impl GameEvent {
    pub fn started(game_id: SessionId, player1: &str, player2: &str) -> Self {
        Self {
            event_type: GameEventKind::GameStarted,
            game_id,
            player1: player1.to_string(),
            player2: player2.to_string(),
            winner: String::new(),
            duration: 0,
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn finished(
        game_id: SessionId,
        player1: &str,
        player2: &str,
        outcome: Outcome,
        started_at: chrono::DateTime<Utc>,
    ) -> Self {
        let winner = match outcome {
            Outcome::Winner(PlayerNumber::One) => player1,
            Outcome::Winner(PlayerNumber::Two) => player2,
            Outcome::Draw => "",
        };
        let now = Utc::now();

        Self {
            event_type: GameEventKind::GameFinished,
            game_id,
            player1: player1.to_string(),
            player2: player2.to_string(),
            winner: winner.to_string(),
            duration: (now - started_at).num_seconds().max(0),
            timestamp: now.timestamp(),
        }
    }
}
