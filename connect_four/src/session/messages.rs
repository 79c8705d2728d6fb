//! Typed protocol between the transport layer and the session engine.
//!
//! Inbound frames arrive as a loose `{"type": ..., "data": ...}` envelope.
//! [`ClientMessage::parse`] narrows that envelope to exactly two variants and
//! rejects everything else at the boundary, so untyped data never reaches
//! the session logic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::SessionId;
use crate::game::{PlayerNumber, StateSnapshot};

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Enter matchmaking. `None` when the name was absent, blank or not a string.
    Join { display_name: Option<String> },
    /// Drop a piece. The column is not range-checked here.
    Move { column: i64 },
}

/// Inbound payloads that cannot be turned into a [`ClientMessage`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame is not a JSON envelope
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Envelope type is not one the engine understands
    #[error("Unknown message type: {0}")]
    UnknownType(String),

    /// Move without an integer column
    #[error("Move message is missing a numeric column")]
    MissingColumn,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl ClientMessage {
    /// Parse one text frame.
    ///
    /// Accepts `join_game`/`join` with `data.playerName` (or `data.username`)
    /// and `move`/`make_move` with `data.column`. Fractional columns are
    /// truncated toward zero.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;

        match envelope.kind.as_str() {
            "join_game" | "join" => {
                let display_name = ["playerName", "username"]
                    .iter()
                    .find_map(|key| envelope.data.get(key))
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string);

                Ok(ClientMessage::Join { display_name })
            }
            "move" | "make_move" => {
                let column = envelope
                    .data
                    .get("column")
                    .and_then(|value| value.as_i64().or_else(|| value.as_f64().map(|f| f.trunc() as i64)))
                    .ok_or(ProtocolError::MissingColumn)?;

                Ok(ClientMessage::Move { column })
            }
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }
}

/// Start-of-game announcement for one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStart {
    #[serde(rename = "gameID")]
    pub game_id: SessionId,
    pub opponent: String,
    pub player_number: PlayerNumber,
}

/// Messages pushed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    GameStart(GameStart),
    BoardUpdate(StateSnapshot),
}
