//! WebSocket transport for matchmaking and live games.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Client sends `{"type": "join_game", "data": {"playerName": "alice"}}`
//! 3. Server queues the player and, once paired, pushes `game_start` and
//!    `board_update` frames
//! 4. Client sends `{"type": "move", "data": {"column": 3}}` on its turn
//! 5. On disconnect a still-queued player is removed from the queue; a
//!    seated player's session keeps running
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8080/ws');
//!
//! ws.onopen = () => ws.send(JSON.stringify({ type: "join_game", data: { playerName: "alice" } }));
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === "board_update") {
//!     render(msg.data.board);
//!   }
//! };
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use connect_four::{
    MoveError,
    session::{ClientMessage, Connection, MatchConfig, Participant, ProtocolError},
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::sync::Arc;

use super::{AppState, rate_limiter::RateLimiter};
use crate::{logging, metrics};

/// Upgrade an HTTP connection to the game WebSocket.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection state owned by the receive loop.
struct ConnectionState {
    /// Outbound handle, moved into the participant on join
    connection: Option<Connection>,
    participant: Option<Arc<Participant>>,
    limiter: RateLimiter,
}

/// Handle an established WebSocket connection.
///
/// Spawns a send task that writes everything queued on the connection's
/// outbound channel, then reads inbound frames until the socket closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (connection, mut outbound) = Connection::channel();

    metrics::websocket_connection_opened();
    logging::log_connection_event("open", None, "connection accepted");

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut conn = ConnectionState {
        connection: Some(connection),
        participant: None,
        limiter: RateLimiter::default(),
    };

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => handle_text(text.as_str(), &mut conn, &state).await,
            Ok(Message::Binary(data)) => {
                metrics::inbound_message("invalid");
                metrics::rejected_message("binary");
                logging::log_protocol_violation(
                    conn.participant.as_ref().map(|p| p.name()),
                    &format!("Binary frame of {} bytes", data.len()),
                );
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!("WebSocket read error: {}", e);
                break;
            }
            // Ping/Pong are answered by the transport.
            _ => {}
        }
    }

    // Only a queued participant is affected; seated ones keep their session.
    if let Some(participant) = &conn.participant {
        state.matchmaker.leave(participant.id()).await;
    }
    send_task.abort();

    metrics::websocket_connection_closed();
    logging::log_connection_event(
        "close",
        conn.participant.as_ref().map(|p| p.name()),
        "connection closed",
    );
}

async fn handle_text(text: &str, conn: &mut ConnectionState, state: &AppState) {
    let name = conn.participant.as_ref().map(|p| p.name().to_string());

    if !conn.limiter.check() {
        metrics::rate_limited_message();
        warn!("Rate limit exceeded for {}, dropping message", name.as_deref().unwrap_or("anonymous"));
        return;
    }

    let message = match ClientMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            metrics::inbound_message("invalid");
            metrics::rejected_message(protocol_reason(&e));
            logging::log_protocol_violation(name.as_deref(), &e.to_string());
            return;
        }
    };

    match message {
        ClientMessage::Join { display_name } => {
            metrics::inbound_message("join");

            let Some(connection) = conn.connection.take() else {
                metrics::rejected_message("already_joined");
                debug!("Ignoring repeated join from {}", name.as_deref().unwrap_or("anonymous"));
                return;
            };

            let display_name = display_name.unwrap_or_else(MatchConfig::default_player_name);
            let participant = Arc::new(Participant::human(display_name, connection));
            info!("{} ({}) joined", participant.name(), participant.id());

            conn.participant = Some(participant.clone());
            state.matchmaker.join(participant).await;
        }
        ClientMessage::Move { column } => {
            metrics::inbound_message("move");

            let Some(participant) = &conn.participant else {
                metrics::rejected_message("not_joined");
                warn!("Ignoring move before join (column {})", column);
                return;
            };

            if let Err(e) = state.sessions.submit_move(participant, column).await {
                metrics::rejected_message(move_reason(&e));
            }
        }
    }
}

fn protocol_reason(err: &ProtocolError) -> &'static str {
    match err {
        ProtocolError::Malformed(_) => "malformed",
        ProtocolError::UnknownType(_) => "unknown_type",
        ProtocolError::MissingColumn => "missing_column",
    }
}

fn move_reason(err: &MoveError) -> &'static str {
    match err {
        MoveError::GameOver => "game_over",
        MoveError::NotYourTurn { .. } => "not_your_turn",
        MoveError::ColumnOutOfRange(_) => "column_out_of_range",
        MoveError::ColumnFull(_) => "column_full",
        MoveError::NoActiveSession => "no_active_session",
        MoveError::SessionNotFound(_) => "session_not_found",
        MoveError::NotInSession => "not_in_session",
    }
}
