//! Read-only ranking endpoints.
//!
//! # Examples
//!
//! Top players:
//! ```bash
//! curl http://localhost:8080/api/leaderboard
//! ```
//!
//! One player's record:
//! ```bash
//! curl http://localhost:8080/api/player/alice
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use connect_four::db::{DbError, LeaderboardEntry, PlayerStats};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: DbError) -> ApiError {
    match err {
        DbError::PlayerNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Player not found".to_string(),
            }),
        ),
        other => {
            log::error!("Ranking query failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            )
        }
    }
}

/// Top players by wins.
///
/// # Response
///
/// Returns `200 OK` with up to `LEADERBOARD_LIMIT` entries:
/// ```json
/// [
///   { "id": 1, "name": "alice", "wins": 7, "losses": 2, "winRate": 0.777 }
/// ]
/// ```
///
/// # Errors
///
/// - `500 Internal Server Error`: Storage error
pub async fn leaderboard(State(state): State<AppState>) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    state
        .repository
        .leaderboard(state.leaderboard_limit)
        .await
        .map(Json)
        .map_err(api_error)
}

/// Record of one player.
///
/// # Response
///
/// Returns `200 OK` with:
/// ```json
/// { "username": "alice", "wins": 7, "losses": 2, "draws": 1, "winRate": 0.7 }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No player with that name
/// - `500 Internal Server Error`: Storage error
pub async fn player_stats(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PlayerStats>, ApiError> {
    state
        .repository
        .player_stats(&username)
        .await
        .map(Json)
        .map_err(api_error)
}
