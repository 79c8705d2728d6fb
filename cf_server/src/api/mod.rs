//! HTTP/WebSocket API for the matchmaking server.
//!
//! # Modules
//!
//! - [`websocket`]: Matchmaking and live game traffic
//! - [`stats`]: Leaderboard and per-player records
//! - [`rate_limiter`]: Per-connection inbound message limits
//!
//! # Endpoints Overview
//!
//! - `GET /ws` - Establish WebSocket connection
//! - `GET /api/leaderboard` - Top players by wins
//! - `GET /api/player/{username}` - One player's record
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cf_server::api::{AppState, create_router};
//! use connect_four::{
//!     MatchConfig,
//!     analytics::NoopEventPublisher,
//!     db::MemoryGameRepository,
//! };
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState::new(
//!     Arc::new(MemoryGameRepository::new()),
//!     Arc::new(NoopEventPublisher),
//!     MatchConfig::default(),
//!     10,
//! );
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. Browser clients are expected to be
//! served from a different origin.

pub mod rate_limiter;
pub mod stats;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use connect_four::{
    MatchConfig, Matchmaker, SessionManager, SessionRegistry,
    analytics::EventPublisher,
    db::GameRepository,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned per request; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub matchmaker: Arc<Matchmaker>,
    pub sessions: Arc<SessionManager>,
    pub repository: Arc<dyn GameRepository>,
    /// Rows returned by `GET /api/leaderboard`
    pub leaderboard_limit: i64,
}

impl AppState {
    /// Wire a session manager and matchmaker over the given storage and analytics.
    pub fn new(
        repository: Arc<dyn GameRepository>,
        events: Arc<dyn EventPublisher>,
        config: MatchConfig,
        leaderboard_limit: i64,
    ) -> Self {
        let sessions = Arc::new(SessionManager::new(
            SessionRegistry::new(),
            repository.clone(),
            events,
            config,
        ));
        let matchmaker = Arc::new(Matchmaker::new(sessions.clone()));

        Self {
            matchmaker,
            sessions,
            repository,
            leaderboard_limit,
        }
    }
}

/// Create the API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health                 - Health check
/// GET  /ws                     - WebSocket
/// GET  /api/leaderboard        - Leaderboard
/// GET  /api/player/{username}  - Player statistics
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .route("/api/leaderboard", get(stats::leaderboard))
        .route("/api/player/{username}", get(stats::player_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Response
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","database":true,"sessions":{"total":3,"active":1},"queued":0,...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = state.repository.health_check().await.is_ok();

    let registry = state.sessions.registry();
    let total = registry.len().await;
    let active = registry.active_count().await;
    let queued = state.matchmaker.queue().len().await;

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "sessions": {
            "total": total,
            "active": active
        },
        "queued": queued,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
