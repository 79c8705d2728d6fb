//! Prometheus metrics for the matchmaking server.
//!
//! Metrics are recorded through the `metrics` facade and exposed by the
//! Prometheus exporter when `METRICS_BIND` is set. Without an exporter the
//! recording calls are no-ops.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cf_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::websocket_connection_opened();
//! metrics::inbound_message("move");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Count a new WebSocket connection.
pub fn websocket_connection_opened() {
    metrics::counter!("websocket_connections_total").increment(1);
    metrics::gauge!("websocket_connections_active").increment(1.0);
}

/// Count a closed WebSocket connection.
pub fn websocket_connection_closed() {
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

/// Count an inbound message by kind (`join`, `move`, `invalid`).
pub fn inbound_message(kind: &'static str) {
    metrics::counter!("websocket_messages_received", "kind" => kind).increment(1);
}

/// Count an inbound message that was ignored, by reason.
pub fn rejected_message(reason: &'static str) {
    metrics::counter!("websocket_messages_rejected", "reason" => reason).increment(1);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Count a message dropped by the per-connection rate limiter.
pub fn rate_limited_message() {
    metrics::counter!("rate_limit_hits_total", "endpoint" => "ws").increment(1);
}
