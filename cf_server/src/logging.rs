//! Structured logging setup.
//!
//! The game library logs through the `log` facade; the subscriber installed
//! here bridges those records into `tracing`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use cf_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a connection lifecycle event with structured fields.
pub fn log_connection_event(event: &str, participant: Option<&str>, detail: &str) {
    tracing::info!(
        event = event,
        participant = participant,
        "WS: {}",
        detail
    );
}

/// Log an inbound frame that could not be used.
pub fn log_protocol_violation(participant: Option<&str>, reason: &str) {
    tracing::warn!(participant = participant, reason = reason, "Ignored inbound message");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_helpers_do_not_panic() {
        log_connection_event("open", None, "connection accepted");
        log_connection_event("close", Some("alice"), "connection closed");
        log_protocol_violation(Some("alice"), "Unknown message type: chat");
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
