//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use connect_four::{db::DatabaseConfig, session::MatchConfig};
use std::{net::SocketAddr, time::Duration};

/// Default listen address
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Default analytics channel name
pub const DEFAULT_ANALYTICS_CHANNEL: &str = "game-events";

/// Default number of leaderboard rows
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Result storage backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// PostgreSQL with the given pool configuration
    Postgres(DatabaseConfig),
    /// Process-local store, lost on restart
    InMemory,
}

/// Analytics sink configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Redis URL; events are only logged when unset
    pub redis_url: Option<String>,
    /// Pub/sub channel for events
    pub channel: String,
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Result storage
    pub storage: StorageConfig,
    /// Matchmaking and bot timing
    pub matchmaking: MatchConfig,
    /// Analytics sink
    pub analytics: AnalyticsConfig,
    /// Prometheus exporter address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Rows returned by the leaderboard endpoint
    pub leaderboard_limit: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `in_memory` - Use the in-memory store regardless of `DATABASE_URL` (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a set variable cannot be parsed, or if no database
    /// URL is configured and the in-memory store was not requested
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        in_memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => bind_from_env()?,
        };

        let in_memory = in_memory || parse_env_or("IN_MEMORY_STORE", false);
        let storage = if in_memory {
            StorageConfig::InMemory
        } else {
            let database_url = database_url_override
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .ok_or_else(|| ConfigError::MissingRequired {
                    var: "DATABASE_URL".to_string(),
                    hint: "Set a PostgreSQL URL or pass --in-memory".to_string(),
                })?;

            StorageConfig::Postgres(DatabaseConfig {
                database_url,
                max_connections: parse_env_or("DB_MAX_CONNECTIONS", 10),
                min_connections: parse_env_or("DB_MIN_CONNECTIONS", 1),
                connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT_SECS", 5),
                idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", 300),
                max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", 1800),
            })
        };

        let defaults = MatchConfig::default();
        let matchmaking = MatchConfig {
            grace_period: duration_ms_or("MATCH_GRACE_PERIOD_MS", defaults.grace_period),
            bot_move_delay: duration_ms_or("BOT_MOVE_DELAY_MS", defaults.bot_move_delay),
            bot_name: std::env::var("BOT_NAME").unwrap_or(defaults.bot_name),
        };

        let analytics = AnalyticsConfig {
            redis_url: std::env::var("ANALYTICS_REDIS_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            channel: std::env::var("ANALYTICS_CHANNEL")
                .unwrap_or_else(|_| DEFAULT_ANALYTICS_CHANNEL.to_string()),
        };

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(value) => Some(value.parse().map_err(|_| ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("'{value}' is not a socket address"),
            })?),
            Err(_) => None,
        };

        Ok(ServerConfig {
            bind,
            storage,
            matchmaking,
            analytics,
            metrics_bind,
            leaderboard_limit: parse_env_or("LEADERBOARD_LIMIT", DEFAULT_LEADERBOARD_LIMIT),
        })
    }

    /// Configuration for tests and local runs: in-memory store, defaults elsewhere.
    pub fn in_memory(bind: SocketAddr) -> Self {
        Self {
            bind,
            storage: StorageConfig::InMemory,
            matchmaking: MatchConfig::default(),
            analytics: AnalyticsConfig {
                redis_url: None,
                channel: DEFAULT_ANALYTICS_CHANNEL.to_string(),
            },
            metrics_bind: None,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matchmaking
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "MATCH_GRACE_PERIOD_MS/BOT_NAME".to_string(),
                reason,
            })?;

        if let StorageConfig::Postgres(database) = &self.storage {
            database.validate().map_err(|reason| ConfigError::Invalid {
                var: "DATABASE_URL/DB_*".to_string(),
                reason,
            })?;
        }

        if self.analytics.channel.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "ANALYTICS_CHANNEL".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.leaderboard_limit <= 0 {
            return Err(ConfigError::Invalid {
                var: "LEADERBOARD_LIMIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// `SERVER_BIND`, else `0.0.0.0:$PORT`, else the default address.
fn bind_from_env() -> Result<SocketAddr, ConfigError> {
    let (var, value) = if let Ok(bind) = std::env::var("SERVER_BIND") {
        ("SERVER_BIND", bind)
    } else if let Ok(port) = std::env::var("PORT") {
        ("PORT", format!("0.0.0.0:{port}"))
    } else {
        ("SERVER_BIND", DEFAULT_BIND.to_string())
    };

    value.parse().map_err(|_| ConfigError::Invalid {
        var: var.to_string(),
        reason: format!("'{value}' is not a socket address"),
    })
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn duration_ms_or(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig::in_memory("127.0.0.1:8080".parse().unwrap())
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "Use --in-memory".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("Use --in-memory"));
    }

    #[test]
    fn test_in_memory_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_zero_grace_period_rejected() {
        let mut config = config();
        config.matchmaking.grace_period = Duration::ZERO;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_bad_pool_sizing_rejected() {
        let mut config = config();
        config.storage = StorageConfig::Postgres(DatabaseConfig {
            min_connections: 50,
            max_connections: 5,
            ..DatabaseConfig::default()
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_leaderboard_limit_rejected() {
        let mut config = config();
        config.leaderboard_limit = 0;

        assert!(config.validate().is_err());
    }
}
