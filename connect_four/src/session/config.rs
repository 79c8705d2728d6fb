//! Matchmaking and session timing configuration.

use std::time::Duration;

/// Default wait before a lone queued player gets a bot opponent.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Default bot "thinking" delay before its reply is applied.
pub const DEFAULT_BOT_MOVE_DELAY: Duration = Duration::from_secs(1);

/// Display name given to bot participants.
pub const DEFAULT_BOT_NAME: &str = "Bot";

/// Match configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    /// Time a lone participant waits before being paired with a bot
    pub grace_period: Duration,

    /// Delay between a human move and the bot's reply
    pub bot_move_delay: Duration,

    /// Display name of bot participants
    pub bot_name: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            bot_move_delay: DEFAULT_BOT_MOVE_DELAY,
            bot_name: DEFAULT_BOT_NAME.to_string(),
        }
    }
}

impl MatchConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.grace_period.is_zero() {
            return Err("Grace period must be greater than zero".to_string());
        }

        if self.bot_name.trim().is_empty() {
            return Err("Bot name must not be blank".to_string());
        }

        Ok(())
    }

    /// Name for a player who joined without one.
    pub fn default_player_name() -> String {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        format!("Player_{nanos}")
    }
}
