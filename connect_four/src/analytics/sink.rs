use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tokio::sync::mpsc;

use super::events::GameEvent;

/// Drain events into the log. Returns when every publisher is dropped.
pub async fn run_log_sink(mut events: mpsc::Receiver<GameEvent>) {
    while let Some(event) = events.recv().await {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!("analytics event: {}", json),
            Err(e) => log::warn!("Failed to encode analytics event: {}", e),
        }
    }
    log::debug!("Analytics log sink stopped");
}

/// Redis pub/sub sink.
pub struct RedisEventSink {
    publisher: ConnectionManager,
    channel: String,
}

impl RedisEventSink {
    /// Connect to `redis_url`; events are published on `channel`.
    pub async fn connect(redis_url: &str, channel: impl Into<String>) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let publisher = ConnectionManager::new(client).await?;

        Ok(Self {
            publisher,
            channel: channel.into(),
        })
    }

    /// Publish queued events until every publisher is dropped.
    ///
    /// Failures are logged per event and never retried.
    pub async fn run(mut self, mut events: mpsc::Receiver<GameEvent>) {
        while let Some(event) = events.recv().await {
            let encoded = match serde_json::to_string(&event) {
                Ok(encoded) => encoded,
                Err(e) => {
                    log::warn!("Failed to encode analytics event for game {}: {}", event.game_id, e);
                    continue;
                }
            };

            if let Err(e) = self
                .publisher
                .publish::<_, _, ()>(self.channel.as_str(), encoded)
                .await
            {
                log::warn!(
                    "Redis publish to {} failed for game {}: {}",
                    self.channel,
                    event.game_id,
                    e
                );
            }
        }
        log::debug!("Analytics Redis sink stopped");
    }
}
