use tokio::sync::mpsc;

use super::events::GameEvent;

/// Default capacity of the analytics queue.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Best-effort, non-blocking analytics publisher.
pub trait EventPublisher: Send + Sync {
    /// Hand off an event. Never blocks and never fails the caller.
    fn publish(&self, event: GameEvent);
}

/// Publisher that queues events for a sink task.
///
/// When the queue is full the event is dropped with a warning.
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::Sender<GameEvent>,
}

impl ChannelEventPublisher {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<GameEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl EventPublisher for ChannelEventPublisher {
    fn publish(&self, event: GameEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                log::warn!(
                    "Analytics queue full, dropping {:?} for game {}",
                    event.event_type,
                    event.game_id
                );
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                log::debug!("Analytics sink stopped, dropping event for game {}", event.game_id);
            }
        }
    }
}

/// Publisher that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventPublisher;

impl EventPublisher for NoopEventPublisher {
    fn publish(&self, _event: GameEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_channel_publisher_forwards_events() {
        let (publisher, mut rx) = ChannelEventPublisher::new(4);
        let event = GameEvent::started(Uuid::new_v4(), "alice", "bob");

        publisher.publish(event.clone());
        assert_eq!(rx.recv().await, Some(event));
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (publisher, mut rx) = ChannelEventPublisher::new(1);
        let first = GameEvent::started(Uuid::new_v4(), "alice", "bob");

        publisher.publish(first.clone());
        publisher.publish(GameEvent::started(Uuid::new_v4(), "carol", "dave"));

        assert_eq!(rx.recv().await, Some(first));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_sink_is_ignored() {
        let (publisher, rx) = ChannelEventPublisher::new(1);
        drop(rx);
        publisher.publish(GameEvent::started(Uuid::new_v4(), "alice", "bob"));
    }
}
