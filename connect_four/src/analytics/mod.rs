//! Analytics events for session start and finish.
//!
//! The engine calls [`EventPublisher::publish`] and moves on; a sink task
//! drains the queue into the log or a Redis channel. Nothing here can slow
//! down or fail a game.

pub mod events;
pub mod publisher;
pub mod sink;

pub use events::{GameEvent, GameEventKind};
pub use publisher::{ChannelEventPublisher, DEFAULT_EVENT_CAPACITY, EventPublisher, NoopEventPublisher};
pub use sink::{RedisEventSink, run_log_sink};
