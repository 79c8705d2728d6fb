//! Participants and their outbound connection handle.

use thiserror::Error;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use super::{SessionId, messages::ServerMessage};

/// Participant identifier, unique per connection.
pub type ParticipantId = Uuid;

/// Capacity of a connection's outbound queue.
pub const OUTBOUND_CAPACITY: usize = 32;

/// Why a message could not be handed to a participant's connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Receiving side of the connection is gone
    #[error("Connection closed")]
    Disconnected,

    /// Outbound queue is full
    #[error("Outbound queue full")]
    Backlogged,

    /// Participant has no connection (bot seat)
    #[error("Participant has no connection")]
    NoConnection,
}

/// Outbound half of a transport connection.
///
/// The transport owns the receiving end and writes whatever arrives to the
/// socket; `deliver` never waits.
#[derive(Debug, Clone)]
pub struct Connection {
    sender: mpsc::Sender<ServerMessage>,
}

impl Connection {
    /// Create a connection and the receiver the transport drains.
    pub fn channel() -> (Self, mpsc::Receiver<ServerMessage>) {
        let (sender, receiver) = mpsc::channel(OUTBOUND_CAPACITY);
        (Self { sender }, receiver)
    }

    pub fn deliver(&self, message: ServerMessage) -> Result<(), DeliveryError> {
        self.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Backlogged,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Disconnected,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A queued or seated player, human or bot.
#[derive(Debug)]
pub struct Participant {
    id: ParticipantId,
    name: String,
    connection: Option<Connection>,
    session_id: RwLock<Option<SessionId>>,
    is_bot: bool,
}

impl Participant {
    /// Human participant backed by a live connection.
    pub fn human(name: impl Into<String>, connection: Connection) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            connection: Some(connection),
            session_id: RwLock::new(None),
            is_bot: false,
        }
    }

    /// Bot participant. Bots have no connection and are skipped by broadcasts.
    pub fn bot(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            connection: None,
            session_id: RwLock::new(None),
            is_bot: true,
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Session this participant is currently seated in.
    pub async fn session_id(&self) -> Option<SessionId> {
        *self.session_id.read().await
    }

    /// Attach the participant to its session.
    ///
    /// Called once at pairing time; a participant is never re-seated.
    pub(crate) async fn attach_session(&self, session_id: SessionId) {
        let mut current = self.session_id.write().await;
        if let Some(existing) = *current {
            log::warn!(
                "Participant {} already seated in session {}, not moving to {}",
                self.name,
                existing,
                session_id
            );
            return;
        }
        *current = Some(session_id);
    }

    /// Push a message to this participant's connection.
    pub fn deliver(&self, message: ServerMessage) -> Result<(), DeliveryError> {
        match &self.connection {
            Some(connection) => connection.deliver(message),
            None => Err(DeliveryError::NoConnection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, PlayerNumber, StateSnapshot};

    fn update() -> ServerMessage {
        ServerMessage::BoardUpdate(StateSnapshot::new(&Board::new(), PlayerNumber::One, None))
    }

    #[tokio::test]
    async fn test_human_delivery_reaches_receiver() {
        let (connection, mut rx) = Connection::channel();
        let alice = Participant::human("alice", connection);

        alice.deliver(update()).unwrap();
        assert_eq!(rx.recv().await, Some(update()));
    }

    #[tokio::test]
    async fn test_delivery_to_closed_connection_fails() {
        let (connection, rx) = Connection::channel();
        let alice = Participant::human("alice", connection);
        drop(rx);

        assert_eq!(alice.deliver(update()), Err(DeliveryError::Disconnected));
    }

    #[tokio::test]
    async fn test_delivery_to_full_queue_fails() {
        let (connection, _rx) = Connection::channel();
        let alice = Participant::human("alice", connection);
        for _ in 0..OUTBOUND_CAPACITY {
            alice.deliver(update()).unwrap();
        }

        assert_eq!(alice.deliver(update()), Err(DeliveryError::Backlogged));
    }

    #[tokio::test]
    async fn test_bot_has_no_connection() {
        let bot = Participant::bot("Bot");
        assert!(bot.is_bot());
        assert!(bot.connection().is_none());
        assert_eq!(bot.deliver(update()), Err(DeliveryError::NoConnection));
    }

    #[tokio::test]
    async fn test_session_attached_once() {
        let bot = Participant::bot("Bot");
        assert_eq!(bot.session_id().await, None);

        let first = Uuid::new_v4();
        bot.attach_session(first).await;
        bot.attach_session(Uuid::new_v4()).await;
        assert_eq!(bot.session_id().await, Some(first));
    }
}
