//! Game sessions: participants, the per-game state machine, the registry,
//! broadcasting and the coordinator that ties them together.

use uuid::Uuid;

pub mod broadcaster;
pub mod config;
pub mod game_session;
pub mod manager;
pub mod messages;
pub mod participant;
pub mod registry;

/// Session identifier, assigned at pairing time.
pub type SessionId = Uuid;

pub use broadcaster::DeliveryReport;
pub use config::MatchConfig;
pub use game_session::{AppliedMove, GameSession, SessionState, SessionStatus, Transition};
pub use manager::SessionManager;
pub use messages::{ClientMessage, GameStart, ProtocolError, ServerMessage};
pub use participant::{Connection, DeliveryError, Participant, ParticipantId};
pub use registry::SessionRegistry;
