//! # Connect Four
//!
//! Session and matchmaking engine for online Connect Four.
//!
//! Players join a FIFO queue and are paired two at a time; a player still
//! waiting alone after the grace period is paired with a heuristic bot.
//! Every session owns its board, turn marker and move log, validates each
//! move and pushes the authoritative state to both seats after every
//! accepted transition.
//!
//! ## Core Modules
//!
//! - [`game`]: Board, win detection and game values
//! - [`bot`]: Win / block / center / first-legal bot
//! - [`matchmaking`]: Waiting queue and grace-period bot fallback
//! - [`session`]: Session state machine, registry, broadcast and protocol
//! - [`db`]: Result persistence and player statistics
//! - [`analytics`]: Best-effort session lifecycle events
//!
//! ## Example
//!
//! ```
//! use connect_four::game::{Board, PlayerNumber};
//!
//! let mut board = Board::new();
//! for _ in 0..4 {
//!     board.drop_piece(3, PlayerNumber::One).unwrap();
//! }
//! assert!(board.has_four_in_row(PlayerNumber::One));
//! ```

/// Analytics events and sinks.
pub mod analytics;

/// Bot decision procedure.
pub mod bot;

/// Persistence of finished games and player statistics.
pub mod db;

/// Core game rules and values.
pub mod game;

/// Matchmaking queue and matchmaker.
pub mod matchmaking;

/// Sessions, participants and the client protocol.
pub mod session;

pub use game::{Board, MoveError, Outcome, PlayerNumber, StateSnapshot};
pub use matchmaking::Matchmaker;
pub use session::{ClientMessage, MatchConfig, Participant, ServerMessage, SessionManager, SessionRegistry};
