//! Connect Four matchmaking server.
//!
//! Serves the WebSocket game protocol and the ranking endpoints on top of
//! the `connect_four` library.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
