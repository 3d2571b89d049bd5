//! Voice WebSocket
//!
//! This module contains the real-time voice channel served at `/ws/voice`.
//! It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `registry`: Tracks open connections and delivers messages to them.
//! - `session`: Manages the connection lifecycle and dispatches client messages.

pub mod protocol;
pub mod registry;
pub mod session;

pub use registry::{ConnectionId, ConnectionRegistry, SendError};
pub use session::ws_handler;
