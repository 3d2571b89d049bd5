//! Voice Agent API Library Crate
//!
//! This library contains all the logic of the voice agent web service: the
//! application state, the REST handlers and their backing sources, the voice
//! WebSocket and routing. The `api` binary is a thin wrapper around this library.

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod handlers;
pub mod logs;
pub mod models;
pub mod provider;
pub mod router;
pub mod state;
pub mod system;
pub mod ws;
