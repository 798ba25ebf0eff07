//! WebSocket layer: upgrade, per-connection frame loop, responder.
//!
//! Any request carrying a valid WebSocket upgrade is switched over. Each
//! text frame is read as a topic identifier and answered with at most one
//! text frame on the same connection.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod responder;
