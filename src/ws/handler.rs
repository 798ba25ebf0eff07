//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::response::Response;

use super::connection::run_connection;
use crate::service::Dispatcher;

/// Completes the upgrade and hands the socket to the frame loop.
pub fn upgrade(ws: WebSocketUpgrade, dispatcher: Arc<Dispatcher>) -> Response {
    ws.on_upgrade(move |socket| run_connection(socket, dispatcher))
}
