//! Shared application state injected into the Axum dispatch handler.

use std::sync::Arc;

use crate::service::Dispatcher;

/// State available to the router via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dispatcher for every HTTP request and WebSocket frame.
    pub dispatcher: Arc<Dispatcher>,
}
