//! Error types for dispatch and for the server lifecycle.
//!
//! [`DispatchError`] covers the two ways a request or frame can fail to
//! match the topic table. Both are absorbed into protocol behaviour: an
//! empty `404` for HTTP, and for WebSocket either silence or an error
//! frame. [`ServerError`] covers configuration and event-loop startup.

use std::net::SocketAddr;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::UnknownTopic;

/// Inner error body carried by a WebSocket error frame.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Failure to resolve a request or frame against the topic table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No topic accepts this method on this path.
    #[error("no route for {method} {path}")]
    RouteNotFound {
        /// Request method.
        method: Method,
        /// Request path, without query string.
        path: String,
    },

    /// A WebSocket frame named no known topic.
    #[error("unrecognized topic: {0}")]
    UnrecognizedTopic(String),
}

impl DispatchError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::RouteNotFound { .. } | Self::UnrecognizedTopic(_) => 404,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } | Self::UnrecognizedTopic(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Builds the error body for this variant.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.error_code(),
            message: self.to_string(),
        }
    }
}

impl From<UnknownTopic> for DispatchError {
    fn from(UnknownTopic(name): UnknownTopic) -> Self {
        Self::UnrecognizedTopic(name)
    }
}

/// Unmatched requests get a bare status line with a zero-length body.
impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}

/// Startup and lifecycle failures of the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The tokio runtime could not be built.
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The event-loop thread could not be spawned.
    #[error("failed to spawn event loop thread: {0}")]
    Thread(#[source] std::io::Error),

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The accept loop stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// The event-loop thread panicked.
    #[error("event loop thread panicked")]
    ThreadPanicked,
}
