//! Connection event dispatcher.
//!
//! [`Dispatcher::on_event`] is the single entry point for every connection
//! lifecycle event the transport delivers. It advances the connection's
//! [`ConnectionPhase`], then resolves HTTP requests and WebSocket frames
//! against one [`TopicRegistry`] and answers from a fresh provider query;
//! nothing is cached between events.
//!
//! All work happens synchronously on the caller's thread. On the
//! single-threaded event loop that means a blocking calibration stalls
//! every other connection until it returns.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use axum::response::{IntoResponse, Response};

use crate::api::http;
use crate::domain::{TelemetryProvider, TopicRegistry};
use crate::encoding::KeyStyle;
use crate::ws::messages::WsErrorFrame;
use crate::ws::responder;

/// Behavioural switches for the two open compatibility questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOptions {
    /// Key quoting for the legacy documents.
    pub key_style: KeyStyle,
    /// Send an error frame for unknown WebSocket topics instead of nothing.
    pub unknown_topic_reply: bool,
}

/// An event delivered by the transport for one connection.
#[derive(Debug, Clone, Copy)]
pub enum ConnectionEvent<'a> {
    /// A complete HTTP request.
    HttpRequest {
        /// Request method.
        method: &'a Method,
        /// Request path, without query string.
        path: &'a str,
    },
    /// The WebSocket upgrade finished.
    WebSocketHandshakeDone,
    /// A WebSocket text frame arrived.
    WebSocketFrame(&'a str),
}

/// What the transport should send back.
#[derive(Debug)]
pub enum Reply {
    /// One HTTP response.
    Http(Response),
    /// One WebSocket text frame.
    Frame(String),
    /// Nothing.
    Nothing,
}

/// Where a connection is in its lifecycle, as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    /// Accepted, nothing received yet.
    #[default]
    Idle,
    /// A plain HTTP request was answered.
    HttpRequestReceived,
    /// Upgraded to WebSocket.
    WebSocketHandshakeDone,
    /// At least one WebSocket frame was handled.
    WebSocketFrameReceived,
}

impl ConnectionPhase {
    /// Returns the phase after `event`.
    #[must_use]
    pub fn advance(self, event: &ConnectionEvent<'_>) -> Self {
        match event {
            ConnectionEvent::HttpRequest { .. } => Self::HttpRequestReceived,
            ConnectionEvent::WebSocketHandshakeDone => Self::WebSocketHandshakeDone,
            ConnectionEvent::WebSocketFrame(_) => Self::WebSocketFrameReceived,
        }
    }

    /// Returns `true` once the connection has been upgraded.
    #[must_use]
    pub fn is_websocket(self) -> bool {
        matches!(
            self,
            Self::WebSocketHandshakeDone | Self::WebSocketFrameReceived
        )
    }
}

/// Routes connection events to the HTTP and WebSocket responders.
pub struct Dispatcher {
    provider: Arc<dyn TelemetryProvider>,
    registry: TopicRegistry,
    options: DispatchOptions,
}

impl Dispatcher {
    /// Creates a dispatcher over the standard topic table.
    #[must_use]
    pub fn new(provider: Arc<dyn TelemetryProvider>, options: DispatchOptions) -> Self {
        Self {
            provider,
            registry: TopicRegistry::new(),
            options,
        }
    }

    /// Handles one connection event to completion and moves `phase` on.
    ///
    /// A frame on a connection that never completed the handshake is
    /// dropped and leaves `phase` untouched.
    pub fn on_event(&self, phase: &mut ConnectionPhase, event: ConnectionEvent<'_>) -> Reply {
        if let ConnectionEvent::WebSocketFrame(_) = event
            && !phase.is_websocket()
        {
            tracing::debug!(?phase, "frame before handshake dropped");
            return Reply::Nothing;
        }
        *phase = phase.advance(&event);

        match event {
            ConnectionEvent::HttpRequest { method, path } => {
                Reply::Http(self.handle_http(method, path))
            }
            ConnectionEvent::WebSocketHandshakeDone => {
                tracing::info!("websocket handshake done");
                Reply::Nothing
            }
            ConnectionEvent::WebSocketFrame(payload) => {
                tracing::debug!(payload, "websocket frame");
                self.handle_ws_message(payload)
                    .map_or(Reply::Nothing, Reply::Frame)
            }
        }
    }

    /// Answers one HTTP request. Always exactly one response.
    pub fn handle_http(&self, method: &Method, path: &str) -> Response {
        http::respond(
            &self.registry,
            self.provider.as_ref(),
            self.options.key_style,
            method,
            path,
        )
        .unwrap_or_else(|err| {
            tracing::debug!(%err, "http route not found");
            err.into_response()
        })
    }

    /// Answers one WebSocket text payload with at most one frame.
    pub fn handle_ws_message(&self, payload: &str) -> Option<String> {
        match responder::respond(
            &self.registry,
            self.provider.as_ref(),
            self.options.key_style,
            payload,
        ) {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::debug!(%err, "websocket topic dropped");
                self.options
                    .unknown_topic_reply
                    .then(|| WsErrorFrame::new(&err).to_text())
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
