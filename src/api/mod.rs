//! Transport front end: router composition and the HTTP responder.
//!
//! There are no per-path Axum routes. Every request lands in [`dispatch`],
//! which either completes a WebSocket upgrade or hands the request to the
//! [`crate::service::Dispatcher`] as a connection event. This keeps unmatched methods on
//! known paths at `404` rather than Axum's `405`.

pub mod http;

use std::sync::Arc;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::service::{ConnectionEvent, ConnectionPhase, Reply};
use crate::ws;

/// Builds the complete router.
pub fn build_router(state: AppState, cors_permissive: bool) -> Router {
    let router: Router<AppState> = Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http());
    let router = if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    router.with_state(state)
}

/// Entry point for every request on the listener.
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let (mut parts, _body) = request.into_parts();

    if let Ok(upgrade) = WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
        return ws::handler::upgrade(upgrade, Arc::clone(&state.dispatcher));
    }

    let mut phase = ConnectionPhase::Idle;
    let event = ConnectionEvent::HttpRequest {
        method: &parts.method,
        path: parts.uri.path(),
    };
    match state.dispatcher.on_event(&mut phase, event) {
        Reply::Http(response) => response,
        Reply::Frame(_) | Reply::Nothing => StatusCode::NOT_FOUND.into_response(),
    }
}
