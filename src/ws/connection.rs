//! Per-connection WebSocket frame loop.
//!
//! Every text frame is handed to the [`Dispatcher`] and the reply, if any,
//! is written back before the next frame is read. No application state is
//! kept between frames.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::Instrument;

use crate::service::{ConnectionEvent, ConnectionPhase, Dispatcher, Reply};

/// Runs the frame loop for one upgraded connection until it closes.
pub async fn run_connection(socket: WebSocket, dispatcher: Arc<Dispatcher>) {
    let conn_id = uuid::Uuid::new_v4();
    serve_frames(socket, dispatcher)
        .instrument(tracing::info_span!("ws", conn = %conn_id))
        .await;
}

async fn serve_frames(socket: WebSocket, dispatcher: Arc<Dispatcher>) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut phase = ConnectionPhase::Idle;
    let _ = dispatcher.on_event(&mut phase, ConnectionEvent::WebSocketHandshakeDone);

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let frame = ConnectionEvent::WebSocketFrame(text.as_str());
                if let Reply::Frame(reply) = dispatcher.on_event(&mut phase, frame)
                    && ws_tx.send(Message::text(reply)).await.is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            // Binary frames are outside the client contract; ping/pong is
            // answered by the transport.
            Ok(_) => {}
        }
    }

    tracing::debug!(?phase, "ws connection closed");
}
