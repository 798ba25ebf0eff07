//! WebSocket responder.
//!
//! A frame payload is matched against the same topic table as HTTP paths.
//! The reply is rendered into one owned buffer per call and sent as a
//! single text frame.

use crate::domain::{TelemetryProvider, TopicRegistry, WsRoute};
use crate::encoding::documents::Render;
use crate::encoding::{JsonWriter, KeyStyle};
use crate::error::DispatchError;

/// Initial capacity of a reply buffer; large enough for every document.
const FRAME_CAPACITY: usize = 512;

/// Produces the reply frame for one incoming text payload.
///
/// # Errors
///
/// Returns [`DispatchError::UnrecognizedTopic`] when `payload` names no
/// registered topic. Nothing is sent to the provider in that case.
pub fn respond(
    registry: &TopicRegistry,
    provider: &dyn TelemetryProvider,
    style: KeyStyle,
    payload: &str,
) -> Result<String, DispatchError> {
    let entry = registry.resolve(payload)?;

    let render = match entry.ws {
        WsRoute::Reply(render) => render,
        WsRoute::CommandThenReply(command, render) => {
            command(provider);
            render
        }
    };
    Ok(render_frame(provider, render, style))
}

/// Renders a whole document into one string.
pub fn render_frame(provider: &dyn TelemetryProvider, render: Render, style: KeyStyle) -> String {
    let mut frame = String::with_capacity(FRAME_CAPACITY);
    render(provider, &mut JsonWriter::new(&mut frame, style));
    frame
}
