//! Structured WebSocket error frame.
//!
//! Only sent when unknown-topic replies are enabled; topic documents are
//! rendered by [`crate::encoding::documents`], not serialised here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, ErrorBody};

/// Discriminator for server-originated frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Server → Client error.
    Error,
}

/// Error frame envelope.
#[derive(Debug, Clone, Serialize)]
pub struct WsErrorFrame {
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Error code and message.
    pub payload: ErrorBody,
}

impl WsErrorFrame {
    /// Builds the frame for a dispatch error, stamped now.
    #[must_use]
    pub fn new(err: &DispatchError) -> Self {
        Self {
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: err.body(),
        }
    }

    /// Serialises the frame to its text payload.
    #[must_use]
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn error_frame_shape() {
        let err = DispatchError::UnrecognizedTopic("/bogus".to_string());
        let text = WsErrorFrame::new(&err).to_text();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
            panic!("error frame must be JSON");
        };
        assert_eq!(value.pointer("/type"), Some(&serde_json::json!("error")));
        assert_eq!(value.pointer("/payload/code"), Some(&serde_json::json!(404)));
        let message = value.pointer("/payload/message");
        assert_eq!(message, Some(&serde_json::json!("unrecognized topic: /bogus")));
        assert!(value.pointer("/timestamp").is_some_and(serde_json::Value::is_string));
    }
}
