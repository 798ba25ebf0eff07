//! The topic table shared by the HTTP and WebSocket front ends.
//!
//! [`TopicRegistry`] maps a topic identifier to the pair of responders
//! used for it on each transport. Adding a topic means adding one
//! [`TopicEntry`] to [`TOPIC_TABLE`]; neither front end needs to change.

use super::{Topic, UnknownTopic};
use crate::encoding::documents::{self, Command, Render};

/// What an HTTP request for a topic does.
#[derive(Debug, Clone, Copy)]
pub enum HttpRoute {
    /// `GET` renders the document as a chunked `text/json` response.
    Get(Render),
    /// `POST` runs the command and answers `200` with an empty body.
    Post(Command),
}

/// What a WebSocket frame naming a topic does.
#[derive(Debug, Clone, Copy)]
pub enum WsRoute {
    /// Reply with the rendered document in one text frame.
    Reply(Render),
    /// Run the command, then reply with the rendered document.
    CommandThenReply(Command, Render),
}

/// One row of the topic table.
#[derive(Debug, Clone, Copy)]
pub struct TopicEntry {
    /// Topic this row serves.
    pub topic: Topic,
    /// HTTP responder.
    pub http: HttpRoute,
    /// WebSocket responder.
    pub ws: WsRoute,
}

/// The fixed topic table.
pub static TOPIC_TABLE: [TopicEntry; 6] = [
    TopicEntry {
        topic: Topic::Raw,
        http: HttpRoute::Get(documents::raw),
        ws: WsRoute::Reply(documents::raw),
    },
    TopicEntry {
        topic: Topic::Real,
        http: HttpRoute::Get(documents::real),
        ws: WsRoute::Reply(documents::real),
    },
    TopicEntry {
        topic: Topic::Orientation,
        http: HttpRoute::Get(documents::orientation),
        ws: WsRoute::Reply(documents::orientation),
    },
    TopicEntry {
        topic: Topic::MagData,
        http: HttpRoute::Get(documents::mag_data),
        ws: WsRoute::Reply(documents::mag_data),
    },
    TopicEntry {
        topic: Topic::Debug,
        http: HttpRoute::Get(documents::debug),
        ws: WsRoute::Reply(documents::debug),
    },
    TopicEntry {
        topic: Topic::MagCalibrate,
        http: HttpRoute::Post(documents::mag_calibrate),
        ws: WsRoute::CommandThenReply(documents::mag_calibrate, documents::mag_data),
    },
];

/// Read-only lookup over a static topic table.
#[derive(Debug, Clone, Copy)]
pub struct TopicRegistry {
    entries: &'static [TopicEntry],
}

impl TopicRegistry {
    /// Registry over [`TOPIC_TABLE`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_entries(&TOPIC_TABLE)
    }

    /// Registry over a caller-supplied table.
    #[must_use]
    pub const fn from_entries(entries: &'static [TopicEntry]) -> Self {
        Self { entries }
    }

    /// Finds the entry for the topic named exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTopic`] when `name` is not a topic path, or names a
    /// topic this table does not carry.
    pub fn resolve(&self, name: &str) -> Result<&'static TopicEntry, UnknownTopic> {
        let topic: Topic = name.parse()?;
        self.entries
            .iter()
            .find(|entry| entry.topic == topic)
            .ok_or_else(|| UnknownTopic(name.to_string()))
    }

    /// Like [`TopicRegistry::resolve`], discarding the error.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'static TopicEntry> {
        self.resolve(name).ok()
    }

    /// Iterates over all registered entries.
    pub fn entries(&self) -> impl Iterator<Item = &'static TopicEntry> {
        self.entries.iter()
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}
