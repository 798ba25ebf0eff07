//! Shared JSON fragment helpers for topic documents.
//!
//! Documents are produced as a sequence of text fragments pushed into a
//! [`ChunkSink`]. The HTTP responder keeps every fragment as its own
//! transfer chunk; the WebSocket responder concatenates them into a single
//! frame. Both get byte-identical bodies.
//!
//! The legacy `raw`, `real` and `debug` documents use bareword keys and are
//! therefore not strict JSON. [`KeyStyle`] selects between keeping that
//! shape for existing clients and quoting every key.

pub mod documents;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// How keys that the legacy documents leave unquoted are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStyle {
    /// Bareword keys (`accel_raw: [...]`), compatible with deployed clients.
    #[default]
    Legacy,
    /// Every key quoted, so every document is valid JSON.
    Strict,
}

impl FromStr for KeyStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown key style `{other}`")),
        }
    }
}

impl fmt::Display for KeyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Destination for rendered fragments.
pub trait ChunkSink {
    /// Appends one fragment.
    fn push_chunk(&mut self, chunk: String);
}

/// Keeps fragments separate, one per HTTP chunk.
impl ChunkSink for Vec<String> {
    fn push_chunk(&mut self, chunk: String) {
        self.push(chunk);
    }
}

/// Concatenates fragments into one buffer, for a single WebSocket frame.
impl ChunkSink for String {
    fn push_chunk(&mut self, chunk: String) {
        self.push_str(&chunk);
    }
}

/// Writes document fragments into a [`ChunkSink`] using a [`KeyStyle`].
pub struct JsonWriter<'a> {
    sink: &'a mut dyn ChunkSink,
    style: KeyStyle,
}

impl<'a> JsonWriter<'a> {
    /// Creates a writer over `sink`.
    pub fn new(sink: &'a mut dyn ChunkSink, style: KeyStyle) -> Self {
        Self { sink, style }
    }

    /// Emits one fragment.
    pub fn chunk(&mut self, chunk: impl Into<String>) {
        self.sink.push_chunk(chunk.into());
    }

    /// Writes a key that the legacy documents emit without quotes.
    #[must_use]
    pub fn loose_key<'k>(&self, name: &'k str) -> Cow<'k, str> {
        match self.style {
            KeyStyle::Legacy => Cow::Borrowed(name),
            KeyStyle::Strict => Cow::Owned(format!("\"{name}\"")),
        }
    }
}

impl fmt::Debug for JsonWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWriter")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// Formats a float with exactly two decimals.
#[must_use]
pub fn fixed2(value: f32) -> String {
    format!("{value:.2}")
}

/// `a,b,c`
#[must_use]
pub fn int_triplet([x, y, z]: [i16; 3]) -> String {
    format!("{x},{y},{z}")
}

/// `a.aa, b.bb, c.cc`
#[must_use]
pub fn float_triplet([x, y, z]: [f32; 3]) -> String {
    format!("{}, {}, {}", fixed2(x), fixed2(y), fixed2(z))
}
