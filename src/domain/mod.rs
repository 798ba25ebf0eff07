//! Domain layer: topics, telemetry snapshots, the provider seam and the
//! shared topic table.
//!
//! Nothing in here knows about sockets. The transports in [`crate::api`]
//! and [`crate::ws`] resolve a topic through [`TopicRegistry`] and query a
//! [`TelemetryProvider`] for every response.

pub mod provider;
pub mod snapshot;
pub mod topic;
pub mod topic_registry;

pub use provider::TelemetryProvider;
pub use snapshot::{ImuData, ImuMode, MagCalibrationSnapshot, SensorSample, TelemetrySnapshot};
pub use topic::{Topic, UnknownTopic};
pub use topic_registry::{HttpRoute, TopicEntry, TopicRegistry, WsRoute};
