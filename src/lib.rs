//! # imu-webapi
//!
//! HTTP and WebSocket telemetry endpoint for an inertial measurement unit.
//!
//! Clients poll or subscribe to a fixed set of `/imu/*` topics and receive
//! small JSON documents rendered from a fresh snapshot of the sensor on
//! every request. The server itself keeps no telemetry state; everything
//! comes from a [`domain::TelemetryProvider`].
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP GET/POST, WebSocket text frames)
//!     │
//!     ├── TelemetryServer (server)      one thread, current-thread runtime
//!     ├── Router fallback (api/)        upgrade or plain HTTP
//!     │
//!     ├── Dispatcher (service/)         connection events
//!     ├── TopicRegistry (domain/)       path -> render / command
//!     │
//!     ├── JsonWriter (encoding/)        chunked legacy documents
//!     │
//!     └── TelemetryProvider             SimulatedImu, FixedImu (sensor/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod encoding;
pub mod error;
pub mod sensor;
pub mod server;
pub mod service;
pub mod ws;
