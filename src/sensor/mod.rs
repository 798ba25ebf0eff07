//! Telemetry providers.
//!
//! The real acquisition and fusion subsystem lives outside this crate and
//! is reached only through [`crate::domain::TelemetryProvider`]. The
//! providers here let the server run on a host ([`SimulatedImu`]) and be
//! exercised deterministically in tests ([`FixedImu`]).

pub mod fixed;
pub mod simulated;

pub use fixed::FixedImu;
pub use simulated::{SimulatedImu, SimulationConfig};
