//! The narrow interface into the IMU acquisition and fusion subsystem.

use super::snapshot::{MagCalibrationSnapshot, TelemetrySnapshot};

/// Source of telemetry snapshots and the magnetometer calibration command.
///
/// Implementations are updated concurrently by their own acquisition
/// process and must synchronise internally; every query is treated as an
/// atomic snapshot read and the dispatch layer takes no locks of its own.
///
/// All methods are synchronous. [`TelemetryProvider::do_mag_calibration`]
/// may block for as long as the calibration routine runs, and while it does
/// the event loop serves nothing else.
pub trait TelemetryProvider: Send + Sync + 'static {
    /// Returns the latest raw, calibrated and fused readings.
    fn raw_and_data(&self) -> TelemetrySnapshot;

    /// Returns the current magnetometer calibration state.
    fn mag_calibration(&self) -> MagCalibrationSnapshot;

    /// Runs the magnetometer calibration routine to completion.
    fn do_mag_calibration(&self);
}
