//! Point-in-time telemetry bundles handed out by a [`super::TelemetryProvider`].
//!
//! Every type here is `Copy`: the core receives its own copy per query and
//! never holds on to it past the response being rendered.

use std::fmt;

/// Acquisition / calibration state tag reported by the IMU subsystem.
///
/// Opaque to the dispatch layer, which only prints [`ImuMode::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ImuMode {
    /// Sensor is still being brought up.
    #[default]
    Init = 0,
    /// Regular acquisition and fusion.
    Normal = 1,
    /// Acquisition paused while the magnetometer is being calibrated.
    MagCalibrating = 2,
}

impl ImuMode {
    /// Returns the integer code emitted in the `mode` field.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ImuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Integer 3-axis readings for all three sensors, in device counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSample {
    /// Accelerometer counts (x, y, z).
    pub accel: [i16; 3],
    /// Gyroscope counts (x, y, z).
    pub gyro: [i16; 3],
    /// Magnetometer counts (x, y, z).
    pub mag: [i16; 3],
}

/// Fused, physically scaled IMU state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImuData {
    /// Acceleration in g (x, y, z).
    pub accel: [f32; 3],
    /// Angular rate in degrees per second (x, y, z).
    pub gyro: [f32; 3],
    /// Magnetic field in microtesla (x, y, z).
    pub mag: [f32; 3],
    /// Roll, pitch, yaw in degrees.
    pub orientation: [f32; 3],
}

/// Everything `get_raw_and_data` returns, captured at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    /// Acquisition mode at capture time.
    pub mode: ImuMode,
    /// Raw sensor counts.
    pub raw: SensorSample,
    /// Counts after bias removal.
    pub calibrated: SensorSample,
    /// Scaled and fused data.
    pub data: ImuData,
}

/// Magnetometer calibration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MagCalibrationSnapshot {
    /// Acquisition mode at capture time.
    pub mode: ImuMode,
    /// Raw magnetometer counts.
    pub raw: [i16; 3],
    /// Magnetometer counts with the bias removed.
    pub calibrated: [i16; 3],
    /// Hard-iron bias currently applied.
    pub bias: [i16; 3],
}
