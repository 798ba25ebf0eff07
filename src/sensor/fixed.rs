//! Provider returning fixed snapshots.
//!
//! Used by tests and local demos: readings never change, calibration calls
//! are counted, and a calibration delay can be configured to reproduce a
//! slow calibration routine blocking the event loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::{
    ImuData, ImuMode, MagCalibrationSnapshot, SensorSample, TelemetryProvider, TelemetrySnapshot,
};

/// A [`TelemetryProvider`] with constant readings.
#[derive(Debug)]
pub struct FixedImu {
    telemetry: TelemetrySnapshot,
    mag: MagCalibrationSnapshot,
    calibration_delay: Duration,
    calibrations: AtomicUsize,
}

impl FixedImu {
    /// Creates a provider returning the given snapshots.
    #[must_use]
    pub fn new(telemetry: TelemetrySnapshot, mag: MagCalibrationSnapshot) -> Self {
        Self {
            telemetry,
            mag,
            calibration_delay: Duration::ZERO,
            calibrations: AtomicUsize::new(0),
        }
    }

    /// A level device, nose slightly down, heading roughly west.
    #[must_use]
    pub fn sample() -> Self {
        let raw = SensorSample {
            accel: [120, -340, 16384],
            gyro: [12, -7, 3],
            mag: [210, -95, 402],
        };
        let telemetry = TelemetrySnapshot {
            mode: ImuMode::Normal,
            raw,
            calibrated: SensorSample {
                mag: [90, -147, -278],
                ..raw
            },
            data: ImuData {
                accel: [0.0073, -0.0207, 1.0],
                gyro: [0.0916, -0.0534, 0.0229],
                mag: [13.5, -22.05, -41.7],
                orientation: [1.25, -3.5, 271.04],
            },
        };
        let mag = MagCalibrationSnapshot {
            mode: ImuMode::Normal,
            raw: raw.mag,
            calibrated: [90, -147, -278],
            bias: [120, 52, 680],
        };
        Self::new(telemetry, mag)
    }

    /// Makes every calibration call block the calling thread for `delay`.
    #[must_use]
    pub fn with_calibration_delay(mut self, delay: Duration) -> Self {
        self.calibration_delay = delay;
        self
    }

    /// Number of completed calibration calls.
    #[must_use]
    pub fn calibration_count(&self) -> usize {
        self.calibrations.load(Ordering::SeqCst)
    }
}

impl TelemetryProvider for FixedImu {
    fn raw_and_data(&self) -> TelemetrySnapshot {
        self.telemetry
    }

    fn mag_calibration(&self) -> MagCalibrationSnapshot {
        self.mag
    }

    fn do_mag_calibration(&self) {
        if !self.calibration_delay.is_zero() {
            std::thread::sleep(self.calibration_delay);
        }
        self.calibrations.fetch_add(1, Ordering::SeqCst);
    }
}
