//! Host-side stand-in for the IMU acquisition and fusion subsystem.
//!
//! Synthesises MPU-9250-scaled samples of a level device slowly turning
//! about its vertical axis, with a hard-iron offset on the magnetometer.
//! A background thread refreshes the shared snapshot at the configured
//! sample rate; the dispatch layer only ever reads copies of it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::domain::{
    ImuData, ImuMode, MagCalibrationSnapshot, SensorSample, TelemetryProvider, TelemetrySnapshot,
};

/// Accelerometer counts per g at ±2 g full scale.
pub const ACCEL_LSB_PER_G: f32 = 16_384.0;
/// Gyroscope counts per deg/s at ±250 deg/s full scale.
pub const GYRO_LSB_PER_DPS: f32 = 131.0;
/// Magnetometer microtesla per count (16-bit output).
pub const MAG_UT_PER_LSB: f32 = 0.15;

/// Horizontal (north) component of the simulated earth field, microtesla.
const FIELD_NORTH_UT: f32 = 20.0;
/// Vertical (down) component of the simulated earth field, microtesla.
const FIELD_DOWN_UT: f32 = 45.0;
/// Simulated turn rate about the vertical axis.
const YAW_RATE_DPS: f32 = 6.0;
/// Headings visited per pass of the calibration sweep.
const SWEEP_STEPS: usize = 72;

/// Parameters of the simulated sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Acquisition rate of the background thread.
    pub sample_rate_hz: u32,
    /// Wall-clock time one calibration run blocks for.
    pub calibration_duration: Duration,
    /// Hard-iron offset added to every magnetometer sample, in counts.
    pub hard_iron: [i16; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50,
            calibration_duration: Duration::from_secs(2),
            hard_iron: [120, -80, 45],
        }
    }
}

#[derive(Debug, Default)]
struct AcquisitionState {
    mode: ImuMode,
    raw: SensorSample,
    calibrated: SensorSample,
    data: ImuData,
    mag_bias: [i16; 3],
}

/// Simulated IMU implementing [`TelemetryProvider`].
#[derive(Debug)]
pub struct SimulatedImu {
    config: SimulationConfig,
    state: Mutex<AcquisitionState>,
    paused: AtomicBool,
    running: AtomicBool,
    started: Instant,
}

impl SimulatedImu {
    /// Creates the sensor in [`ImuMode::Init`] with a zero bias.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            state: Mutex::new(AcquisitionState::default()),
            paused: AtomicBool::new(false),
            running: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    /// Starts the acquisition thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn_acquisition(self: &Arc<Self>) -> std::io::Result<JoinHandle<()>> {
        self.running.store(true, Ordering::SeqCst);
        let imu = Arc::clone(self);
        let period = Duration::from_secs(1) / imu.config.sample_rate_hz.max(1);

        std::thread::Builder::new()
            .name("imu-acquisition".to_string())
            .spawn(move || {
                tracing::info!(
                    rate_hz = imu.config.sample_rate_hz,
                    "imu acquisition started"
                );
                while imu.running.load(Ordering::SeqCst) {
                    if !imu.paused.load(Ordering::SeqCst) {
                        imu.acquire_once();
                    }
                    std::thread::sleep(period);
                }
                tracing::info!("imu acquisition stopped");
            })
    }

    /// Asks the acquisition thread to exit after its current sample.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Takes one sample at the current simulation time and publishes it.
    pub fn acquire_once(&self) {
        let t = self.started.elapsed().as_secs_f32();
        let heading = (YAW_RATE_DPS * t).rem_euclid(360.0);
        let wobble = 0.02 * (t * 0.5).sin();

        let raw = SensorSample {
            accel: [
                counts(wobble * ACCEL_LSB_PER_G),
                0,
                counts(ACCEL_LSB_PER_G),
            ],
            gyro: [0, 0, counts(YAW_RATE_DPS * GYRO_LSB_PER_DPS)],
            mag: magnetometer_counts(heading, false, self.config.hard_iron),
        };

        let mut state = self.lock_state();
        if state.mode == ImuMode::Init {
            state.mode = ImuMode::Normal;
        }
        let bias = state.mag_bias;
        state.raw = raw;
        state.calibrated = SensorSample {
            mag: remove_bias(raw.mag, bias),
            ..raw
        };
        state.data = fuse(&raw, bias);
    }

    fn lock_state(&self) -> MutexGuard<'_, AcquisitionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TelemetryProvider for SimulatedImu {
    fn raw_and_data(&self) -> TelemetrySnapshot {
        let state = self.lock_state();
        TelemetrySnapshot {
            mode: state.mode,
            raw: state.raw,
            calibrated: state.calibrated,
            data: state.data,
        }
    }

    fn mag_calibration(&self) -> MagCalibrationSnapshot {
        let state = self.lock_state();
        MagCalibrationSnapshot {
            mode: state.mode,
            raw: state.raw.mag,
            calibrated: state.calibrated.mag,
            bias: state.mag_bias,
        }
    }

    fn do_mag_calibration(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.lock_state().mode = ImuMode::MagCalibrating;
        tracing::info!(mode = %ImuMode::MagCalibrating, "magnetometer calibration started");

        let step_delay = self.config.calibration_duration / (2 * SWEEP_STEPS) as u32;
        let mut min = [i16::MAX; 3];
        let mut max = [i16::MIN; 3];
        for inverted in [false, true] {
            for step in 0..SWEEP_STEPS {
                let heading = 360.0 * step as f32 / SWEEP_STEPS as f32;
                let sample = magnetometer_counts(heading, inverted, self.config.hard_iron);
                for ((lo, hi), value) in min.iter_mut().zip(max.iter_mut()).zip(sample) {
                    *lo = (*lo).min(value);
                    *hi = (*hi).max(value);
                }
                if !step_delay.is_zero() {
                    std::thread::sleep(step_delay);
                }
            }
        }

        let mut bias = [0i16; 3];
        for ((b, lo), hi) in bias.iter_mut().zip(min).zip(max) {
            *b = ((i32::from(lo) + i32::from(hi)) / 2) as i16;
        }

        {
            let mut state = self.lock_state();
            state.mag_bias = bias;
            state.mode = ImuMode::Normal;
        }
        tracing::info!(bias = ?bias, "magnetometer calibration finished");

        self.paused.store(false, Ordering::SeqCst);
        self.acquire_once();
    }
}

fn counts(value: f32) -> i16 {
    value.round() as i16
}

/// Body-frame magnetometer counts for a level (or upside-down) device.
fn magnetometer_counts(heading_deg: f32, inverted: bool, hard_iron: [i16; 3]) -> [i16; 3] {
    let psi = heading_deg.to_radians();
    let flip = if inverted { -1.0 } else { 1.0 };
    let field = [
        FIELD_NORTH_UT * psi.cos(),
        -flip * FIELD_NORTH_UT * psi.sin(),
        flip * FIELD_DOWN_UT,
    ];
    let mut out = [0i16; 3];
    for ((o, f), offset) in out.iter_mut().zip(field).zip(hard_iron) {
        *o = counts(f / MAG_UT_PER_LSB).saturating_add(offset);
    }
    out
}

fn remove_bias(mag: [i16; 3], bias: [i16; 3]) -> [i16; 3] {
    let [x, y, z] = mag;
    let [bx, by, bz] = bias;
    [
        x.saturating_sub(bx),
        y.saturating_sub(by),
        z.saturating_sub(bz),
    ]
}

fn scale(axes: [i16; 3], factor: f32) -> [f32; 3] {
    axes.map(|v| f32::from(v) * factor)
}

/// Scales raw counts and derives roll/pitch from gravity and a
/// tilt-compensated yaw from the bias-corrected magnetometer.
fn fuse(raw: &SensorSample, mag_bias: [i16; 3]) -> ImuData {
    let accel = scale(raw.accel, 1.0 / ACCEL_LSB_PER_G);
    let gyro = scale(raw.gyro, 1.0 / GYRO_LSB_PER_DPS);
    let mag = scale(remove_bias(raw.mag, mag_bias), MAG_UT_PER_LSB);

    let [ax, ay, az] = accel;
    let [mx, my, mz] = mag;
    let roll = ay.atan2(az);
    let pitch = (-ax).atan2(ay.hypot(az));

    let xh = mx * pitch.cos() + my * roll.sin() * pitch.sin() + mz * roll.cos() * pitch.sin();
    let yh = my * roll.cos() - mz * roll.sin();
    let yaw = (-yh).atan2(xh);

    ImuData {
        accel,
        gyro,
        mag,
        orientation: [
            roll.to_degrees(),
            pitch.to_degrees(),
            (yaw.to_degrees() + 360.0).rem_euclid(360.0),
        ],
    }
}
