//! imu-webapi server entry point.
//!
//! Starts the simulated IMU and the telemetry webserver, then blocks on the
//! event loop.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use imu_webapi::config::{LogFormat, ServerConfig};
use imu_webapi::sensor::SimulatedImu;
use imu_webapi::server::TelemetryServer;

fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let imu = Arc::new(SimulatedImu::new(config.simulation()));
    let _acquisition = imu.spawn_acquisition()?;

    TelemetryServer::new(config, imu).run()?;
    Ok(())
}
