//! Server configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::encoding::KeyStyle;
use crate::error::ServerError;
use crate::sensor::SimulationConfig;

/// Default listening address: every interface, port 80.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:80";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level server configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the listener binds to.
    pub listen_addr: SocketAddr,

    /// Idle tick of the event loop while it has no listener.
    pub poll_interval: Duration,

    /// Quoting of the keys the legacy documents leave bare.
    pub key_style: KeyStyle,

    /// Answer unknown WebSocket topics with an error frame instead of silence.
    pub unknown_topic_reply: bool,

    /// Wrap the router in a permissive CORS layer.
    pub cors_permissive: bool,

    /// Log output format.
    pub log_format: LogFormat,

    /// Acquisition rate of the simulated IMU.
    pub imu_sample_rate_hz: u32,

    /// How long a simulated magnetometer calibration blocks.
    pub imu_mag_calibration: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 80)),
            poll_interval: Duration::from_millis(1000),
            key_style: KeyStyle::Legacy,
            unknown_topic_reply: false,
            cors_permissive: false,
            log_format: LogFormat::Text,
            imu_sample_rate_hz: 50,
            imu_mag_calibration: Duration::from_millis(2000),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if `LISTEN_ADDR` or
    /// `JSON_KEY_STYLE` is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ServerError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .map_err(|e| ServerError::Config(format!("LISTEN_ADDR: {e}")))?;

        let key_style = match std::env::var("JSON_KEY_STYLE") {
            Ok(value) => value
                .parse::<KeyStyle>()
                .map_err(|e| ServerError::Config(format!("JSON_KEY_STYLE: {e}")))?,
            Err(_) => KeyStyle::default(),
        };

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            poll_interval: Duration::from_millis(parse_env("POLL_INTERVAL_MS", 1000)),
            key_style,
            unknown_topic_reply: parse_env_bool("WS_UNKNOWN_TOPIC_REPLY", false),
            cors_permissive: parse_env_bool("CORS_PERMISSIVE", false),
            log_format,
            imu_sample_rate_hz: parse_env("IMU_SAMPLE_RATE_HZ", 50),
            imu_mag_calibration: Duration::from_millis(parse_env("IMU_MAG_CALIBRATION_MS", 2000)),
        })
    }

    /// Simulated IMU parameters derived from this configuration.
    #[must_use]
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig {
            sample_rate_hz: self.imu_sample_rate_hz,
            calibration_duration: self.imu_mag_calibration,
            ..SimulationConfig::default()
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    parse_bool(std::env::var(key).ok().as_deref(), default)
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_port_80() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(config.key_style, KeyStyle::Legacy);
        assert!(!config.unknown_topic_reply);
    }

    #[test]
    fn bool_parsing() {
        assert!(parse_bool(Some("TRUE"), false));
        assert!(parse_bool(Some("1"), false));
        assert!(!parse_bool(Some("false"), true));
        assert!(!parse_bool(Some("0"), true));
        assert!(parse_bool(Some("yes"), true));
        assert!(!parse_bool(None, false));
    }

    #[test]
    fn missing_numeric_variable_uses_default() {
        assert_eq!(parse_env("IMU_WEBAPI_TEST_UNSET_VARIABLE", 42u64), 42);
    }

    #[test]
    fn simulation_follows_imu_settings() {
        let config = ServerConfig {
            imu_sample_rate_hz: 10,
            imu_mag_calibration: Duration::from_millis(5),
            ..ServerConfig::default()
        };
        let sim = config.simulation();
        assert_eq!(sim.sample_rate_hz, 10);
        assert_eq!(sim.calibration_duration, Duration::from_millis(5));
    }
}
