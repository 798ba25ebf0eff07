//! Telemetry topic identifiers.
//!
//! A [`Topic`] is addressed by exactly the same string over both
//! transports: the HTTP request path, or the payload of a WebSocket text
//! frame.

use std::fmt;
use std::str::FromStr;

/// One of the fixed telemetry views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Raw integer accel/gyro/mag triplets.
    Raw,
    /// Calibrated float accel/gyro/mag triplets.
    Real,
    /// Roll/pitch/yaw plus the scaled sensor axes.
    Orientation,
    /// Magnetometer raw/calibrated/bias values and the mode tag.
    MagData,
    /// Roll/pitch/yaw plus gyro rates.
    Debug,
    /// Magnetometer calibration command.
    MagCalibrate,
}

impl Topic {
    /// All topics, in table order.
    pub const ALL: [Self; 6] = [
        Self::Raw,
        Self::Real,
        Self::Orientation,
        Self::MagData,
        Self::Debug,
        Self::MagCalibrate,
    ];

    /// Returns the path / payload string identifying this topic.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Raw => "/imu/raw",
            Self::Real => "/imu/real",
            Self::Orientation => "/imu/orientation",
            Self::MagData => "/imu/mag_data",
            Self::Debug => "/imu/debug",
            Self::MagCalibrate => "/imu/mag_calibrate",
        }
    }

    /// Exact, case-sensitive lookup. No trailing-slash or query handling.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|topic| topic.path() == path)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Error returned when a string names no known topic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_path(s).ok_or_else(|| UnknownTopic(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_round_trips_through_its_path() {
        for topic in Topic::ALL {
            assert_eq!(Topic::from_path(topic.path()), Some(topic));
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(Topic::from_path("/imu/raw/"), None);
        assert_eq!(Topic::from_path("/IMU/RAW"), None);
        assert_eq!(Topic::from_path("imu/raw"), None);
        assert_eq!(Topic::from_path(" /imu/raw"), None);
        assert_eq!(Topic::from_path(""), None);
    }

    #[test]
    fn from_str_reports_the_rejected_name() {
        let Err(err) = "/bogus".parse::<Topic>() else {
            panic!("expected an unknown topic");
        };
        assert_eq!(err, UnknownTopic("/bogus".to_string()));
        assert_eq!("/imu/debug".parse::<Topic>(), Ok(Topic::Debug));
    }

    #[test]
    fn display_is_the_path() {
        assert_eq!(Topic::MagCalibrate.to_string(), "/imu/mag_calibrate");
    }
}
