// SPDX-License-Identifier: GPL-3.0-only

//! Depth sensor abstraction
//!
//! A sensor is polled once per update tick. Polling returns whether a new
//! frame arrived; if so, the accessor returns the new snapshot, otherwise the
//! previous one stays valid.

mod disconnected;
#[cfg(all(target_arch = "x86_64", feature = "freedepth"))]
mod kinect;
mod synthetic;
mod types;

pub use disconnected::DisconnectedSensor;
#[cfg(all(target_arch = "x86_64", feature = "freedepth"))]
pub use kinect::KinectSensor;
pub use synthetic::SyntheticSensor;
pub use types::{DepthGrid, SensorInfo, VideoImage, VideoSource};

use crate::constants::{TILT_MAX_DEGREES, TILT_MIN_DEGREES};
use crate::errors::SensorError;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Interface to a depth camera
pub trait DepthSensor {
    /// Human readable sensor name
    fn name(&self) -> &str;

    /// Whether a physical device is attached
    fn is_connected(&self) -> bool {
        true
    }

    /// Check for a new depth frame and make it current
    fn poll_depth_frame(&mut self) -> bool;

    /// The current depth snapshot, if any frame was ever received
    fn depth_grid(&self) -> Option<&DepthGrid>;

    /// Check for a new video frame and make it current
    fn poll_video_frame(&mut self) -> bool;

    /// The current video snapshot
    fn video_image(&self) -> Option<&VideoImage>;

    /// Tilt the sensor (degrees, clamped to the motor range)
    fn set_tilt(&mut self, degrees: i8) -> Result<(), SensorError>;

    /// Current tilt angle in degrees
    fn tilt(&self) -> Result<i8, SensorError>;

    /// Switch video capture between infrared and RGB
    fn set_infrared(&mut self, enabled: bool) -> Result<(), SensorError>;
}

/// Clamp a tilt request to what the motor accepts
pub fn clamp_tilt(degrees: i32) -> i8 {
    degrees.clamp(TILT_MIN_DEGREES as i32, TILT_MAX_DEGREES as i32) as i8
}

/// Which sensor to open at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorPreference {
    /// First Kinect found, otherwise a disconnected sensor
    #[default]
    Auto,
    /// Procedurally generated scene
    Synthetic,
}

/// Enumerate attached depth sensors
pub fn enumerate_sensors() -> Vec<SensorInfo> {
    #[cfg(all(target_arch = "x86_64", feature = "freedepth"))]
    {
        kinect::enumerate_kinects()
    }
    #[cfg(not(all(target_arch = "x86_64", feature = "freedepth")))]
    {
        Vec::new()
    }
}

/// The sensor opened by default: the first one enumerated
pub fn first_device(sensors: &[SensorInfo]) -> Result<&SensorInfo, SensorError> {
    sensors.first().ok_or(SensorError::NoDeviceFound)
}

/// Open a sensor according to `preference`
///
/// Never fails: when no device can be opened this logs once and returns a
/// [`DisconnectedSensor`] that simply never produces frames.
pub fn open_sensor(preference: SensorPreference) -> Box<dyn DepthSensor> {
    if preference == SensorPreference::Synthetic {
        info!("Using synthetic depth scene");
        return Box::new(SyntheticSensor::new());
    }

    let sensors = enumerate_sensors();
    info!(count = sensors.len(), "There are {} depth sensors connected", sensors.len());

    #[cfg(all(target_arch = "x86_64", feature = "freedepth"))]
    {
        match first_device(&sensors).and_then(|first| KinectSensor::open(first.index)) {
            Ok(sensor) => return Box::new(sensor),
            Err(e) => info!(error = %e, "Could not open depth sensor"),
        }
    }

    info!("No depth sensor available, frames will not update");
    Box::new(DisconnectedSensor::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilt_clamping() {
        assert_eq!(clamp_tilt(31), 27);
        assert_eq!(clamp_tilt(-31), -27);
        assert_eq!(clamp_tilt(5), 5);
    }

    #[test]
    fn test_first_device() {
        assert_eq!(first_device(&[]).err(), Some(SensorError::NoDeviceFound));

        let sensors = [
            SensorInfo {
                name: "Xbox NUI Camera".into(),
                index: 0,
                serial: Some("A00362A09017".into()),
            },
            SensorInfo {
                name: "Xbox NUI Camera".into(),
                index: 1,
                serial: None,
            },
        ];
        assert_eq!(first_device(&sensors).map(|s| s.index), Ok(0));
    }

    #[test]
    fn test_open_synthetic() {
        let sensor = open_sensor(SensorPreference::Synthetic);
        assert!(sensor.is_connected());
        assert_eq!(sensor.name(), "Synthetic Scene");
    }
}
