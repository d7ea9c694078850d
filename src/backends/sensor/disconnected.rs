// SPDX-License-Identifier: GPL-3.0-only

use super::{DepthGrid, DepthSensor, VideoImage};
use crate::errors::SensorError;

/// Stand-in used when no sensor could be opened; never produces frames
#[derive(Debug, Default)]
pub struct DisconnectedSensor;

impl DisconnectedSensor {
    pub fn new() -> Self {
        Self
    }
}

impl DepthSensor for DisconnectedSensor {
    fn name(&self) -> &str {
        "Disconnected"
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn poll_depth_frame(&mut self) -> bool {
        false
    }

    fn depth_grid(&self) -> Option<&DepthGrid> {
        None
    }

    fn poll_video_frame(&mut self) -> bool {
        false
    }

    fn video_image(&self) -> Option<&VideoImage> {
        None
    }

    fn set_tilt(&mut self, _degrees: i8) -> Result<(), SensorError> {
        Err(SensorError::MotorUnavailable)
    }

    fn tilt(&self) -> Result<i8, SensorError> {
        Ok(0)
    }

    fn set_infrared(&mut self, _enabled: bool) -> Result<(), SensorError> {
        Ok(())
    }
}
