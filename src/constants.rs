// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! Sensor geometry, mesh extents, camera projection and the default values of
//! every tunable live here so the projector, viewer and config agree.

use std::time::Duration;

/// Native depth sensor width (Kinect v1, medium resolution)
pub const SENSOR_WIDTH: usize = 640;
/// Native depth sensor height (Kinect v1, medium resolution)
pub const SENSOR_HEIGHT: usize = 480;

/// Number of distinct raw depth values (full `u16` range)
pub const DEPTH_VALUE_COUNT: usize = u16::MAX as usize + 1;

/// Raw depth units per scene unit before the user depth scale is applied
pub const DEPTH_TO_METERS_DIVISOR: f32 = 50.0;

/// Horizontal extent of the mesh in scene units (centered on the origin)
pub const MESH_EXTENT_X: f32 = 800.0;
/// Vertical extent of the mesh in scene units (centered on the origin)
pub const MESH_EXTENT_Y: f32 = 600.0;

/// Camera vertical field of view in degrees
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
/// Camera near clip plane
pub const CAMERA_NEAR: f32 = 1.0;
/// Camera far clip plane
pub const CAMERA_FAR: f32 = 8000.0;

/// Scene rotation applied per arrow key press (radians)
pub const ROTATION_STEP: f32 = 0.05;

/// Hardware tilt limits of the Kinect motor (degrees)
pub const TILT_MIN_DEGREES: i8 = -27;
pub const TILT_MAX_DEGREES: i8 = 27;

/// Default tunable values
pub mod defaults {
    pub const TILT: i32 = 0;
    pub const CAMERA_DISTANCE: f32 = 1000.0;
    pub const MIN_DEPTH: i32 = 0;
    pub const MAX_DEPTH: i32 = 65000;
    pub const DEPTH_SCALE: f32 = 1.0;
    pub const MESH_DIVISOR: i32 = 2;
    pub const TEX_OFFSET_X: f32 = -0.024;
    pub const TEX_OFFSET_Y: f32 = 0.038;
}

/// How long the terminal viewer waits for input before the next frame
pub const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Smoothing factor for the average framerate readout
pub const FRAMERATE_SMOOTHING: f32 = 0.1;

/// Name used for config, cache and picture directories
pub const APP_DIR_NAME: &str = "kinect-mesh";

/// Kinect camera intrinsics at the 640x480 base resolution
///
/// Used to cast rays through the synthetic scene so it looks like what the
/// real sensor would report.
pub mod kinect {
    /// Focal length X (pixels)
    pub const FX: f32 = 594.21;
    /// Focal length Y (pixels)
    pub const FY: f32 = 591.04;
    /// Principal point X (pixels)
    pub const CX: f32 = 339.5;
    /// Principal point Y (pixels)
    pub const CY: f32 = 242.7;

    /// Farthest distance the sensor reports, in millimeters
    pub const MAX_RANGE_MM: f32 = 8000.0;
}
