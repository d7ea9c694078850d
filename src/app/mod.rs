// SPDX-License-Identifier: GPL-3.0-only

//! Mesh viewer application state
//!
//! [`MeshApp`] owns the sensor, the projector with its lookup tables, the
//! mesh being rebuilt every frame, the live [`Tunables`] and the software
//! render target. The frontend drives it with two calls per tick:
//!
//! - [`MeshApp::update`] pulls the latest frames and rebuilds the mesh
//! - [`MeshApp::draw`] rasterizes the mesh at the frontend's resolution
//!
//! Both live in [`update`].

pub mod params;
mod update;

pub use params::{PARAMS, ParamId, ParamSpec, Tunables};
pub use update::UpdateOutcome;

use crate::backends::sensor::DepthSensor;
use crate::constants::FRAMERATE_SMOOTHING;
use crate::mesh::{DepthGridProjector, TriMesh};
use crate::render::{Camera, DrawStats, Framebuffer};
use std::time::Instant;

/// Exponential moving average of the draw rate
#[derive(Debug, Clone, Default)]
pub struct FrameRate {
    last: Option<Instant>,
    fps: f32,
}

impl FrameRate {
    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last {
            let dt = now.duration_since(last).as_secs_f32();
            if dt > 0.0 {
                let instant = 1.0 / dt;
                self.fps = if self.fps == 0.0 {
                    instant
                } else {
                    self.fps + (instant - self.fps) * FRAMERATE_SMOOTHING
                };
            }
        }
        self.last = Some(now);
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Viewer state shared by the terminal frontend and the `stats` command
pub struct MeshApp {
    sensor: Box<dyn DepthSensor>,
    projector: DepthGridProjector,
    mesh: TriMesh,
    pub tunables: Tunables,
    pub camera: Camera,
    framebuffer: Framebuffer,
    /// Tilt last sent to the motor
    requested_tilt: Option<i8>,
    /// Whether the sensor currently captures IR instead of RGB
    infrared: bool,
    /// Capture mode whose switch last failed; retried once the mode changes
    failed_capture_mode: Option<bool>,
    framerate: FrameRate,
    frames_built: u64,
    last_draw: DrawStats,
}

impl MeshApp {
    pub fn new(sensor: Box<dyn DepthSensor>, tunables: Tunables) -> Self {
        let projector = DepthGridProjector::new(&tunables.snapshot());
        let camera = Camera {
            distance: tunables.camera_distance,
            ..Camera::default()
        };
        Self {
            sensor,
            projector,
            mesh: TriMesh::new(),
            tunables,
            camera,
            framebuffer: Framebuffer::new(1, 1),
            requested_tilt: None,
            infrared: false,
            failed_capture_mode: None,
            framerate: FrameRate::default(),
            frames_built: 0,
            last_draw: DrawStats::default(),
        }
    }

    pub fn sensor_name(&self) -> &str {
        self.sensor.name()
    }

    pub fn sensor_connected(&self) -> bool {
        self.sensor.is_connected()
    }

    pub fn sensor(&self) -> &dyn DepthSensor {
        self.sensor.as_ref()
    }

    pub fn projector(&self) -> &DepthGridProjector {
        &self.projector
    }

    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn fps(&self) -> f32 {
        self.framerate.fps()
    }

    /// Number of depth frames turned into a mesh so far
    pub fn frames_built(&self) -> u64 {
        self.frames_built
    }

    pub fn last_draw(&self) -> DrawStats {
        self.last_draw
    }

    /// Rotate the scene by a number of rotation steps
    pub fn rotate(&mut self, yaw_steps: f32, pitch_steps: f32) {
        use crate::constants::ROTATION_STEP;
        self.camera.yaw += yaw_steps * ROTATION_STEP;
        self.camera.pitch = (self.camera.pitch + pitch_steps * ROTATION_STEP)
            .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
    }

    pub fn reset_rotation(&mut self) {
        self.camera.reset_rotation();
    }
}
