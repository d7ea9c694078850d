// SPDX-License-Identifier: GPL-3.0-only

//! Per-tick update and draw

use super::MeshApp;
use crate::backends::sensor::{VideoImage, clamp_tilt};
use crate::mesh::TableChanges;
use crate::render::{Camera, Framebuffer, draw_mesh};
use std::time::Instant;
use tracing::{debug, warn};

/// What a call to [`MeshApp::update`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No new depth frame; the previous mesh is kept
    NoNewFrame,
    /// The mesh was rebuilt from a fresh depth frame
    MeshRebuilt(TableChanges),
}

impl MeshApp {
    /// Pull new sensor frames and rebuild the mesh
    ///
    /// Tilt and capture mode requests go out whenever the tunables change,
    /// even without a new frame. Everything else waits for depth data.
    pub fn update(&mut self) -> UpdateOutcome {
        self.sync_tilt();
        self.sync_capture_mode();

        if !self.sensor.poll_depth_frame() {
            return UpdateOutcome::NoNewFrame;
        }

        let config = self.tunables.snapshot();
        if config.mode.uses_texture() {
            self.sensor.poll_video_frame();
        }

        let Some(grid) = self.sensor.depth_grid() else {
            return UpdateOutcome::NoNewFrame;
        };
        let changes = self.projector.build(grid, &config, &mut self.mesh);
        self.frames_built += 1;

        UpdateOutcome::MeshRebuilt(changes)
    }

    fn sync_tilt(&mut self) {
        let target = clamp_tilt(self.tunables.tilt);
        if self.requested_tilt == Some(target) {
            return;
        }
        // Recorded even on failure so a missing motor is not retried every tick
        self.requested_tilt = Some(target);
        if let Err(e) = self.sensor.set_tilt(target) {
            debug!(error = %e, degrees = target, "Tilt request not applied");
        }
    }

    /// Switch the sensor between RGB and IR capture to match the render mode
    ///
    /// The current mode only changes once the sensor accepts the switch. A
    /// failed request is not repeated every tick, but any later mode change
    /// tries again.
    fn sync_capture_mode(&mut self) {
        let infrared = self.tunables.mode.captures_infrared();
        if infrared == self.infrared {
            self.failed_capture_mode = None;
            return;
        }
        if self.failed_capture_mode == Some(infrared) {
            return;
        }

        match self.sensor.set_infrared(infrared) {
            Ok(()) => {
                debug!(infrared, "Video capture mode switched");
                self.infrared = infrared;
                self.failed_capture_mode = None;
            }
            Err(e) => {
                warn!(error = %e, infrared, "Failed to switch video capture mode");
                self.failed_capture_mode = Some(infrared);
            }
        }
    }

    /// Whether the sensor captures infrared video right now
    pub fn captures_infrared(&self) -> bool {
        self.infrared
    }

    fn texture(&self) -> Option<&VideoImage> {
        if self.tunables.mode.uses_texture() {
            self.sensor.video_image()
        } else {
            None
        }
    }

    /// Rasterize the current mesh into a `width` x `height` framebuffer
    pub fn draw(&mut self, width: u32, height: u32) -> &Framebuffer {
        let width = width.max(1);
        let height = height.max(1);
        self.framebuffer.resize(width, height);

        self.camera.distance = self.tunables.camera_distance;
        self.camera.aspect = width as f32 / height as f32;

        let texture = if self.tunables.mode.uses_texture() {
            self.sensor.video_image()
        } else {
            None
        };
        self.last_draw = draw_mesh(
            &mut self.framebuffer,
            &self.mesh,
            &self.camera,
            texture,
            self.tunables.wireframe,
        );
        self.framerate.tick(Instant::now());

        &self.framebuffer
    }

    /// Render the current mesh into a new framebuffer of its own
    ///
    /// Leaves the live framebuffer, draw stats and framerate untouched.
    pub fn render_offscreen(&self, width: u32, height: u32) -> Framebuffer {
        let width = width.max(1);
        let height = height.max(1);
        let mut framebuffer = Framebuffer::new(width, height);
        let camera = Camera {
            distance: self.tunables.camera_distance,
            aspect: width as f32 / height as f32,
            ..self.camera
        };
        draw_mesh(
            &mut framebuffer,
            &self.mesh,
            &camera,
            self.texture(),
            self.tunables.wireframe,
        );
        framebuffer
    }
}
