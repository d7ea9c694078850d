// SPDX-License-Identifier: GPL-3.0-only

//! Perspective camera orbiting the mesh

use crate::constants::{CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, defaults};
use glam::{Mat4, Quat, Vec3, Vec4};

/// Camera on the +Z axis looking at the origin, with a scene rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub distance: f32,
    pub aspect: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            distance: defaults::CAMERA_DISTANCE,
            aspect: 16.0 / 9.0,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl Camera {
    pub fn eye(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn scene_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            CAMERA_FOV_DEGREES.to_radians(),
            self.aspect.max(f32::EPSILON),
            CAMERA_NEAR,
            CAMERA_FAR,
        )
    }

    /// Model-view-projection with the scene rotation as model transform
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view() * Mat4::from_quat(self.scene_rotation())
    }

    pub fn reset_rotation(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }
}

/// Vertex after projection to the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    /// Pixel coordinates
    pub x: f32,
    pub y: f32,
    /// Normalized device depth in `[0, 1]` (0 = near plane)
    pub depth: f32,
    /// Reciprocal clip-space W, for perspective-correct interpolation
    pub inv_w: f32,
}

/// Project a world-space point to pixel coordinates
///
/// Returns `None` for points behind the near plane or beyond the far plane.
pub fn project_to_screen(
    view_projection: &Mat4,
    position: Vec3,
    width: u32,
    height: u32,
) -> Option<ScreenVertex> {
    let clip: Vec4 = *view_projection * position.extend(1.0);
    if clip.w <= CAMERA_NEAR * 0.5 {
        return None;
    }
    let inv_w = 1.0 / clip.w;
    let ndc = clip.truncate() * inv_w;
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }
    Some(ScreenVertex {
        x: (ndc.x * 0.5 + 0.5) * width as f32,
        y: (1.0 - (ndc.y * 0.5 + 0.5)) * height as f32,
        depth: ndc.z,
        inv_w,
    })
}
