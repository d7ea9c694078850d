// SPDX-License-Identifier: GPL-3.0-only

//! Procedural depth scene
//!
//! Casts one ray per sensor pixel through a small room: a floor, a back wall
//! and a ball swinging from side to side. Depth is reported in millimeters as
//! z-distance, like the Kinect does, and 0 marks "no reading". Every poll
//! advances the animation by one frame, so output is deterministic.

use super::{DepthGrid, DepthSensor, VideoImage, VideoSource, clamp_tilt};
use crate::constants::{SENSOR_HEIGHT, SENSOR_WIDTH, kinect};
use crate::errors::SensorError;
use glam::{Quat, Vec3};
use tracing::debug;

const FLOOR_DROP_MM: f32 = 900.0;
const WALL_DISTANCE_MM: f32 = 3500.0;
const BALL_RADIUS_MM: f32 = 350.0;
const BALL_DISTANCE_MM: f32 = 1800.0;
const BALL_SWING_MM: f32 = 500.0;
const CHECKER_MM: f32 = 250.0;
const FRAME_PERIOD_S: f32 = 1.0 / 30.0;
const SWING_RATE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Floor,
    Wall,
    Ball,
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    distance: f32,
    surface: Surface,
    point: Vec3,
}

/// Sensor that renders a synthetic room instead of talking to hardware
pub struct SyntheticSensor {
    frame_index: u64,
    tilt: i8,
    infrared: bool,
    depth: Option<DepthGrid>,
    video: Option<VideoImage>,
    pending_video: Option<VideoImage>,
}

impl Default for SyntheticSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticSensor {
    pub fn new() -> Self {
        Self {
            frame_index: 0,
            tilt: 0,
            infrared: false,
            depth: None,
            video: None,
            pending_video: None,
        }
    }

    /// Number of frames produced so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn ball_center(&self) -> Vec3 {
        let phase = self.frame_index as f32 * FRAME_PERIOD_S * SWING_RATE;
        Vec3::new(
            BALL_SWING_MM * phase.sin(),
            FLOOR_DROP_MM - BALL_RADIUS_MM,
            BALL_DISTANCE_MM,
        )
    }

    /// Nearest surface along `dir` (world space, camera at the origin)
    fn trace(dir: Vec3, ball: Vec3) -> Option<Hit> {
        let mut best: Option<Hit> = None;
        let mut consider = |distance: f32, surface: Surface| {
            if distance > 0.0 && best.is_none_or(|b| distance < b.distance) {
                best = Some(Hit {
                    distance,
                    surface,
                    point: dir * distance,
                });
            }
        };

        // Image y grows downwards, so the floor sits at +y
        if dir.y > 0.0 {
            consider(FLOOR_DROP_MM / dir.y, Surface::Floor);
        }
        if dir.z > 0.0 {
            consider(WALL_DISTANCE_MM / dir.z, Surface::Wall);
        }

        let a = dir.length_squared();
        let b = -2.0 * dir.dot(ball);
        let c = ball.length_squared() - BALL_RADIUS_MM * BALL_RADIUS_MM;
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            consider((-b - disc.sqrt()) / (2.0 * a), Surface::Ball);
        }

        best
    }

    fn shade(hit: &Hit, dir: Vec3, ball: Vec3) -> [u8; 3] {
        match hit.surface {
            Surface::Wall => {
                let cx = (hit.point.x / CHECKER_MM).floor() as i64;
                let cy = (hit.point.y / CHECKER_MM).floor() as i64;
                if (cx + cy).rem_euclid(2) == 0 {
                    [214, 206, 190]
                } else {
                    [70, 96, 140]
                }
            }
            Surface::Floor => {
                let gx = hit.point.x.rem_euclid(500.0);
                let gz = hit.point.z.rem_euclid(500.0);
                if gx < 20.0 || gz < 20.0 {
                    [40, 40, 40]
                } else {
                    [128, 122, 110]
                }
            }
            Surface::Ball => {
                let normal = (hit.point - ball).normalize_or_zero();
                let light = (-dir.normalize_or_zero()).dot(normal).max(0.0);
                let k = 0.3 + 0.7 * light;
                [(240.0 * k) as u8, (130.0 * k) as u8, (40.0 * k) as u8]
            }
        }
    }

    /// Render the next frame into depth and video buffers
    fn render_frame(&mut self) {
        self.frame_index += 1;

        let rotation = Quat::from_rotation_x((self.tilt as f32).to_radians());
        let ball = self.ball_center();

        let mut depth = Vec::with_capacity(SENSOR_WIDTH * SENSOR_HEIGHT);
        let mut rgb = Vec::with_capacity(SENSOR_WIDTH * SENSOR_HEIGHT * 3);

        for v in 0..SENSOR_HEIGHT {
            for u in 0..SENSOR_WIDTH {
                // z = 1 in camera space, so ray distance equals z-depth
                let ray = Vec3::new(
                    (u as f32 - kinect::CX) / kinect::FX,
                    (v as f32 - kinect::CY) / kinect::FY,
                    1.0,
                );
                let dir = rotation * ray;

                match Self::trace(dir, ball) {
                    Some(hit) if hit.distance < kinect::MAX_RANGE_MM => {
                        depth.push(hit.distance as u16);
                        if self.infrared {
                            let falloff = (1.0 - hit.distance / kinect::MAX_RANGE_MM).powi(2);
                            let level = (255.0 * falloff) as u8;
                            rgb.extend_from_slice(&[level, level, level]);
                        } else {
                            rgb.extend_from_slice(&Self::shade(&hit, dir, ball));
                        }
                    }
                    _ => {
                        depth.push(0);
                        rgb.extend_from_slice(&[0, 0, 0]);
                    }
                }
            }
        }

        let source = if self.infrared {
            VideoSource::Infrared
        } else {
            VideoSource::Rgb
        };
        self.depth = DepthGrid::new(SENSOR_WIDTH, SENSOR_HEIGHT, depth);
        self.pending_video = VideoImage::from_rgb(
            source,
            SENSOR_WIDTH as u32,
            SENSOR_HEIGHT as u32,
            rgb,
        );
    }
}

impl DepthSensor for SyntheticSensor {
    fn name(&self) -> &str {
        "Synthetic Scene"
    }

    fn poll_depth_frame(&mut self) -> bool {
        self.render_frame();
        self.depth.is_some()
    }

    fn depth_grid(&self) -> Option<&DepthGrid> {
        self.depth.as_ref()
    }

    fn poll_video_frame(&mut self) -> bool {
        match self.pending_video.take() {
            Some(video) => {
                self.video = Some(video);
                true
            }
            None => false,
        }
    }

    fn video_image(&self) -> Option<&VideoImage> {
        self.video.as_ref()
    }

    fn set_tilt(&mut self, degrees: i8) -> Result<(), SensorError> {
        let degrees = clamp_tilt(degrees as i32);
        debug!(degrees, "Setting synthetic tilt");
        self.tilt = degrees;
        Ok(())
    }

    fn tilt(&self) -> Result<i8, SensorError> {
        Ok(self.tilt)
    }

    fn set_infrared(&mut self, enabled: bool) -> Result<(), SensorError> {
        if self.infrared != enabled {
            debug!(enabled, "Switching synthetic video source");
            self.infrared = enabled;
        }
        Ok(())
    }
}
