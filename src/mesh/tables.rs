// SPDX-License-Identifier: GPL-3.0-only

//! Lookup tables used by the projector
//!
//! Each table is an owned boxed slice sized for the configuration value it was
//! built from. Tables are replaced wholesale when that value changes.

use super::color::hsv_to_rgb;
use super::grid_dims;
use crate::constants::{DEPTH_TO_METERS_DIVISOR, DEPTH_VALUE_COUNT, MESH_EXTENT_X, MESH_EXTENT_Y};
use tracing::debug;

/// Screen-space X/Y positions per mesh column and row
#[derive(Debug, Clone, PartialEq)]
pub struct GridTables {
    divisor: usize,
    x: Box<[f32]>,
    y: Box<[f32]>,
}

impl GridTables {
    pub fn new(divisor: usize) -> Self {
        let divisor = divisor.max(1);
        let (cols, rows) = grid_dims(divisor);
        debug!(divisor, cols, rows, "Building grid lookup tables");

        let half_x = MESH_EXTENT_X / 2.0;
        let half_y = MESH_EXTENT_Y / 2.0;
        let x = (0..cols)
            .map(|col| col as f32 / cols as f32 * MESH_EXTENT_X - half_x)
            .collect();
        let y = (0..rows)
            .map(|row| half_y - row as f32 / rows as f32 * MESH_EXTENT_Y)
            .collect();

        Self { divisor, x, y }
    }

    pub fn divisor(&self) -> usize {
        self.divisor
    }

    pub fn cols(&self) -> usize {
        self.x.len()
    }

    pub fn rows(&self) -> usize {
        self.y.len()
    }

    pub fn x(&self) -> &[f32] {
        &self.x
    }

    pub fn y(&self) -> &[f32] {
        &self.y
    }
}

/// Raw depth value to scene Z
#[derive(Debug, Clone, PartialEq)]
pub struct DepthZTable {
    scale: f32,
    z: Box<[f32]>,
}

impl DepthZTable {
    pub fn new(scale: f32) -> Self {
        debug!(scale, "Building depth-to-Z lookup table");
        let z = (0..DEPTH_VALUE_COUNT)
            .map(|i| i as f32 / DEPTH_TO_METERS_DIVISOR * scale)
            .collect();
        Self { scale, z }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Z for a raw depth value; the table covers every `u16`
    #[inline]
    pub fn get(&self, depth: u16) -> f32 {
        self.z[depth as usize]
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

/// Hue of the depth ramp at table index `i`
///
/// Starts at 0.5 (cyan) for depth 0 and rotates backwards through the hue
/// circle, wrapping once.
pub fn depth_hue(i: usize) -> f32 {
    let t = i as f32 / DEPTH_VALUE_COUNT as f32;
    (1.0 - t + 0.5).rem_euclid(1.0)
}

/// Brightness of the depth ramp at table index `i`, from 0.5 to 1.0
pub fn depth_value(i: usize) -> f32 {
    let t = i as f32 / DEPTH_VALUE_COUNT as f32;
    0.5 + 0.5 * t
}

/// Raw depth value to RGB color (hue ramp)
///
/// The range is fixed, so this is built once per projector.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthColorTable {
    colors: Box<[[f32; 3]]>,
}

impl Default for DepthColorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthColorTable {
    pub fn new() -> Self {
        debug!("Building depth-to-color lookup table");
        let colors = (0..DEPTH_VALUE_COUNT)
            .map(|i| hsv_to_rgb(depth_hue(i), 1.0, depth_value(i)))
            .collect();
        Self { colors }
    }

    #[inline]
    pub fn get(&self, depth: u16) -> [f32; 3] {
        self.colors[depth as usize]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
