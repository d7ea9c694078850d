// SPDX-License-Identifier: GPL-3.0-only

//! Live tunables and their parameter panel descriptions
//!
//! Every numeric tunable has a [`ParamSpec`] with its range, step and the pair
//! of keys that nudge it. Values are clamped on every write, so a
//! [`Tunables`] is always valid and its [`MeshConfig`] snapshot holds
//! `min_depth <= max_depth`.

use crate::constants::defaults;
use crate::mesh::{MeshConfig, RenderMode};
use serde::{Deserialize, Serialize};

/// Numeric tunables shown on the parameter panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Tilt,
    CameraDistance,
    MinDepth,
    MaxDepth,
    DepthScale,
    MeshResolution,
    TexOffsetX,
    TexOffsetY,
}

/// Range, step and key bindings of a numeric tunable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub id: ParamId,
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Decimal places shown on the panel (0 for integers)
    pub precision: usize,
    pub key_incr: char,
    pub key_decr: char,
}

impl ParamSpec {
    pub fn clamp(&self, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { self.min };
        let value = value.clamp(self.min, self.max);
        if self.precision == 0 {
            value.round()
        } else {
            value
        }
    }
}

/// Panel order matches the on-screen layout
pub static PARAMS: [ParamSpec; 8] = [
    ParamSpec {
        id: ParamId::Tilt,
        name: "Kinect Tilt",
        min: -31.0,
        max: 31.0,
        step: 1.0,
        precision: 0,
        key_incr: 'q',
        key_decr: 'a',
    },
    ParamSpec {
        id: ParamId::CameraDistance,
        name: "Cam Distance",
        min: 100.0,
        max: 5000.0,
        step: 10.0,
        precision: 0,
        key_incr: 's',
        key_decr: 'w',
    },
    ParamSpec {
        id: ParamId::MinDepth,
        name: "Min Depth",
        min: 0.0,
        max: 65000.0,
        step: 100.0,
        precision: 0,
        key_incr: 'e',
        key_decr: 'd',
    },
    ParamSpec {
        id: ParamId::MaxDepth,
        name: "Max Depth",
        min: 0.0,
        max: 65000.0,
        step: 100.0,
        precision: 0,
        key_incr: 'r',
        key_decr: 'f',
    },
    ParamSpec {
        id: ParamId::DepthScale,
        name: "Depth Scale",
        min: 0.0,
        max: 5.0,
        step: 0.01,
        precision: 2,
        key_incr: 't',
        key_decr: 'g',
    },
    ParamSpec {
        id: ParamId::MeshResolution,
        name: "Mesh Resolution",
        min: 1.0,
        max: 100.0,
        step: 1.0,
        precision: 0,
        key_incr: 'u',
        key_decr: 'j',
    },
    ParamSpec {
        id: ParamId::TexOffsetX,
        name: "RGB Offset X",
        min: -0.5,
        max: 0.5,
        step: 0.001,
        precision: 3,
        key_incr: 'i',
        key_decr: 'k',
    },
    ParamSpec {
        id: ParamId::TexOffsetY,
        name: "RGB Offset Y",
        min: -0.5,
        max: 0.5,
        step: 0.001,
        precision: 3,
        key_incr: 'o',
        key_decr: 'l',
    },
];

/// Key that toggles wireframe rendering
pub const KEY_WIREFRAME: char = 'z';
/// Key that cycles the render mode
pub const KEY_MODE: char = 'm';

pub fn spec(id: ParamId) -> &'static ParamSpec {
    // PARAMS lists every ParamId exactly once
    PARAMS
        .iter()
        .find(|p| p.id == id)
        .unwrap_or(&PARAMS[0])
}

/// Current value of every tunable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub tilt: i32,
    pub camera_distance: f32,
    pub min_depth: i32,
    pub max_depth: i32,
    pub depth_scale: f32,
    pub mesh_divisor: i32,
    pub tex_offset_x: f32,
    pub tex_offset_y: f32,
    pub wireframe: bool,
    pub mode: RenderMode,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            tilt: defaults::TILT,
            camera_distance: defaults::CAMERA_DISTANCE,
            min_depth: defaults::MIN_DEPTH,
            max_depth: defaults::MAX_DEPTH,
            depth_scale: defaults::DEPTH_SCALE,
            mesh_divisor: defaults::MESH_DIVISOR,
            tex_offset_x: defaults::TEX_OFFSET_X,
            tex_offset_y: defaults::TEX_OFFSET_Y,
            wireframe: false,
            mode: RenderMode::default(),
        }
    }
}

impl Tunables {
    pub fn get(&self, id: ParamId) -> f64 {
        match id {
            ParamId::Tilt => self.tilt as f64,
            ParamId::CameraDistance => self.camera_distance as f64,
            ParamId::MinDepth => self.min_depth as f64,
            ParamId::MaxDepth => self.max_depth as f64,
            ParamId::DepthScale => self.depth_scale as f64,
            ParamId::MeshResolution => self.mesh_divisor as f64,
            ParamId::TexOffsetX => self.tex_offset_x as f64,
            ParamId::TexOffsetY => self.tex_offset_y as f64,
        }
    }

    /// Set a tunable, clamping into its range
    ///
    /// The depth window never inverts: min is capped at max and vice versa.
    pub fn set(&mut self, id: ParamId, value: f64) {
        let value = spec(id).clamp(value);
        match id {
            ParamId::Tilt => self.tilt = value as i32,
            ParamId::CameraDistance => self.camera_distance = value as f32,
            ParamId::MinDepth => self.min_depth = (value as i32).min(self.max_depth),
            ParamId::MaxDepth => self.max_depth = (value as i32).max(self.min_depth),
            ParamId::DepthScale => self.depth_scale = value as f32,
            ParamId::MeshResolution => self.mesh_divisor = value as i32,
            ParamId::TexOffsetX => self.tex_offset_x = value as f32,
            ParamId::TexOffsetY => self.tex_offset_y = value as f32,
        }
    }

    /// Move a tunable by `steps` increments
    pub fn adjust(&mut self, id: ParamId, steps: i32) {
        let spec = spec(id);
        let value = self.get(id) + spec.step * steps as f64;
        // Drop accumulated float noise at the panel's precision
        let scale = 10f64.powi(spec.precision as i32);
        self.set(id, (value * scale).round() / scale);
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
    }

    /// Apply a parameter key binding; returns whether the key was used
    pub fn handle_key(&mut self, key: char) -> bool {
        if key == KEY_WIREFRAME {
            self.toggle_wireframe();
            return true;
        }
        if key == KEY_MODE {
            self.cycle_mode();
            return true;
        }
        for spec in &PARAMS {
            if key == spec.key_incr {
                self.adjust(spec.id, 1);
                return true;
            }
            if key == spec.key_decr {
                self.adjust(spec.id, -1);
                return true;
            }
        }
        false
    }

    /// Clamp every value into range (for values that bypassed [`Tunables::set`])
    pub fn sanitize(&mut self) {
        let (min_depth, max_depth) = (self.min_depth, self.max_depth);
        // Widen the window first so the order of the two writes does not matter
        self.min_depth = defaults::MIN_DEPTH;
        self.max_depth = defaults::MAX_DEPTH;
        self.set(ParamId::MinDepth, min_depth as f64);
        self.set(ParamId::MaxDepth, max_depth as f64);

        for spec in PARAMS
            .iter()
            .filter(|p| !matches!(p.id, ParamId::MinDepth | ParamId::MaxDepth))
        {
            self.set(spec.id, self.get(spec.id));
        }
    }

    /// Formatted value for the panel
    pub fn display_value(&self, id: ParamId) -> String {
        format!("{:.*}", spec(id).precision, self.get(id))
    }

    /// Snapshot consumed by the projector on the next update tick
    pub fn snapshot(&self) -> MeshConfig {
        MeshConfig {
            divisor: self.mesh_divisor.max(1) as usize,
            min_depth: self.min_depth.clamp(0, u16::MAX as i32) as u16,
            max_depth: self.max_depth.clamp(0, u16::MAX as i32) as u16,
            depth_scale: self.depth_scale.max(0.0),
            mode: self.mode,
            tex_offset: [self.tex_offset_x, self.tex_offset_y],
        }
    }
}
