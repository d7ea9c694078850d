// SPDX-License-Identifier: GPL-3.0-only

//! Height-field mesh generation from depth grids
//!
//! The [`DepthGridProjector`] turns a raw depth grid into a [`TriMesh`] every
//! frame using lookup tables that are only rebuilt when the relevant part of
//! the [`MeshConfig`] snapshot changes.

mod color;
mod projector;
mod tables;

pub use color::hsv_to_rgb;
pub use projector::{DepthGridProjector, TableChanges, project_grid};
pub use tables::{DepthColorTable, DepthZTable, GridTables, depth_hue, depth_value};

use crate::constants::{SENSOR_HEIGHT, SENSOR_WIDTH, defaults};
use serde::{Deserialize, Serialize};

/// How the mesh surface is shaded
///
/// Replaces independent texture/infrared flags so that only meaningful
/// combinations exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Per-vertex colors from the depth hue ramp
    DepthColor,
    /// RGB video texture, shifted by the configured texture offset
    #[default]
    RgbTexture,
    /// Infrared video texture (already registered with depth, no offset)
    InfraredTexture,
}

impl RenderMode {
    pub const ALL: [RenderMode; 3] = [
        RenderMode::DepthColor,
        RenderMode::RgbTexture,
        RenderMode::InfraredTexture,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            RenderMode::DepthColor => "Depth Color",
            RenderMode::RgbTexture => "RGB Texture",
            RenderMode::InfraredTexture => "Infrared",
        }
    }

    /// Whether vertices carry texture coordinates (otherwise colors)
    pub fn uses_texture(&self) -> bool {
        !matches!(self, RenderMode::DepthColor)
    }

    /// Whether the sensor should capture infrared instead of RGB video
    pub fn captures_infrared(&self) -> bool {
        matches!(self, RenderMode::InfraredTexture)
    }

    /// Next mode in UI cycling order
    pub fn next(&self) -> RenderMode {
        match self {
            RenderMode::DepthColor => RenderMode::RgbTexture,
            RenderMode::RgbTexture => RenderMode::InfraredTexture,
            RenderMode::InfraredTexture => RenderMode::DepthColor,
        }
    }

    fn attribute_kind(&self) -> AttributeKind {
        if self.uses_texture() {
            AttributeKind::TexCoords
        } else {
            AttributeKind::Colors
        }
    }
}

/// Immutable snapshot of everything the projector depends on
///
/// Taken once per update tick; changes are detected by comparing snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshConfig {
    /// Sampling stride over the sensor grid (>= 1)
    pub divisor: usize,
    /// Smallest depth accepted as valid
    pub min_depth: u16,
    /// Largest depth accepted as valid
    pub max_depth: u16,
    /// Multiplier applied to the depth-to-Z table
    pub depth_scale: f32,
    /// Surface shading mode
    pub mode: RenderMode,
    /// (u, v) shift applied to RGB texture coordinates
    pub tex_offset: [f32; 2],
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            divisor: defaults::MESH_DIVISOR as usize,
            min_depth: defaults::MIN_DEPTH as u16,
            max_depth: defaults::MAX_DEPTH as u16,
            depth_scale: defaults::DEPTH_SCALE,
            mode: RenderMode::default(),
            tex_offset: [defaults::TEX_OFFSET_X, defaults::TEX_OFFSET_Y],
        }
    }
}

impl MeshConfig {
    /// Mesh grid dimensions `(cols, rows)` for the current divisor
    ///
    /// Integer division: a divisor that does not divide the sensor
    /// resolution crops the last partial cell.
    pub fn grid_dims(&self) -> (usize, usize) {
        grid_dims(self.divisor)
    }
}

/// Mesh grid dimensions `(cols, rows)` for a divisor
pub fn grid_dims(divisor: usize) -> (usize, usize) {
    let divisor = divisor.max(1);
    (SENSOR_WIDTH / divisor, SENSOR_HEIGHT / divisor)
}

/// Which per-vertex attribute channel a mesh carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    TexCoords,
    Colors,
}

/// Per-vertex attribute channel; texture coordinates and colors are
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshAttributes {
    TexCoords(Vec<[f32; 2]>),
    Colors(Vec<[f32; 3]>),
}

impl MeshAttributes {
    fn kind(&self) -> AttributeKind {
        match self {
            MeshAttributes::TexCoords(_) => AttributeKind::TexCoords,
            MeshAttributes::Colors(_) => AttributeKind::Colors,
        }
    }

    fn len(&self) -> usize {
        match self {
            MeshAttributes::TexCoords(v) => v.len(),
            MeshAttributes::Colors(v) => v.len(),
        }
    }
}

/// Indexed triangle mesh with a single attribute channel
#[derive(Debug, Clone, PartialEq)]
pub struct TriMesh {
    positions: Vec<[f32; 3]>,
    attributes: MeshAttributes,
    indices: Vec<[u32; 3]>,
}

impl Default for TriMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl TriMesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            attributes: MeshAttributes::TexCoords(Vec::new()),
            indices: Vec::new(),
        }
    }

    /// Remove all geometry and switch the attribute channel to `kind`
    ///
    /// Allocations are kept when the channel kind does not change.
    pub fn clear(&mut self, kind: AttributeKind) {
        self.positions.clear();
        self.indices.clear();
        if self.attributes.kind() == kind {
            match &mut self.attributes {
                MeshAttributes::TexCoords(v) => v.clear(),
                MeshAttributes::Colors(v) => v.clear(),
            }
        } else {
            self.attributes = match kind {
                AttributeKind::TexCoords => MeshAttributes::TexCoords(Vec::new()),
                AttributeKind::Colors => MeshAttributes::Colors(Vec::new()),
            };
        }
    }

    pub fn reserve(&mut self, vertices: usize, triangles: usize) {
        self.positions.reserve(vertices);
        self.indices.reserve(triangles);
        match &mut self.attributes {
            MeshAttributes::TexCoords(v) => v.reserve(vertices),
            MeshAttributes::Colors(v) => v.reserve(vertices),
        }
    }

    pub fn append_vertex(&mut self, position: [f32; 3]) {
        self.positions.push(position);
    }

    /// Append a texture coordinate; ignored when the mesh carries colors
    pub fn append_tex_coord(&mut self, uv: [f32; 2]) {
        match &mut self.attributes {
            MeshAttributes::TexCoords(v) => v.push(uv),
            MeshAttributes::Colors(_) => debug_assert!(false, "tex coord on a color mesh"),
        }
    }

    /// Append a vertex color; ignored when the mesh carries texture coordinates
    pub fn append_color(&mut self, rgb: [f32; 3]) {
        match &mut self.attributes {
            MeshAttributes::Colors(v) => v.push(rgb),
            MeshAttributes::TexCoords(_) => debug_assert!(false, "color on a textured mesh"),
        }
    }

    /// Append a triangle; indices must refer to already appended vertices
    pub fn append_triangle(&mut self, a: u32, b: u32, c: u32) {
        debug_assert!(
            (a.max(b).max(c) as usize) < self.positions.len(),
            "triangle references a vertex that does not exist yet"
        );
        self.indices.push([a, b, c]);
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn attributes(&self) -> &MeshAttributes {
        &self.attributes
    }

    pub fn attribute_kind(&self) -> AttributeKind {
        self.attributes.kind()
    }

    /// Number of entries in the attribute channel
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn tex_coords(&self) -> Option<&[[f32; 2]]> {
        match &self.attributes {
            MeshAttributes::TexCoords(v) => Some(v),
            MeshAttributes::Colors(_) => None,
        }
    }

    pub fn colors(&self) -> Option<&[[f32; 3]]> {
        match &self.attributes {
            MeshAttributes::Colors(v) => Some(v),
            MeshAttributes::TexCoords(_) => None,
        }
    }

    /// Smallest and largest vertex Z, or `None` for an empty mesh
    pub fn z_range(&self) -> Option<(f32, f32)> {
        self.positions.iter().fold(None, |acc, p| match acc {
            None => Some((p[2], p[2])),
            Some((lo, hi)) => Some((lo.min(p[2]), hi.max(p[2]))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dims_divisor_two() {
        assert_eq!(grid_dims(2), (320, 240));
    }

    #[test]
    fn test_grid_dims_truncates() {
        // 640 / 7 = 91.4, 480 / 7 = 68.5
        assert_eq!(grid_dims(7), (91, 68));
    }

    #[test]
    fn test_grid_dims_zero_divisor_is_one() {
        assert_eq!(grid_dims(0), (640, 480));
    }

    #[test]
    fn test_render_mode_cycle_visits_all() {
        let mut mode = RenderMode::DepthColor;
        for _ in 0..RenderMode::ALL.len() {
            mode = mode.next();
        }
        assert_eq!(mode, RenderMode::DepthColor);
    }

    #[test]
    fn test_render_mode_flags() {
        assert!(!RenderMode::DepthColor.uses_texture());
        assert!(RenderMode::RgbTexture.uses_texture());
        assert!(!RenderMode::RgbTexture.captures_infrared());
        assert!(RenderMode::InfraredTexture.captures_infrared());
    }

    #[test]
    fn test_clear_switches_attribute_channel() {
        let mut mesh = TriMesh::new();
        mesh.append_vertex([0.0, 0.0, 0.0]);
        mesh.append_tex_coord([0.0, 0.0]);
        mesh.clear(AttributeKind::Colors);

        assert!(mesh.is_empty());
        assert!(mesh.tex_coords().is_none());
        assert_eq!(mesh.colors().map(|c| c.len()), Some(0));
    }

    #[test]
    fn test_z_range() {
        let mut mesh = TriMesh::new();
        assert_eq!(mesh.z_range(), None);
        mesh.append_vertex([0.0, 0.0, 3.0]);
        mesh.append_vertex([0.0, 0.0, -1.0]);
        assert_eq!(mesh.z_range(), Some((-1.0, 3.0)));
    }
}
