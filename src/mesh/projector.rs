// SPDX-License-Identifier: GPL-3.0-only

//! Depth grid to height-field mesh projection
//!
//! Every sampled grid cell becomes one vertex. Samples outside the configured
//! depth window collapse onto the Z of `min_depth` instead of being dropped, so
//! the mesh always keeps its full grid topology.

use super::tables::{DepthColorTable, DepthZTable, GridTables};
use super::{MeshConfig, RenderMode, TriMesh};
use crate::backends::sensor::DepthGrid;
use tracing::{debug, info};

/// Which tables were rebuilt while applying a config snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableChanges {
    pub grid: bool,
    pub depth_z: bool,
}

impl TableChanges {
    pub fn any(&self) -> bool {
        self.grid || self.depth_z
    }
}

/// Owns the lookup tables and rebuilds the mesh from depth grids
pub struct DepthGridProjector {
    grid_tables: GridTables,
    z_table: DepthZTable,
    color_table: DepthColorTable,
}

impl DepthGridProjector {
    pub fn new(config: &MeshConfig) -> Self {
        info!(
            divisor = config.divisor,
            depth_scale = config.depth_scale,
            "Initializing depth grid projector"
        );
        Self {
            grid_tables: GridTables::new(config.divisor),
            z_table: DepthZTable::new(config.depth_scale),
            color_table: DepthColorTable::new(),
        }
    }

    pub fn grid_tables(&self) -> &GridTables {
        &self.grid_tables
    }

    pub fn z_table(&self) -> &DepthZTable {
        &self.z_table
    }

    pub fn color_table(&self) -> &DepthColorTable {
        &self.color_table
    }

    /// Rebuild whichever tables depend on values that differ from `config`
    pub fn apply_config(&mut self, config: &MeshConfig) -> TableChanges {
        let mut changes = TableChanges::default();

        if self.grid_tables.divisor() != config.divisor.max(1) {
            debug!(
                old = self.grid_tables.divisor(),
                new = config.divisor,
                "Mesh divisor changed"
            );
            self.grid_tables = GridTables::new(config.divisor);
            changes.grid = true;
        }

        if self.z_table.scale() != config.depth_scale {
            debug!(
                old = self.z_table.scale(),
                new = config.depth_scale,
                "Depth scale changed"
            );
            self.z_table = DepthZTable::new(config.depth_scale);
            changes.depth_z = true;
        }

        changes
    }

    /// Clear `mesh` and repopulate it from `grid`
    ///
    /// Returns the tables that had to be rebuilt for `config` first.
    pub fn build(
        &mut self,
        grid: &DepthGrid,
        config: &MeshConfig,
        mesh: &mut TriMesh,
    ) -> TableChanges {
        let changes = self.apply_config(config);
        project_grid(
            grid,
            config,
            &self.grid_tables,
            &self.z_table,
            &self.color_table,
            mesh,
        );
        changes
    }
}

/// Project `grid` into `mesh` using tables that match `config`
///
/// Vertices are appended in row-major order. Each vertex that is not on the
/// first row or column closes the cell above and to its left with two
/// triangles, so indices only ever refer to earlier vertices.
pub fn project_grid(
    grid: &DepthGrid,
    config: &MeshConfig,
    grid_tables: &GridTables,
    z_table: &DepthZTable,
    color_table: &DepthColorTable,
    mesh: &mut TriMesh,
) {
    let cols = grid_tables.cols();
    let rows = grid_tables.rows();
    let divisor = grid_tables.divisor();

    mesh.clear(config.mode.attribute_kind());
    mesh.reserve(
        cols * rows,
        2 * cols.saturating_sub(1) * rows.saturating_sub(1),
    );

    let fallback_z = z_table.get(config.min_depth);
    let depth_window = config.min_depth..=config.max_depth;
    let [offset_u, offset_v] = match config.mode {
        RenderMode::RgbTexture => config.tex_offset,
        _ => [0.0, 0.0],
    };
    let cols_u32 = cols as u32;

    for (y, &pos_y) in grid_tables.y().iter().enumerate() {
        for (x, &pos_x) in grid_tables.x().iter().enumerate() {
            let depth = grid.sample(y * divisor, x * divisor);

            let z = if depth_window.contains(&depth) {
                z_table.get(depth)
            } else {
                fallback_z
            };
            mesh.append_vertex([pos_x, pos_y, z]);

            if config.mode.uses_texture() {
                mesh.append_tex_coord([
                    x as f32 / cols as f32 + offset_u,
                    y as f32 / rows as f32 + offset_v,
                ]);
            } else {
                mesh.append_color(color_table.get(depth));
            }

            if x > 0 && y > 0 {
                // Two triangles per square
                let br = (mesh.num_vertices() - 1) as u32;
                let tl = br - 1 - cols_u32;
                let tr = br - cols_u32;
                let bl = br - 1;
                mesh.append_triangle(tl, tr, br);
                mesh.append_triangle(tl, bl, br);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SENSOR_HEIGHT, SENSOR_WIDTH};
    use crate::mesh::AttributeKind;

    fn flat_grid(depth: u16) -> DepthGrid {
        DepthGrid::filled(SENSOR_WIDTH, SENSOR_HEIGHT, depth)
    }

    fn config_with_divisor(divisor: usize) -> MeshConfig {
        MeshConfig {
            divisor,
            ..MeshConfig::default()
        }
    }

    fn build(grid: &DepthGrid, config: &MeshConfig) -> TriMesh {
        let mut projector = DepthGridProjector::new(config);
        let mut mesh = TriMesh::new();
        projector.build(grid, config, &mut mesh);
        mesh
    }

    #[test]
    fn test_divisor_two_counts() {
        let mesh = build(&flat_grid(1000), &config_with_divisor(2));
        assert_eq!(mesh.num_vertices(), 76_800);
        assert_eq!(mesh.num_triangles(), 152_482);
    }

    #[test]
    fn test_counts_for_non_dividing_divisor() {
        let config = config_with_divisor(7);
        let (cols, rows) = config.grid_dims();
        let mesh = build(&flat_grid(1000), &config);
        assert_eq!(mesh.num_vertices(), cols * rows);
        assert_eq!(mesh.num_triangles(), 2 * (cols - 1) * (rows - 1));
    }

    #[test]
    fn test_indices_never_reference_later_vertices() {
        let config = config_with_divisor(40);
        let mesh = build(&flat_grid(1000), &config);
        let cols = config.grid_dims().0;
        // Triangles are appended right after their bottom-right vertex, so the
        // largest index of triangle pair k is the vertex that closed the cell.
        for tri in mesh.indices() {
            let br = tri[2];
            assert!(tri[0] < br && tri[1] < br);
            assert!((br as usize) < mesh.num_vertices());
            assert_eq!(tri[0], br - 1 - cols as u32);
        }
    }

    #[test]
    fn test_cell_winding() {
        let config = config_with_divisor(160); // 4 x 3 grid
        let mesh = build(&flat_grid(1000), &config);
        // First cell closes at vertex (row 1, col 1) = index 5
        assert_eq!(mesh.indices()[0], [0, 1, 5]);
        assert_eq!(mesh.indices()[1], [0, 4, 5]);
    }

    #[test]
    fn test_in_range_depth_uses_lookup() {
        let config = MeshConfig {
            min_depth: 500,
            max_depth: 2000,
            ..config_with_divisor(80)
        };
        let mut projector = DepthGridProjector::new(&config);
        let mut mesh = TriMesh::new();
        for depth in [500u16, 1234, 2000] {
            projector.build(&flat_grid(depth), &config, &mut mesh);
            let expected = projector.z_table().get(depth);
            assert!(mesh.positions().iter().all(|p| p[2] == expected));
        }
    }

    #[test]
    fn test_out_of_range_depth_clamps_to_min() {
        let config = MeshConfig {
            min_depth: 0,
            max_depth: 65000,
            ..config_with_divisor(80)
        };
        let mut projector = DepthGridProjector::new(&config);
        let mut mesh = TriMesh::new();
        projector.build(&flat_grid(65_535), &config, &mut mesh);
        let expected = projector.z_table().get(0);
        assert!(mesh.positions().iter().all(|p| p[2] == expected));
    }

    #[test]
    fn test_below_min_depth_clamps_to_min_lookup() {
        let config = MeshConfig {
            min_depth: 800,
            max_depth: 4000,
            depth_scale: 2.0,
            ..config_with_divisor(80)
        };
        let mesh = build(&flat_grid(300), &config);
        let expected = 800.0 / 50.0 * 2.0;
        assert!(mesh.positions().iter().all(|p| p[2] == expected));
    }

    #[test]
    fn test_color_mode_has_only_colors() {
        let config = MeshConfig {
            mode: RenderMode::DepthColor,
            ..config_with_divisor(16)
        };
        let mesh = build(&flat_grid(1000), &config);
        assert_eq!(mesh.attribute_kind(), AttributeKind::Colors);
        assert!(mesh.tex_coords().is_none());
        assert_eq!(mesh.num_attributes(), mesh.num_vertices());
    }

    #[test]
    fn test_texture_modes_have_only_tex_coords() {
        for mode in [RenderMode::RgbTexture, RenderMode::InfraredTexture] {
            let config = MeshConfig {
                mode,
                ..config_with_divisor(16)
            };
            let mesh = build(&flat_grid(1000), &config);
            assert_eq!(mesh.attribute_kind(), AttributeKind::TexCoords);
            assert!(mesh.colors().is_none());
            assert_eq!(mesh.num_attributes(), mesh.num_vertices());
        }
    }

    #[test]
    fn test_rgb_offset_applies_only_in_rgb_mode() {
        let rgb = MeshConfig {
            mode: RenderMode::RgbTexture,
            tex_offset: [0.1, -0.2],
            ..config_with_divisor(16)
        };
        let ir = MeshConfig {
            mode: RenderMode::InfraredTexture,
            ..rgb
        };
        let rgb_mesh = build(&flat_grid(1000), &rgb);
        let ir_mesh = build(&flat_grid(1000), &ir);

        assert_eq!(rgb_mesh.tex_coords().unwrap()[0], [0.1, -0.2]);
        assert_eq!(ir_mesh.tex_coords().unwrap()[0], [0.0, 0.0]);
    }

    #[test]
    fn test_apply_config_only_rebuilds_changed_tables() {
        let config = MeshConfig::default();
        let mut projector = DepthGridProjector::new(&config);

        assert!(!projector.apply_config(&config).any());

        let coarser = MeshConfig {
            divisor: 4,
            ..config
        };
        let changes = projector.apply_config(&coarser);
        assert!(changes.grid && !changes.depth_z);
        assert_eq!(projector.grid_tables().cols(), 160);

        let scaled = MeshConfig {
            depth_scale: 3.0,
            ..coarser
        };
        let changes = projector.apply_config(&scaled);
        assert!(!changes.grid && changes.depth_z);
    }

    #[test]
    fn test_build_reports_table_changes() {
        let config = config_with_divisor(8);
        let mut projector = DepthGridProjector::new(&config);
        let mut mesh = TriMesh::new();

        assert!(!projector.build(&flat_grid(1000), &config, &mut mesh).any());

        let coarser = MeshConfig {
            divisor: 16,
            ..config
        };
        let changes = projector.build(&flat_grid(1000), &coarser, &mut mesh);
        assert!(changes.grid && !changes.depth_z);
        assert_eq!(mesh.num_vertices(), 40 * 30);

        // Same snapshot again: nothing left to rebuild
        assert!(!projector.build(&flat_grid(1000), &coarser, &mut mesh).any());
    }

    #[test]
    fn test_mode_switch_clears_previous_attributes() {
        let color = MeshConfig {
            mode: RenderMode::DepthColor,
            ..config_with_divisor(32)
        };
        let textured = MeshConfig {
            mode: RenderMode::RgbTexture,
            ..color
        };
        let mut projector = DepthGridProjector::new(&color);
        let mut mesh = TriMesh::new();

        projector.build(&flat_grid(1000), &color, &mut mesh);
        projector.build(&flat_grid(1000), &textured, &mut mesh);

        assert!(mesh.colors().is_none());
        assert_eq!(mesh.num_attributes(), mesh.num_vertices());
    }
}
