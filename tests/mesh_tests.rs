// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the depth grid projector

use kinect_mesh::backends::sensor::DepthGrid;
use kinect_mesh::mesh::{
    AttributeKind, DepthColorTable, DepthGridProjector, GridTables, MeshConfig, RenderMode,
    TriMesh, depth_hue, depth_value,
};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

fn build(grid: &DepthGrid, config: &MeshConfig) -> (DepthGridProjector, TriMesh) {
    let mut projector = DepthGridProjector::new(config);
    let mut mesh = TriMesh::new();
    projector.build(grid, config, &mut mesh);
    (projector, mesh)
}

#[test]
fn test_default_divisor_counts() {
    let grid = DepthGrid::filled(WIDTH, HEIGHT, 1200);
    let config = MeshConfig {
        divisor: 2,
        ..MeshConfig::default()
    };
    let (projector, mesh) = build(&grid, &config);

    assert_eq!(projector.grid_tables().cols(), 320);
    assert_eq!(projector.grid_tables().rows(), 240);
    assert_eq!(mesh.num_vertices(), 76_800);
    assert_eq!(mesh.num_triangles(), 152_482);
}

#[test]
fn test_counts_follow_every_divisor() {
    let grid = DepthGrid::filled(WIDTH, HEIGHT, 1200);
    for divisor in [1, 3, 5, 7, 16, 100] {
        let config = MeshConfig {
            divisor,
            ..MeshConfig::default()
        };
        let (_, mesh) = build(&grid, &config);
        let cols = WIDTH / divisor;
        let rows = HEIGHT / divisor;
        assert_eq!(mesh.num_vertices(), cols * rows, "divisor {}", divisor);
        assert_eq!(
            mesh.num_triangles(),
            2 * (rows - 1) * (cols - 1),
            "divisor {}",
            divisor
        );
    }
}

#[test]
fn test_z_follows_lookup_or_clamps_to_min_depth() {
    let grid = DepthGrid::from_fn(WIDTH, HEIGHT, |row, col| {
        ((row * WIDTH + col) * 37 % 65_536) as u16
    });
    let config = MeshConfig {
        divisor: 1,
        min_depth: 1000,
        max_depth: 40_000,
        depth_scale: 1.5,
        ..MeshConfig::default()
    };
    let (projector, mesh) = build(&grid, &config);
    let z_table = projector.z_table();

    for row in 0..HEIGHT {
        for col in 0..WIDTH {
            let raw = grid.sample(row, col);
            let expected = if (config.min_depth..=config.max_depth).contains(&raw) {
                z_table.get(raw)
            } else {
                z_table.get(config.min_depth)
            };
            assert_eq!(mesh.positions()[row * WIDTH + col][2], expected);
        }
    }
}

#[test]
fn test_out_of_range_depth_uses_lookup_zero() {
    // Above the depth window and at the top of the sensor range
    let grid = DepthGrid::filled(WIDTH, HEIGHT, u16::MAX);
    let config = MeshConfig {
        min_depth: 0,
        max_depth: 65_000,
        ..MeshConfig::default()
    };
    let (projector, mesh) = build(&grid, &config);
    let z0 = projector.z_table().get(0);
    assert!(mesh.positions().iter().all(|p| p[2] == z0));
}

#[test]
fn test_modes_are_exclusive() {
    let grid = DepthGrid::filled(WIDTH, HEIGHT, 1200);
    for mode in RenderMode::ALL {
        let config = MeshConfig {
            divisor: 8,
            mode,
            ..MeshConfig::default()
        };
        let (_, mesh) = build(&grid, &config);
        if mode.uses_texture() {
            assert_eq!(mesh.attribute_kind(), AttributeKind::TexCoords);
            assert_eq!(mesh.tex_coords().map(<[_]>::len), Some(mesh.num_vertices()));
            assert!(mesh.colors().is_none());
        } else {
            assert_eq!(mesh.attribute_kind(), AttributeKind::Colors);
            assert_eq!(mesh.colors().map(<[_]>::len), Some(mesh.num_vertices()));
            assert!(mesh.tex_coords().is_none());
        }
    }
}

#[test]
fn test_indices_never_reference_later_vertices() {
    let grid = DepthGrid::filled(WIDTH, HEIGHT, 1200);
    let config = MeshConfig {
        divisor: 10,
        ..MeshConfig::default()
    };
    let (_, mesh) = build(&grid, &config);

    // Triangles are emitted right after their bottom-right vertex
    let mut max_seen = 0u32;
    for tri in mesh.indices() {
        let br = tri[2];
        assert!(tri.iter().all(|&i| i <= br));
        assert!(br >= max_seen);
        max_seen = br;
    }
}

#[test]
fn test_table_regeneration_is_idempotent() {
    for divisor in [1, 2, 3, 7] {
        assert_eq!(GridTables::new(divisor), GridTables::new(divisor));
    }
    assert_eq!(DepthColorTable::new(), DepthColorTable::new());
}

#[test]
fn test_color_ramp_is_monotonic() {
    let mut wraps = 0;
    for i in 1..65_536 {
        if depth_hue(i) >= depth_hue(i - 1) {
            wraps += 1;
        }
        assert!(depth_value(i) > depth_value(i - 1));
    }
    assert_eq!(wraps, 1);
}

#[test]
fn test_rebuild_replaces_previous_mesh() {
    let config = MeshConfig::default();
    let mut projector = DepthGridProjector::new(&config);
    let mut mesh = TriMesh::new();

    projector.build(&DepthGrid::filled(WIDTH, HEIGHT, 500), &config, &mut mesh);
    let first = mesh.clone();
    projector.build(&DepthGrid::filled(WIDTH, HEIGHT, 500), &config, &mut mesh);
    assert_eq!(first, mesh);

    let coarse = MeshConfig {
        divisor: 4,
        ..config
    };
    projector.build(&DepthGrid::filled(WIDTH, HEIGHT, 500), &coarse, &mut mesh);
    assert_eq!(mesh.num_vertices(), 160 * 120);
}
