// SPDX-License-Identifier: MPL-2.0

//! Kinect Mesh - live height-field mesh from a depth camera
//!
//! Every depth frame is turned into a triangulated grid whose Z follows the
//! measured depth, shaded either with the camera's video stream or with a
//! depth hue ramp, and rendered in the terminal.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`mesh`]: Lookup tables and the depth grid to mesh projector
//! - [`backends`]: Depth sensor abstraction (Kinect, synthetic, disconnected)
//! - [`render`]: Software rasterizer for the mesh
//! - [`app`]: Live tunables and the update/draw loop
//! - [`terminal`]: Terminal frontend
//! - [`config`]: Startup configuration
//!
//! # Example
//!
//! ```
//! use kinect_mesh::backends::sensor::DepthGrid;
//! use kinect_mesh::mesh::{DepthGridProjector, MeshConfig, TriMesh};
//!
//! let config = MeshConfig::default();
//! let grid = DepthGrid::filled(640, 480, 1000);
//! let mut projector = DepthGridProjector::new(&config);
//! let mut mesh = TriMesh::new();
//! projector.build(&grid, &config, &mut mesh);
//! assert_eq!(mesh.num_vertices(), 320 * 240);
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod mesh;
pub mod render;
pub mod terminal;

// Re-export commonly used types
pub use app::{MeshApp, Tunables};
pub use config::Config;
pub use mesh::{DepthGridProjector, MeshConfig, RenderMode, TriMesh};
