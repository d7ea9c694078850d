// SPDX-License-Identifier: GPL-3.0-only

//! CPU rendering of the height-field mesh
//!
//! - [`camera`]: perspective camera and scene rotation
//! - [`framebuffer`]: RGBA color + depth target
//! - [`raster`]: triangle and wireframe rasterization

pub mod camera;
pub mod framebuffer;
pub mod raster;

pub use camera::Camera;
pub use framebuffer::Framebuffer;
pub use raster::{DrawStats, draw_mesh};
