// SPDX-License-Identifier: GPL-3.0-only

//! Software triangle rasterizer for [`TriMesh`]
//!
//! Triangles are filled with edge functions and a z-buffer. Attributes are
//! interpolated perspective-correctly: either texture coordinates sampled from
//! the bound video image, or vertex colors. Triangles with a vertex outside
//! the clip range are skipped whole.

use super::camera::{Camera, ScreenVertex, project_to_screen};
use super::framebuffer::Framebuffer;
use crate::backends::sensor::VideoImage;
use crate::mesh::{MeshAttributes, TriMesh};
use glam::Vec3;

/// Color used for textured meshes when no texture is bound
const UNTEXTURED: [u8; 3] = [255, 255, 255];

/// Counters from one draw call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles_drawn: usize,
    pub triangles_clipped: usize,
}

/// Per-vertex shading input resolved from the mesh attributes
#[derive(Clone, Copy)]
enum Shading<'a> {
    Texture(&'a [[f32; 2]], &'a VideoImage),
    Flat,
    Colors(&'a [[f32; 3]]),
}

impl Shading<'_> {
    /// Color at barycentric weights `b` (already perspective corrected)
    #[inline]
    fn color(&self, tri: [usize; 3], b: [f32; 3]) -> [u8; 3] {
        match self {
            Shading::Texture(uvs, image) => {
                let u = b[0] * uvs[tri[0]][0] + b[1] * uvs[tri[1]][0] + b[2] * uvs[tri[2]][0];
                let v = b[0] * uvs[tri[0]][1] + b[1] * uvs[tri[1]][1] + b[2] * uvs[tri[2]][1];
                image.sample_uv(u, v)
            }
            Shading::Flat => UNTEXTURED,
            Shading::Colors(colors) => {
                let mut rgb = [0u8; 3];
                for (channel, out) in rgb.iter_mut().enumerate() {
                    let c = b[0] * colors[tri[0]][channel]
                        + b[1] * colors[tri[1]][channel]
                        + b[2] * colors[tri[2]][channel];
                    *out = (c.clamp(0.0, 1.0) * 255.0) as u8;
                }
                rgb
            }
        }
    }
}

/// Draw `mesh` into `fb`
///
/// `texture` is only used when the mesh carries texture coordinates.
pub fn draw_mesh(
    fb: &mut Framebuffer,
    mesh: &TriMesh,
    camera: &Camera,
    texture: Option<&VideoImage>,
    wireframe: bool,
) -> DrawStats {
    let mut stats = DrawStats::default();
    if mesh.is_empty() {
        return stats;
    }

    let shading = match (mesh.attributes(), texture) {
        (MeshAttributes::TexCoords(uvs), Some(image)) => Shading::Texture(uvs, image),
        (MeshAttributes::TexCoords(_), None) => Shading::Flat,
        (MeshAttributes::Colors(colors), _) => Shading::Colors(colors),
    };

    let view_projection = camera.view_projection();
    let (width, height) = (fb.width(), fb.height());
    let screen: Vec<Option<ScreenVertex>> = mesh
        .positions()
        .iter()
        .map(|&p| project_to_screen(&view_projection, Vec3::from_array(p), width, height))
        .collect();

    for tri in mesh.indices() {
        let idx = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(a), Some(b), Some(c)) = (screen[idx[0]], screen[idx[1]], screen[idx[2]]) else {
            stats.triangles_clipped += 1;
            continue;
        };

        if wireframe {
            draw_line(fb, &a, &b, shading.color(idx, [1.0, 0.0, 0.0]));
            draw_line(fb, &b, &c, shading.color(idx, [0.0, 1.0, 0.0]));
            draw_line(fb, &c, &a, shading.color(idx, [0.0, 0.0, 1.0]));
        } else {
            fill_triangle(fb, [a, b, c], idx, &shading);
        }
        stats.triangles_drawn += 1;
    }

    stats
}

#[inline]
fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn fill_triangle(fb: &mut Framebuffer, v: [ScreenVertex; 3], idx: [usize; 3], shading: &Shading) {
    let area = edge(&v[0], &v[1], v[2].x, v[2].y);
    if area.abs() < f32::EPSILON {
        return;
    }

    let min_x = v.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as i32;
    let max_x = v
        .iter()
        .map(|p| p.x)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil()
        .min(fb.width() as f32 - 1.0) as i32;
    let min_y = v.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as i32;
    let max_y = v
        .iter()
        .map(|p| p.y)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil()
        .min(fb.height() as f32 - 1.0) as i32;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let cx = px as f32 + 0.5;
            let cy = py as f32 + 0.5;

            // Dividing by the signed area accepts either winding
            let b0 = edge(&v[1], &v[2], cx, cy) / area;
            let b1 = edge(&v[2], &v[0], cx, cy) / area;
            let b2 = edge(&v[0], &v[1], cx, cy) / area;
            if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                continue;
            }

            let depth = b0 * v[0].depth + b1 * v[1].depth + b2 * v[2].depth;

            let w0 = b0 * v[0].inv_w;
            let w1 = b1 * v[1].inv_w;
            let w2 = b2 * v[2].inv_w;
            let sum = w0 + w1 + w2;
            let corrected = if sum > 0.0 {
                [w0 / sum, w1 / sum, w2 / sum]
            } else {
                [b0, b1, b2]
            };

            fb.set_pixel_with_depth(px, py, depth, shading.color(idx, corrected));
        }
    }
}

/// DDA line with linearly interpolated depth
fn draw_line(fb: &mut Framebuffer, a: &ScreenVertex, b: &ScreenVertex, color: [u8; 3]) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
    // Bound the work for edges that project far off-screen
    let steps = steps.min((fb.width() + fb.height()) as f32 * 2.0) as i32;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = a.x + dx * t;
        let y = a.y + dy * t;
        let depth = a.depth + (b.depth - a.depth) * t;
        fb.set_pixel_with_depth(x.floor() as i32, y.floor() as i32, depth, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sensor::{DepthGrid, VideoSource};
    use crate::constants::{SENSOR_HEIGHT, SENSOR_WIDTH};
    use crate::mesh::{DepthGridProjector, MeshConfig, RenderMode};

    fn camera() -> Camera {
        Camera {
            aspect: 1.0,
            ..Camera::default()
        }
    }

    fn flat_mesh(mode: RenderMode) -> TriMesh {
        flat_mesh_with_divisor(mode, 32)
    }

    fn flat_mesh_with_divisor(mode: RenderMode, divisor: usize) -> TriMesh {
        let config = MeshConfig {
            divisor,
            mode,
            tex_offset: [0.0, 0.0],
            ..MeshConfig::default()
        };
        let grid = DepthGrid::filled(SENSOR_WIDTH, SENSOR_HEIGHT, 1000);
        let mut projector = DepthGridProjector::new(&config);
        let mut mesh = TriMesh::new();
        projector.build(&grid, &config, &mut mesh);
        mesh
    }

    #[test]
    fn test_empty_mesh_draws_nothing() {
        let mut fb = Framebuffer::new(8, 8);
        let stats = draw_mesh(&mut fb, &TriMesh::new(), &camera(), None, false);
        assert_eq!(stats, DrawStats::default());
    }

    #[test]
    fn test_untextured_mesh_is_white_at_center() {
        let mut fb = Framebuffer::new(64, 64);
        let mesh = flat_mesh(RenderMode::RgbTexture);
        let stats = draw_mesh(&mut fb, &mesh, &camera(), None, false);

        assert_eq!(stats.triangles_drawn, mesh.num_triangles());
        assert_eq!(fb.get_pixel(32, 32), Some(UNTEXTURED));
    }

    #[test]
    fn test_texture_is_sampled() {
        let mut fb = Framebuffer::new(64, 64);
        let mesh = flat_mesh(RenderMode::RgbTexture);
        let texture =
            VideoImage::from_rgb(VideoSource::Rgb, 1, 1, vec![10, 20, 30]).unwrap();
        draw_mesh(&mut fb, &mesh, &camera(), Some(&texture), false);
        assert_eq!(fb.get_pixel(32, 32), Some([10, 20, 30]));
    }

    #[test]
    fn test_color_mesh_uses_vertex_colors() {
        let mut fb = Framebuffer::new(64, 64);
        let mesh = flat_mesh(RenderMode::DepthColor);
        draw_mesh(&mut fb, &mesh, &camera(), None, false);

        let expected = mesh.colors().unwrap()[0];
        let [r, g, b] = fb.get_pixel(32, 32).unwrap();
        let to_u8 = |c: f32| (c * 255.0) as i32;
        assert!((r as i32 - to_u8(expected[0])).abs() <= 1);
        assert!((g as i32 - to_u8(expected[1])).abs() <= 1);
        assert!((b as i32 - to_u8(expected[2])).abs() <= 1);
    }

    #[test]
    fn test_wireframe_leaves_gaps() {
        let mut filled = Framebuffer::new(64, 64);
        let mut wire = Framebuffer::new(64, 64);
        // 4 x 3 grid, so cells span several pixels
        let mesh = flat_mesh_with_divisor(RenderMode::RgbTexture, 160);
        draw_mesh(&mut filled, &mesh, &camera(), None, false);
        draw_mesh(&mut wire, &mesh, &camera(), None, true);

        let lit = |fb: &Framebuffer| {
            fb.as_bytes()
                .chunks(4)
                .filter(|px| px[..3] != [0, 0, 0])
                .count()
        };
        assert!(lit(&wire) > 0);
        assert!(lit(&wire) < lit(&filled));
    }

    #[test]
    fn test_mesh_behind_camera_is_clipped() {
        let mut fb = Framebuffer::new(16, 16);
        let mesh = flat_mesh(RenderMode::RgbTexture);
        let close = Camera {
            distance: 10.0,
            ..camera()
        };
        // The flat grid sits at z = 20, behind an eye at z = 10
        let stats = draw_mesh(&mut fb, &mesh, &close, None, false);
        assert_eq!(stats.triangles_drawn, 0);
        assert_eq!(stats.triangles_clipped, mesh.num_triangles());
    }
}
