// SPDX-License-Identifier: GPL-3.0-only

//! Color + depth buffer the rasterizer draws into

use image::RgbaImage;

/// Owned RGBA color buffer with a matching depth buffer
///
/// Depth stores normalized device depth; smaller is closer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        Self {
            width,
            height,
            color: vec![[0, 0, 0, 255]; len],
            depth: vec![f32::INFINITY; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate if the size changed, then clear
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        } else {
            self.clear();
        }
    }

    /// Clear to opaque black and reset depth
    pub fn clear(&mut self) {
        self.color.fill([0, 0, 0, 255]);
        self.depth.fill(f32::INFINITY);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height)
            .then(|| (y as u32 * self.width + x as u32) as usize)
    }

    /// Write a pixel if it is closer than what is already there
    #[inline]
    pub fn set_pixel_with_depth(&mut self, x: i32, y: i32, depth: f32, color: [u8; 3]) {
        if let Some(idx) = self.index(x, y)
            && depth < self.depth[idx]
        {
            self.depth[idx] = depth;
            self.color[idx] = [color[0], color[1], color[2], 255];
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        self.index(x, y).map(|idx| {
            let [r, g, b, _] = self.color[idx];
            [r, g, b]
        })
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color)
    }

    /// Copy into an `image` buffer for encoding
    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel_with_depth(1, 1, 0.5, [255, 0, 0]);
        fb.set_pixel_with_depth(1, 1, 0.8, [0, 255, 0]);
        assert_eq!(fb.get_pixel(1, 1), Some([255, 0, 0]));
        fb.set_pixel_with_depth(1, 1, 0.2, [0, 0, 255]);
        assert_eq!(fb.get_pixel(1, 1), Some([0, 0, 255]));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set_pixel_with_depth(-1, 0, 0.1, [1, 1, 1]);
        fb.set_pixel_with_depth(2, 0, 0.1, [1, 1, 1]);
        assert_eq!(fb.get_pixel(2, 0), None);
        assert!(fb.as_bytes().chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_resize_clears() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set_pixel_with_depth(0, 0, 0.1, [9, 9, 9]);
        fb.resize(2, 2);
        assert_eq!(fb.get_pixel(0, 0), Some([0, 0, 0]));
        fb.resize(3, 1);
        assert_eq!(fb.as_bytes().len(), 12);
    }

    #[test]
    fn test_to_image_dimensions() {
        let image = Framebuffer::new(5, 3).to_image().unwrap();
        assert_eq!(image.dimensions(), (5, 3));
    }
}
