// SPDX-License-Identifier: GPL-3.0-only

//! Frame types shared by all sensors

use image::RgbImage;
use serde::Serialize;

/// Row-major grid of raw depth samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthGrid {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl DepthGrid {
    /// Wrap raw samples; returns `None` when the length does not match
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> Option<Self> {
        (data.len() == width * height).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Grid where every sample has the same value
    pub fn filled(width: usize, height: usize, value: u16) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a grid from a `(row, col)` sampling function
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u16) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u16] {
        &self.data
    }

    /// Sample at `(row, col)`, clamped to the grid edges
    ///
    /// An empty grid reads as 0 everywhere.
    #[inline]
    pub fn sample(&self, row: usize, col: usize) -> u16 {
        if self.data.is_empty() {
            return 0;
        }
        let row = row.min(self.height - 1);
        let col = col.min(self.width - 1);
        self.data[row * self.width + col]
    }
}

/// What a video frame was captured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoSource {
    Rgb,
    Infrared,
}

/// One video frame, always stored as 8-bit RGB
#[derive(Debug, Clone)]
pub struct VideoImage {
    pub source: VideoSource,
    pub pixels: RgbImage,
}

impl VideoImage {
    /// Build from packed RGB bytes; `None` if the length does not match
    pub fn from_rgb(source: VideoSource, width: u32, height: u32, rgb: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, rgb).map(|pixels| Self { source, pixels })
    }

    /// Expand 8-bit grayscale (infrared) bytes to RGB
    pub fn from_gray(width: u32, height: u32, gray: &[u8]) -> Option<Self> {
        let rgb = gray.iter().flat_map(|&v| [v, v, v]).collect();
        Self::from_rgb(VideoSource::Infrared, width, height, rgb)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Nearest-neighbour lookup at normalized coordinates, clamped to edges
    pub fn sample_uv(&self, u: f32, v: f32) -> [u8; 3] {
        let (w, h) = self.pixels.dimensions();
        if w == 0 || h == 0 {
            return [0, 0, 0];
        }
        let x = (u.clamp(0.0, 1.0) * (w - 1) as f32).round() as u32;
        let y = (v.clamp(0.0, 1.0) * (h - 1) as f32).round() as u32;
        self.pixels.get_pixel(x, y).0
    }
}

/// Description of a sensor for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorInfo {
    pub name: String,
    pub index: usize,
    pub serial: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(DepthGrid::new(4, 4, vec![0; 15]).is_none());
        assert!(DepthGrid::new(4, 4, vec![0; 16]).is_some());
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let grid = DepthGrid::from_fn(3, 2, |row, col| (row * 10 + col) as u16);
        assert_eq!(grid.data(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(grid.sample(1, 2), 12);
    }

    #[test]
    fn test_sample_clamps_to_edges() {
        let grid = DepthGrid::from_fn(3, 2, |row, col| (row * 10 + col) as u16);
        assert_eq!(grid.sample(5, 9), 12);
        assert_eq!(DepthGrid::filled(0, 0, 7).sample(0, 0), 0);
    }

    #[test]
    fn test_gray_expands_to_rgb() {
        let image = VideoImage::from_gray(2, 1, &[10, 200]).unwrap();
        assert_eq!(image.source, VideoSource::Infrared);
        assert_eq!(image.sample_uv(0.0, 0.0), [10, 10, 10]);
        assert_eq!(image.sample_uv(1.0, 0.0), [200, 200, 200]);
    }

    #[test]
    fn test_sample_uv_clamps() {
        let image = VideoImage::from_rgb(VideoSource::Rgb, 1, 1, vec![1, 2, 3]).unwrap();
        assert_eq!(image.sample_uv(-0.5, 1.7), [1, 2, 3]);
    }
}
