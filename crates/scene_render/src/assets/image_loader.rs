//! Image loading utilities for texture data

use std::path::Path;

use crate::assets::AssetError;

/// Decoded image data ready for sampling
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        let img = image::open(path_ref)
            .map_err(|e| AssetError::LoadFailed(format!("failed to load image: {e}")))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Create a solid color image (useful for testing and defaults)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Mean RGB of the image, linearized to 0..=1
    ///
    /// The software rasterizer has no texture mapping; it modulates
    /// the material color by this average instead.
    pub fn average_rgb(&self) -> [f32; 3] {
        let pixel_count = (self.width * self.height) as f32;
        if pixel_count == 0.0 {
            return [0.0; 3];
        }
        let mut sums = [0.0f32; 3];
        for pixel in self.data.chunks_exact(4) {
            sums[0] += f32::from(pixel[0]);
            sums[1] += f32::from(pixel[1]);
            sums[2] += f32::from(pixel[2]);
        }
        [
            sums[0] / pixel_count / 255.0,
            sums[1] / pixel_count / 255.0,
            sums[2] / pixel_count / 255.0,
        ]
    }
}
