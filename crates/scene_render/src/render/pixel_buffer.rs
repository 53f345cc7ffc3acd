//! CPU-side frame buffer and PNG serialization

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::RenderError;

/// An RGBA8 pixel buffer produced by a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer filled with one color
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Buffer width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read one pixel
    ///
    /// # Panics
    /// Panics when the coordinates are out of bounds.
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Write one pixel
    ///
    /// # Panics
    /// Panics when the coordinates are out of bounds.
    pub fn put(&mut self, x: u32, y: u32, color: [u8; 4]) {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = ((y * self.width + x) * 4) as usize;
        self.data[i..i + 4].copy_from_slice(&color);
    }

    /// Serialize the buffer to a PNG file
    ///
    /// `compress` selects the encoder's best-compression mode; the
    /// default mode favors encoding speed.
    pub fn save_png(&self, path: &Path, compress: bool) -> Result<(), RenderError> {
        let file = File::create(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let writer = BufWriter::new(file);

        let compression = if compress {
            CompressionType::Best
        } else {
            CompressionType::Fast
        };
        let encoder = PngEncoder::new_with_quality(writer, compression, FilterType::Adaptive);
        encoder.write_image(
            &self.data,
            self.width,
            self.height,
            ExtendedColorType::Rgba8,
        )?;

        log::debug!("Wrote {}x{} PNG to {:?}", self.width, self.height, path);
        Ok(())
    }
}
