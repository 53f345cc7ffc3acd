//! Surface materials

use std::path::PathBuf;

use crate::assets::ImageData;

/// Surface appearance for a renderable node
///
/// Colors are linear 0..=1 RGB. A material whose `unlit` flag is set
/// bypasses all shading: the base color is written to the frame
/// verbatim, which is what semantic index encoding relies on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    /// Base surface color
    pub base_color: [f32; 3],

    /// Skip all shading and emit the base color directly
    pub unlit: bool,

    /// Texture image path, resolved lazily by the load barrier
    pub texture_path: Option<PathBuf>,

    /// Decoded texture, present once loads have drained
    pub texture: Option<ImageData>,
}

impl Material {
    /// Create a lit material with the given color
    pub fn with_color(r: f32, g: f32, b: f32) -> Self {
        Self {
            base_color: [r, g, b],
            ..Default::default()
        }
    }

    /// Create an unlit flat-color material
    ///
    /// This is the override shape the index allocator installs: no
    /// texture, no shading, color taken as-is.
    pub fn flat(color: [u8; 3]) -> Self {
        Self {
            base_color: [
                f32::from(color[0]) / 255.0,
                f32::from(color[1]) / 255.0,
                f32::from(color[2]) / 255.0,
            ],
            unlit: true,
            texture_path: None,
            texture: None,
        }
    }

    /// Base color quantized to 8-bit channels
    pub fn color_u8(&self) -> [u8; 3] {
        [
            (self.base_color[0].clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.base_color[1].clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.base_color[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// Whether this material still waits on a texture load
    pub fn texture_pending(&self) -> bool {
        self.texture_path.is_some() && self.texture.is_none()
    }
}
