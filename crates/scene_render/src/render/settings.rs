//! Renderer settings

use bitflags::bitflags;

bitflags! {
    /// Shading feature toggles
    ///
    /// All of these are cleared when semantic index encoding is
    /// active, since any shading contribution would bias the encoded
    /// pixel values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderFlags: u8 {
        /// Apply scene lights
        const LIGHTS = 1 << 0;
        /// Cast shadows (only meaningful with LIGHTS)
        const SHADOWS = 1 << 1;
        /// Apply ambient occlusion
        const AMBIENT_OCCLUSION = 1 << 2;
    }
}

/// Output dimensions and shading configuration for a render batch
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Shading feature toggles
    pub flags: RenderFlags,

    /// Use the PNG encoder's best-compression mode
    pub compress: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            flags: RenderFlags::AMBIENT_OCCLUSION,
            compress: false,
        }
    }
}

impl RenderSettings {
    /// Aspect ratio (width / height)
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
