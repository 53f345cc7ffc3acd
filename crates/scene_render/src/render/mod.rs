//! Rendering seam and primitives
//!
//! The orchestration core never rasterizes anything itself; it drives
//! an implementation of the [`Renderer`] trait. A small flat-shaded
//! software rasterizer ([`SoftwareRenderer`]) is provided so the tool
//! works end-to-end without a GPU, and tests substitute their own
//! doubles behind the same trait.

pub mod material;
pub mod mesh;
pub mod pixel_buffer;
pub mod settings;
pub mod software;

pub use material::Material;
pub use mesh::{Mesh, MeshTopology, Vertex};
pub use pixel_buffer::PixelBuffer;
pub use settings::{RenderFlags, RenderSettings};
pub use software::SoftwareRenderer;

use std::path::PathBuf;

use thiserror::Error;

use crate::camera::CameraDescriptor;
use crate::scene::SceneContainer;

/// Rasterization or image serialization failure
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to write an output file
    #[error("failed to write {path}: {source}")]
    Io {
        /// Path that could not be written
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// The camera pose cannot produce a valid view
    #[error("degenerate camera pose: {0}")]
    Camera(String),
}

/// Rasterizes a scene from one camera into a pixel buffer
///
/// Implementations must not assume anything about call ordering; the
/// scheduler guarantees all scene resources are loaded before the
/// first call.
pub trait Renderer {
    /// Render one frame
    fn render(
        &mut self,
        scene: &SceneContainer,
        camera: &CameraDescriptor,
    ) -> Result<PixelBuffer, RenderError>;
}
