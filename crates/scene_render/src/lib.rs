//! # Scene Render
//!
//! Batch scene-to-image rendering for dataset generation.
//!
//! Given an asset id (or file path) and a camera pose file, the
//! pipeline loads the scene once, then renders one PNG per camera
//! plus a final overview frame showing every camera's frustum. Frames
//! can be photometric, recolored by semantic category or object
//! index, or index-encoded so each pixel decodes back to the identity
//! it shows.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_render::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JobConfig {
//!         cameras: Some("cameras.txt".into()),
//!         ..Default::default()
//!     };
//!     let mut resolver = CatalogResolver::from_file(std::path::Path::new("catalog.ron"))?;
//!     let mut renderer = SoftwareRenderer::new(config.render_settings());
//!     let summary = run_job(&config, &mut resolver, &mut renderer)?;
//!     println!("wrote {} frame(s)", summary.outputs.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod assets;
pub mod camera;
pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod scheduler;
pub mod semantic;

mod pipeline;

pub use pipeline::{run_job, RenderSummary};

use thiserror::Error;

/// Top-level pipeline failure
///
/// The pipeline is fail-fast: the first error aborts the whole run,
/// and this type says which stage it came from.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The job description itself is unusable
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The camera file could not be parsed
    #[error(transparent)]
    CameraParse(#[from] camera::ParseError),

    /// Asset resolution or texture loading failed
    #[error(transparent)]
    Asset(#[from] assets::AssetError),

    /// Semantic coloring failed
    #[error(transparent)]
    Semantic(#[from] semantic::SemanticError),

    /// A config file could not be read
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    /// Rendering or frame output failed for one camera
    #[error("render failed for camera {camera}: {source}")]
    Render {
        /// Zero-based camera index within the run
        camera: usize,
        /// Underlying render failure
        source: render::RenderError,
    },
}

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        assets::{Asset, AssetRequest, AssetResolver, CatalogResolver},
        camera::{CameraDescriptor, CameraSet},
        config::{Config, JobConfig},
        foundation::math::{Mat4, Point3, Transform, Vec3},
        render::{PixelBuffer, Renderer, RenderSettings, SoftwareRenderer},
        run_job,
        scene::{SceneAssembler, SceneContainer},
        semantic::SemanticIndexTable,
        PipelineError, RenderSummary,
    };
}
