//! Asset model and resolution
//!
//! An [`Asset`] is a named, source-tagged 3D content item: either a
//! full scene or a single object instance. Resolution from an id or an
//! explicit file path to loaded geometry happens behind the
//! [`AssetResolver`] trait; the built-in [`CatalogResolver`] reads OBJ
//! geometry and RON scene manifests from a catalog of sources.

pub mod catalog;
pub mod image_loader;
pub mod obj_loader;

pub use catalog::CatalogResolver;
pub use image_loader::ImageData;
pub use obj_loader::{ObjError, ObjLoader};

use std::path::PathBuf;

use thiserror::Error;

use crate::foundation::math::Transform;
use crate::render::{Material, Mesh};

/// Source metadata carried by every asset and copied into the scene
/// container it becomes
#[derive(Debug, Clone, Default)]
pub struct AssetInfo {
    /// Fully qualified id, `source.id`
    pub full_id: String,

    /// Source catalog name
    pub source: String,

    /// Id within the source
    pub id: String,

    /// Scene level (floor), when one was requested
    pub level: Option<u32>,

    /// Explicit file path, when the catalog was bypassed
    pub path: Option<PathBuf>,

    /// File format hint
    pub format: Option<String>,
}

/// What the pipeline asks a resolver for
#[derive(Debug, Clone, Default)]
pub struct AssetRequest {
    /// Source catalog name
    pub source: String,

    /// Id within the source
    pub id: String,

    /// Scene level (floor) to load
    pub level: Option<u32>,

    /// Explicit file path bypassing the catalog
    pub path: Option<PathBuf>,

    /// File format hint for an explicit path
    pub format: Option<String>,
}

impl AssetRequest {
    /// Fully qualified id, `source.id`
    pub fn full_id(&self) -> String {
        format!("{}.{}", self.source, self.id)
    }
}

/// One placed occurrence of an object within a scene
///
/// Carries its own transform and category labels. `mesh` is `None`
/// when the model reference failed to resolve; the assembler's
/// compaction step removes such instances before any bounding-box
/// math.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    /// Unique id of this placed instance
    pub instance_id: String,

    /// Id of the reusable model asset, when model-backed
    pub model_id: Option<String>,

    /// Semantic category labels of the model
    pub categories: Vec<String>,

    /// Free-form type tag for instances that are not model-backed
    /// (architecture elements such as walls and floors)
    pub type_tag: Option<String>,

    /// Placement within the scene
    pub transform: Transform,

    /// Resolved geometry, `None` when resolution failed
    pub mesh: Option<Mesh>,

    /// Surface material
    pub material: Material,
}

/// A full scene asset: metadata plus its placed instances
#[derive(Debug, Clone)]
pub struct SceneAsset {
    /// Source metadata
    pub info: AssetInfo,

    /// Scene-to-world placement; camera poses are given relative to
    /// this and must be transformed by it exactly once
    pub transform: Transform,

    /// Placed model instances, in manifest order
    pub instances: Vec<ModelInstance>,
}

/// A resolved asset: either a full scene or a single object instance
///
/// The assembler dispatches on this variant; any other asset shape a
/// resolver might produce must be rejected by the resolver itself.
#[derive(Debug, Clone)]
pub enum Asset {
    /// A full scene
    Scene(SceneAsset),

    /// A single object instance with its source metadata
    Object {
        /// Source metadata of the model
        info: AssetInfo,
        /// The loaded instance
        instance: Box<ModelInstance>,
    },
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found in any source
    #[error("asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset content
    #[error("failed to load asset: {0}")]
    LoadFailed(String),

    /// The asset resolves to a shape the assembler cannot wrap
    #[error("unsupported asset type for {0}")]
    UnsupportedAsset(String),

    /// Scene manifest error
    #[error("manifest error in {path}: {reason}")]
    Manifest {
        /// Manifest file
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// OBJ geometry error
    #[error("geometry error: {0}")]
    Geometry(#[from] ObjError),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves an asset request to a loaded asset
///
/// External seam: the pipeline only ever talks to this trait, so
/// alternative stores (remote catalogs, databases) can be swapped in.
pub trait AssetResolver {
    /// Resolve one request
    fn resolve(&mut self, request: &AssetRequest) -> Result<Asset, AssetError>;
}
