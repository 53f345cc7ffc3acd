//! Catalog-backed asset resolver
//!
//! A catalog maps source names to directories on disk. Objects are
//! Wavefront OBJ files; scenes are RON manifests listing placed model
//! instances with their transforms, category labels, and materials.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::assets::{
    Asset, AssetError, AssetInfo, AssetRequest, AssetResolver, ModelInstance, ObjLoader,
    SceneAsset,
};
use crate::foundation::math::{Transform, Vec3};
use crate::render::{Material, Mesh};

const DEFAULT_OBJECT_COLOR: [f32; 3] = [0.62, 0.62, 0.62];

/// One named asset source in the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSource {
    /// Source name, referenced by asset requests
    pub name: String,

    /// Directory holding this source's assets
    pub root: PathBuf,

    /// Default file format (`obj` or `ron`)
    pub format: String,
}

/// Resolver backed by a catalog of on-disk sources
pub struct CatalogResolver {
    sources: HashMap<String, CatalogSource>,
}

impl CatalogResolver {
    /// Create a resolver with no registered sources
    ///
    /// Only explicit-path requests will resolve.
    pub fn empty() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Create a resolver from a list of sources
    pub fn with_sources(sources: Vec<CatalogSource>) -> Self {
        Self {
            sources: sources.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    /// Load a catalog from a RON file holding a list of sources
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let contents = std::fs::read_to_string(path)?;
        let sources: Vec<CatalogSource> =
            ron::from_str(&contents).map_err(|e| AssetError::Manifest {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        log::info!("Registered {} asset source(s) from {:?}", sources.len(), path);
        Ok(Self::with_sources(sources))
    }

    fn locate(&self, request: &AssetRequest) -> Result<(PathBuf, String), AssetError> {
        if let Some(path) = &request.path {
            let format = request
                .format
                .clone()
                .or_else(|| {
                    path.extension()
                        .map(|e| e.to_string_lossy().to_lowercase())
                })
                .ok_or_else(|| {
                    AssetError::LoadFailed(format!("no format for explicit path {path:?}"))
                })?;
            return Ok((path.clone(), format));
        }

        let source = self
            .sources
            .get(&request.source)
            .ok_or_else(|| AssetError::NotFound(request.full_id()))?;
        let format = request.format.clone().unwrap_or_else(|| source.format.clone());
        let path = source.root.join(format!("{}.{}", request.id, format));
        Ok((path, format))
    }

    fn load_object(
        &self,
        path: &Path,
        request: &AssetRequest,
        info: AssetInfo,
    ) -> Result<Asset, AssetError> {
        let mesh = ObjLoader::load_obj(path)?;
        let instance = ModelInstance {
            instance_id: request.id.clone(),
            model_id: Some(request.id.clone()),
            categories: Vec::new(),
            type_tag: None,
            transform: Transform::identity(),
            mesh: Some(mesh),
            material: Material::with_color(
                DEFAULT_OBJECT_COLOR[0],
                DEFAULT_OBJECT_COLOR[1],
                DEFAULT_OBJECT_COLOR[2],
            ),
        };
        Ok(Asset::Object {
            info,
            instance: Box::new(instance),
        })
    }

    fn load_scene(
        &self,
        path: &Path,
        request: &AssetRequest,
        info: AssetInfo,
    ) -> Result<Asset, AssetError> {
        let contents = std::fs::read_to_string(path)?;
        let manifest: SceneManifest = ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .from_str(&contents)
            .map_err(|e| AssetError::Manifest {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut instances = Vec::with_capacity(manifest.instances.len());
        for (index, decl) in manifest.instances.into_iter().enumerate() {
            // A level filter keeps only instances on the requested floor.
            if let (Some(level), Some(decl_level)) = (request.level, decl.level) {
                if level != decl_level {
                    continue;
                }
            }
            instances.push(decl.into_instance(index, base_dir));
        }

        Ok(Asset::Scene(SceneAsset {
            info,
            transform: Transform {
                position: Vec3::from(manifest.position),
                scale: Vec3::from(manifest.scale),
                ..Default::default()
            },
            instances,
        }))
    }
}

impl AssetResolver for CatalogResolver {
    fn resolve(&mut self, request: &AssetRequest) -> Result<Asset, AssetError> {
        let (path, format) = self.locate(request)?;
        if !path.exists() {
            return Err(AssetError::NotFound(format!(
                "{} ({})",
                request.full_id(),
                path.display()
            )));
        }

        let info = AssetInfo {
            full_id: request.full_id(),
            source: request.source.clone(),
            id: request.id.clone(),
            level: request.level,
            path: Some(path.clone()),
            format: Some(format.clone()),
        };

        match format.as_str() {
            "obj" => self.load_object(&path, request, info),
            "ron" | "scene" => self.load_scene(&path, request, info),
            other => Err(AssetError::UnsupportedAsset(format!(
                "{} (format `{other}`)",
                request.full_id()
            ))),
        }
    }
}

/// RON scene manifest: a scene placement plus its placed instances
#[derive(Debug, Deserialize)]
struct SceneManifest {
    /// Scene-to-world position
    #[serde(default)]
    position: [f32; 3],

    /// Scene-to-world scale
    #[serde(default = "unit_scale")]
    scale: [f32; 3],

    instances: Vec<InstanceDecl>,
}

/// One instance declaration within a scene manifest
#[derive(Debug, Deserialize)]
struct InstanceDecl {
    /// Explicit instance id; defaults to the manifest position
    #[serde(default)]
    id: Option<String>,

    /// Model-backed geometry: OBJ path relative to the manifest
    #[serde(default)]
    model: Option<PathBuf>,

    /// Id of the reusable model asset
    #[serde(default)]
    model_id: Option<String>,

    /// Free-form type tag for non-model nodes (walls, floors)
    #[serde(default)]
    kind: Option<String>,

    /// Box geometry half-extents for non-model nodes
    #[serde(default)]
    box_extents: Option<[f32; 3]>,

    /// Scene level (floor) this instance belongs to
    #[serde(default)]
    level: Option<u32>,

    /// Semantic category labels
    #[serde(default)]
    categories: Vec<String>,

    /// Placement position
    #[serde(default)]
    position: [f32; 3],

    /// Per-axis scale
    #[serde(default = "unit_scale")]
    scale: [f32; 3],

    /// Material color
    #[serde(default)]
    color: Option<[f32; 3]>,

    /// Texture image path relative to the manifest
    #[serde(default)]
    texture: Option<PathBuf>,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl InstanceDecl {
    fn into_instance(self, index: usize, base_dir: &Path) -> ModelInstance {
        let mesh = match (&self.model, self.box_extents) {
            (Some(model), _) => {
                let model_path = base_dir.join(model);
                match ObjLoader::load_obj(&model_path) {
                    Ok(mesh) => Some(mesh),
                    Err(e) => {
                        log::warn!("Failed to resolve model {:?}: {}", model_path, e);
                        None
                    }
                }
            }
            (None, Some(extents)) => Some(box_mesh(Vec3::from(extents))),
            (None, None) => {
                log::warn!("Instance {index} declares no geometry");
                None
            }
        };

        let color = self.color.unwrap_or(DEFAULT_OBJECT_COLOR);
        let mut material = Material::with_color(color[0], color[1], color[2]);
        material.texture_path = self.texture.map(|t| base_dir.join(t));

        ModelInstance {
            instance_id: self.id.unwrap_or_else(|| index.to_string()),
            model_id: self.model_id,
            categories: self.categories,
            type_tag: self.kind,
            transform: Transform {
                position: Vec3::from(self.position),
                scale: Vec3::from(self.scale),
                ..Default::default()
            },
            mesh,
            material,
        }
    }
}

/// Axis-aligned box mesh with per-axis half-extents
fn box_mesh(extents: Vec3) -> Mesh {
    let mut mesh = Mesh::cube(1.0);
    for vertex in &mut mesh.vertices {
        vertex.position = [
            vertex.position[0] * extents.x,
            vertex.position[1] * extents.y,
            vertex.position[2] * extents.z,
        ];
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "scene_render_catalog_{}_{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn test_unknown_source_is_not_found() {
        let mut resolver = CatalogResolver::empty();
        let err = resolver
            .resolve(&AssetRequest {
                source: "nowhere".to_string(),
                id: "x".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn test_resolve_object_from_explicit_path() {
        let dir = temp_dir("object");
        let obj_path = dir.join("chair.obj");
        std::fs::write(&obj_path, TRIANGLE_OBJ).unwrap();

        let mut resolver = CatalogResolver::empty();
        let asset = resolver
            .resolve(&AssetRequest {
                source: "file".to_string(),
                id: "chair".to_string(),
                path: Some(obj_path),
                ..Default::default()
            })
            .unwrap();

        match asset {
            Asset::Object { instance, .. } => {
                assert!(instance.mesh.is_some());
                assert_eq!(instance.model_id.as_deref(), Some("chair"));
            }
            Asset::Scene(_) => panic!("expected an object asset"),
        }
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_resolve_scene_manifest_with_unresolved_model() {
        let dir = temp_dir("scene");
        std::fs::write(dir.join("desk.obj"), TRIANGLE_OBJ).unwrap();
        let manifest = r#"(
            instances: [
                (id: "desk_0", model: "desk.obj", categories: ["desk"]),
                (id: "ghost", model: "missing.obj", categories: ["sofa"]),
                (kind: "Wall", box_extents: (2.0, 1.0, 0.1)),
            ],
        )"#;
        let scene_path = dir.join("room.ron");
        std::fs::write(&scene_path, manifest).unwrap();

        let mut resolver = CatalogResolver::empty();
        let asset = resolver
            .resolve(&AssetRequest {
                source: "file".to_string(),
                id: "room".to_string(),
                path: Some(scene_path),
                ..Default::default()
            })
            .unwrap();

        let Asset::Scene(scene) = asset else {
            panic!("expected a scene asset");
        };
        assert_eq!(scene.instances.len(), 3);
        assert!(scene.instances[0].mesh.is_some());
        assert!(scene.instances[1].mesh.is_none());
        assert_eq!(scene.instances[2].type_tag.as_deref(), Some("Wall"));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_manifest_scene_transform() {
        let dir = temp_dir("transform");
        let manifest = r#"(
            position: (100.0, 0.0, -5.0),
            instances: [
                (kind: "Floor", box_extents: (4.0, 0.1, 4.0)),
            ],
        )"#;
        let scene_path = dir.join("placed.ron");
        std::fs::write(&scene_path, manifest).unwrap();

        let mut resolver = CatalogResolver::empty();
        let asset = resolver
            .resolve(&AssetRequest {
                source: "file".to_string(),
                id: "placed".to_string(),
                path: Some(scene_path),
                ..Default::default()
            })
            .unwrap();

        let Asset::Scene(scene) = asset else {
            panic!("expected a scene asset");
        };
        assert_eq!(scene.transform.position, Vec3::new(100.0, 0.0, -5.0));
        assert_eq!(scene.transform.scale, Vec3::new(1.0, 1.0, 1.0));
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_catalog_source_lookup() {
        let dir = temp_dir("lookup");
        std::fs::write(dir.join("lamp.obj"), TRIANGLE_OBJ).unwrap();

        let mut resolver = CatalogResolver::with_sources(vec![CatalogSource {
            name: "props".to_string(),
            root: dir.clone(),
            format: "obj".to_string(),
        }]);

        let asset = resolver
            .resolve(&AssetRequest {
                source: "props".to_string(),
                id: "lamp".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert!(matches!(asset, Asset::Object { .. }));

        let err = resolver
            .resolve(&AssetRequest {
                source: "props".to_string(),
                id: "no_such_thing".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
