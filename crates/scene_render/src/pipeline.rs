//! End-to-end job execution
//!
//! One call takes a job description to files on disk: read and parse
//! the camera file, resolve and assemble the asset, recolor if asked,
//! then hand the scene to the scheduler. Everything is fail-fast; no
//! frame is written unless every step before it succeeded.

use std::path::PathBuf;

use crate::assets::{AssetRequest, AssetResolver};
use crate::camera::CameraSet;
use crate::config::JobConfig;
use crate::render::Renderer;
use crate::scene::SceneAssembler;
use crate::scheduler::{RenderJob, RenderScheduler};
use crate::semantic::{color_scene, named_color, ColorMode, ColorOptions, SemanticIndexTable};
use crate::PipelineError;

pub use crate::scheduler::RenderSummary;

/// Execute one render job from configuration to output files
///
/// The resolver and renderer are the two external collaborators; the
/// pipeline owns everything in between. Returns the summary of what
/// was written.
pub fn run_job(
    config: &JobConfig,
    resolver: &mut dyn AssetResolver,
    renderer: &mut dyn Renderer,
) -> Result<RenderSummary, PipelineError> {
    let camera_path = config.validate().map_err(PipelineError::Configuration)?;
    let camera_text = std::fs::read_to_string(camera_path).map_err(|e| {
        PipelineError::Configuration(format!(
            "cannot read camera file {}: {e}",
            camera_path.display()
        ))
    })?;
    let mut cameras = CameraSet::parse(&camera_text, config.aspect())?;
    if cameras.is_empty() {
        log::warn!(
            "Camera file {} holds no cameras; only the overview frame will be rendered",
            camera_path.display()
        );
    }

    let request = AssetRequest {
        source: config.source.clone(),
        id: config.id.clone(),
        level: config.level,
        path: config.path.clone(),
        format: config.format.clone(),
    };
    let asset = resolver.resolve(&request)?;
    let mut scene = SceneAssembler::assemble(asset)?;

    // Camera poses are given in scene coordinates; bring them into
    // the render frame exactly once.
    let world = *scene.world_transform();
    cameras.apply_transform(&world);

    if let Some(bounds) = scene.bounds() {
        let dims = bounds.dimensions();
        log::info!(
            "Loaded {} bbdims: [{}, {}, {}]",
            scene.info.full_id,
            dims.x,
            dims.y,
            dims.z
        );
    } else {
        log::warn!("Loaded {} with no geometry", scene.info.full_id);
    }

    let mut table = SemanticIndexTable::new();
    let mode = effective_color_mode(config);
    if let Some(mode) = &mode {
        if let Some(seed) = seed_table_path(config, mode) {
            table.load_from_file(seed)?;
        }
        let options = ColorOptions {
            fallback: named_color(&config.color),
            encode: config.encode_index,
        };
        color_scene(&mut scene, mode, &options, &mut table);
    }

    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        PipelineError::Configuration(format!(
            "cannot create output directory {}: {e}",
            config.output_dir.display()
        ))
    })?;

    let job = RenderJob {
        basename: config.basename(),
        suffix: config.output_suffix(),
        limit: config.limit,
        compress: config.compress_png,
    };
    let summary = RenderScheduler::new().run(&mut scene, cameras.cameras(), renderer, &job)?;

    if config.write_index {
        if let Some(mode) = &mode {
            let path = index_table_path(config, mode);
            table.save_to_file(&path, config.encode_index)?;
            log::info!("Wrote index table to {}", path.display());
        }
    }

    log::info!(
        "Finished {}: {} frame(s) plus overview",
        scene.info.full_id,
        summary.rendered
    );
    Ok(summary)
}

/// Coloring scheme in effect for the job
///
/// Unknown scheme names render photometric; the scheme still names
/// the output files. Index encoding without a recognized scheme
/// colors by object index, since the encoded pixels are only useful
/// if each object is distinct.
fn effective_color_mode(config: &JobConfig) -> Option<ColorMode> {
    let parsed = config.color_by.as_deref().and_then(|scheme| {
        let mode = ColorMode::parse(scheme);
        if mode.is_none() {
            log::warn!("Unknown coloring scheme `{scheme}`, rendering photometric");
        }
        mode
    });
    match parsed {
        Some(mode) => Some(mode),
        None if config.encode_index => Some(ColorMode::Index),
        None => None,
    }
}

/// Previously written table to seed from, if the job names one
fn seed_table_path<'a>(config: &'a JobConfig, mode: &ColorMode) -> Option<&'a std::path::Path> {
    match mode {
        ColorMode::Category => config.index.as_deref(),
        ColorMode::Index => config.object_index.as_deref(),
    }
}

/// Where the final table is written when the job asks for it
fn index_table_path(config: &JobConfig, mode: &ColorMode) -> PathBuf {
    let scheme = match mode {
        ColorMode::Category => "category",
        ColorMode::Index => "index",
    };
    PathBuf::from(format!(
        "{}.{}.index.ron",
        config.basename().display(),
        scheme
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Asset, AssetError, AssetInfo, ModelInstance};
    use crate::camera::CameraDescriptor;
    use crate::foundation::math::Transform;
    use crate::render::{Material, Mesh, PixelBuffer, RenderError};
    use crate::scene::SceneContainer;

    struct FailingResolver;

    impl AssetResolver for FailingResolver {
        fn resolve(&mut self, request: &AssetRequest) -> Result<Asset, AssetError> {
            Err(AssetError::NotFound(request.full_id()))
        }
    }

    struct CubeResolver;

    impl AssetResolver for CubeResolver {
        fn resolve(&mut self, request: &AssetRequest) -> Result<Asset, AssetError> {
            Ok(Asset::Object {
                info: AssetInfo {
                    full_id: request.full_id(),
                    ..Default::default()
                },
                instance: Box::new(ModelInstance {
                    instance_id: request.id.clone(),
                    model_id: Some(request.id.clone()),
                    categories: vec!["cube".to_string()],
                    type_tag: None,
                    transform: Transform::identity(),
                    mesh: Some(Mesh::cube(1.0)),
                    material: Material::default(),
                }),
            })
        }
    }

    struct NullRenderer {
        calls: usize,
    }

    impl Renderer for NullRenderer {
        fn render(
            &mut self,
            _scene: &SceneContainer,
            _camera: &CameraDescriptor,
        ) -> Result<PixelBuffer, RenderError> {
            self.calls += 1;
            Ok(PixelBuffer::filled(2, 2, [0, 0, 0, 255]))
        }
    }

    fn workspace(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "scene_render_pipeline_{}_{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config_with_cameras(dir: &std::path::Path, lines: &str) -> JobConfig {
        let camera_file = dir.join("cameras.txt");
        std::fs::write(&camera_file, lines).unwrap();
        JobConfig {
            id: "cube".to_string(),
            source: "test".to_string(),
            cameras: Some(camera_file),
            output_dir: dir.join("out"),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_camera_file_is_configuration_error() {
        let config = JobConfig::default();
        let mut renderer = NullRenderer { calls: 0 };
        let err = run_job(&config, &mut CubeResolver, &mut renderer).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert_eq!(renderer.calls, 0);
    }

    #[test]
    fn test_unresolvable_asset_aborts_before_output() {
        let dir = workspace("abort");
        let config = config_with_cameras(&dir, "0 0 5 0 0 -1 0 1 0\n");
        let mut renderer = NullRenderer { calls: 0 };

        let err = run_job(&config, &mut FailingResolver, &mut renderer).unwrap_err();
        assert!(matches!(err, PipelineError::Asset(AssetError::NotFound(_))));
        assert_eq!(renderer.calls, 0);
        assert!(!config.output_dir.exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_writes_per_camera_and_overview_frames() {
        let dir = workspace("frames");
        let config = config_with_cameras(
            &dir,
            "0 0 5 0 0 -1 0 1 0\n0 0 -5 0 0 1 0 1 0 0.9\n",
        );
        let mut renderer = NullRenderer { calls: 0 };

        let summary = run_job(&config, &mut CubeResolver, &mut renderer).unwrap();
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.outputs.len(), 3);
        assert!(config.output_dir.join("cube-0.png").exists());
        assert!(config.output_dir.join("cube-2.png").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_index_persists_table() {
        let dir = workspace("index");
        let mut config = config_with_cameras(&dir, "0 0 5 0 0 -1 0 1 0\n");
        config.color_by = Some("category".to_string());
        config.write_index = true;
        let mut renderer = NullRenderer { calls: 0 };

        run_job(&config, &mut CubeResolver, &mut renderer).unwrap();
        let table_path = config.output_dir.join("cube.category.index.ron");
        assert!(table_path.exists());

        let mut reloaded = SemanticIndexTable::new();
        reloaded.load_from_file(&table_path).unwrap();
        assert_eq!(reloaded.get("cube"), Some(1));
        std::fs::remove_dir_all(&dir).ok();
    }

    struct MaterialRecordingRenderer {
        materials: Vec<Material>,
    }

    impl Renderer for MaterialRecordingRenderer {
        fn render(
            &mut self,
            scene: &SceneContainer,
            _camera: &CameraDescriptor,
        ) -> Result<PixelBuffer, RenderError> {
            if self.materials.is_empty() {
                for (_, node) in scene.iter() {
                    if let crate::scene::NodeKind::Object { material, .. } = &node.kind {
                        self.materials.push(material.clone());
                    }
                }
            }
            Ok(PixelBuffer::filled(2, 2, [0, 0, 0, 255]))
        }
    }

    #[test]
    fn test_unknown_scheme_renders_photometric() {
        let dir = workspace("passthrough");
        let mut config = config_with_cameras(&dir, "0 0 5 0 0 -1 0 1 0\n");
        config.color_by = Some("material".to_string());
        let mut renderer = MaterialRecordingRenderer { materials: vec![] };

        let summary = run_job(&config, &mut CubeResolver, &mut renderer).unwrap();
        assert_eq!(summary.rendered, 1);

        // The scheme still names the outputs, but nothing is recolored.
        assert!(config.output_dir.join("cube-0.material.png").exists());
        assert_eq!(renderer.materials, vec![Material::default()]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_camera_line_is_parse_error() {
        let dir = workspace("badcam");
        let config = config_with_cameras(&dir, "0 0 5 nonsense\n");
        let mut renderer = NullRenderer { calls: 0 };

        let err = run_job(&config, &mut CubeResolver, &mut renderer).unwrap_err();
        assert!(matches!(err, PipelineError::CameraParse(_)));
        std::fs::remove_dir_all(&dir).ok();
    }
}
