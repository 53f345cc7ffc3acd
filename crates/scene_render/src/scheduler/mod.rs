//! Render scheduling
//!
//! Drives a loaded scene through a single run: wait for pending
//! resource loads, render one frame per camera, then composite the
//! overview frame with every camera's frustum drawn in. The run is
//! fail-fast; the first camera that fails aborts everything after it.

use std::path::PathBuf;

use crate::assets::{AssetError, ImageData};
use crate::camera::CameraDescriptor;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::{RenderError, Renderer};
use crate::scene::{frustum, SceneContainer};
use crate::PipelineError;

/// Where a run currently is
///
/// States only ever advance; a failed run stops in whatever state it
/// failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Scene is being assembled
    Assembling,
    /// Waiting for the load barrier to drain
    AwaitingLoads,
    /// Rendering per-camera frames
    Rendering,
    /// Rendering the frustum overview frame
    Compositing,
    /// Run complete
    Done,
}

/// Output naming and limits for one run
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Output path prefix; frame `i` goes to `{basename}-{i}{suffix}`
    pub basename: PathBuf,

    /// Filename suffix including the extension
    pub suffix: String,

    /// Render at most this many cameras
    pub limit: Option<usize>,

    /// Use best PNG compression
    pub compress: bool,
}

impl RenderJob {
    /// Output path for the frame at the given index
    pub fn frame_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}-{}{}", self.basename.display(), index, self.suffix))
    }
}

/// Gate between scene assembly and the first render call
///
/// Collects the scene's pending texture loads and resolves them all
/// before any frame is rendered. The barrier fires exactly once; a
/// drained barrier stays drained.
#[derive(Debug, Default)]
pub struct LoadBarrier {
    fired: bool,
}

impl LoadBarrier {
    /// Create an undrained barrier
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the barrier has fired
    pub fn is_drained(&self) -> bool {
        self.fired
    }

    /// Load every pending texture into the scene and fire
    ///
    /// Returns how many textures were loaded. Subsequent calls are
    /// no-ops.
    pub fn drain(&mut self, scene: &mut SceneContainer) -> Result<usize, AssetError> {
        if self.fired {
            return Ok(0);
        }

        let pending = scene.pending_textures();
        let count = pending.len();
        for (key, path) in pending {
            let texture = ImageData::from_file(&path)?;
            scene.set_texture(key, texture);
        }

        self.fired = true;
        if count > 0 {
            log::info!("Loaded {count} texture(s)");
        }
        Ok(count)
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RenderSummary {
    /// Number of per-camera frames written
    pub rendered: usize,

    /// Frame index the overview frame was written at
    pub overview_index: usize,

    /// Every file written, in write order
    pub outputs: Vec<PathBuf>,
}

/// Drives one run through its states
#[derive(Debug)]
pub struct RenderScheduler {
    state: SchedulerState,
    barrier: LoadBarrier,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderScheduler {
    /// Create a scheduler ready for one run
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Assembling,
            barrier: LoadBarrier::new(),
        }
    }

    /// Current run state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Execute the run: drain loads, render every camera, then the
    /// overview frame
    ///
    /// The overview frame reuses the frame numbering: with `n` frames
    /// rendered it is written at index `n`, so output indices are
    /// contiguous even when a limit truncates the camera list.
    pub fn run(
        &mut self,
        scene: &mut SceneContainer,
        cameras: &[CameraDescriptor],
        renderer: &mut dyn Renderer,
        job: &RenderJob,
    ) -> Result<RenderSummary, PipelineError> {
        self.state = SchedulerState::AwaitingLoads;
        self.barrier.drain(scene)?;

        self.state = SchedulerState::Rendering;
        let count = job.limit.map_or(cameras.len(), |l| l.min(cameras.len()));
        let mut outputs = Vec::with_capacity(count + 1);

        for (index, camera) in cameras.iter().take(count).enumerate() {
            let path = job.frame_path(index);
            self.write_frame(scene, camera, renderer, &path, job.compress)
                .map_err(|source| PipelineError::Render { camera: index, source })?;
            log::info!("Rendered frame {} to {}", index, path.display());
            outputs.push(path);
        }

        self.state = SchedulerState::Compositing;
        // Cameras are already world-transformed, but frustum nodes go
        // through world-transform propagation like every other node.
        // Author their geometry in scene-local space so propagation
        // lands them back where the cameras actually are.
        let world_inverse = scene
            .world_transform()
            .try_inverse()
            .unwrap_or_else(Mat4::identity);
        for (index, camera) in cameras.iter().enumerate() {
            let mut local = camera.clone();
            local.apply_transform(&world_inverse);
            scene.insert(frustum::frustum_node(index, &local));
        }
        scene.update_world_transforms();

        let overview = overview_camera(scene, cameras);
        let overview_index = count;
        let path = job.frame_path(overview_index);
        self.write_frame(scene, &overview, renderer, &path, job.compress)
            .map_err(|source| PipelineError::Render {
                camera: overview_index,
                source,
            })?;
        log::info!("Rendered overview frame to {}", path.display());
        outputs.push(path);

        self.state = SchedulerState::Done;
        Ok(RenderSummary {
            rendered: count,
            overview_index,
            outputs,
        })
    }

    fn write_frame(
        &mut self,
        scene: &SceneContainer,
        camera: &CameraDescriptor,
        renderer: &mut dyn Renderer,
        path: &std::path::Path,
        compress: bool,
    ) -> Result<(), RenderError> {
        debug_assert!(self.barrier.is_drained());
        let frame = renderer.render(scene, camera)?;
        frame.save_png(path, compress)
    }
}

/// Place a camera that sees the whole scene plus the frusta
///
/// Backs away from the scene center along a fixed oblique direction
/// far enough for the bounding sphere to fit the default field of
/// view. Scenes without geometry fall back to the default camera.
fn overview_camera(scene: &SceneContainer, cameras: &[CameraDescriptor]) -> CameraDescriptor {
    let aspect = cameras
        .first()
        .map_or(4.0 / 3.0, |camera| camera.aspect);
    let mut overview = CameraDescriptor::default_with_aspect(aspect);

    let Some(bounds) = scene.bounds() else {
        return overview;
    };

    let center = bounds.center();
    let radius = bounds.radius().max(1e-3);
    let back = Vec3::new(0.6, 0.45, 0.9).normalize();
    let distance = radius / (overview.fov * 0.5).tan() * 1.4;

    overview.position = center + back * distance;
    overview.direction = -back;
    overview.near = (distance - radius * 2.0).max(distance * 1e-3);
    overview.far = distance + radius * 4.0;
    overview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetInfo;
    use crate::foundation::math::Point3;
    use crate::render::{Material, Mesh, PixelBuffer};
    use crate::scene::container::{NodeIdentity, NodeKind, SceneNode};

    struct CountingRenderer {
        calls: usize,
        fail_at: Option<usize>,
    }

    impl CountingRenderer {
        fn new() -> Self {
            Self {
                calls: 0,
                fail_at: None,
            }
        }
    }

    impl Renderer for CountingRenderer {
        fn render(
            &mut self,
            _scene: &SceneContainer,
            _camera: &CameraDescriptor,
        ) -> Result<PixelBuffer, RenderError> {
            if self.fail_at == Some(self.calls) {
                return Err(RenderError::Camera("forced failure".to_string()));
            }
            self.calls += 1;
            Ok(PixelBuffer::filled(4, 4, [0, 0, 0, 255]))
        }
    }

    fn test_scene() -> SceneContainer {
        let mut scene = SceneContainer::new(AssetInfo::default());
        scene.insert(SceneNode::new(
            "cube",
            NodeKind::Object {
                mesh: Mesh::cube(1.0),
                material: Material::default(),
                identity: NodeIdentity::default(),
            },
        ));
        scene.update_world_transforms();
        scene.compute_bounds();
        scene
    }

    fn cameras(n: usize) -> Vec<CameraDescriptor> {
        (0..n)
            .map(|i| {
                let mut camera = CameraDescriptor::default_with_aspect(1.0);
                camera.position = Point3::new(i as f32, 0.0, 5.0);
                camera
            })
            .collect()
    }

    fn job(tag: &str) -> RenderJob {
        let dir = std::env::temp_dir().join(format!(
            "scene_render_scheduler_{}_{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        RenderJob {
            basename: dir.join("scene"),
            suffix: ".png".to_string(),
            limit: None,
            compress: false,
        }
    }

    #[test]
    fn test_frame_path_layout() {
        let job = RenderJob {
            basename: PathBuf::from("out/abc_2"),
            suffix: ".category.png".to_string(),
            limit: None,
            compress: false,
        };
        assert_eq!(job.frame_path(3), PathBuf::from("out/abc_2-3.category.png"));
    }

    #[test]
    fn test_run_renders_each_camera_plus_overview() {
        let mut scene = test_scene();
        let mut renderer = CountingRenderer::new();
        let job = job("all");

        let summary = RenderScheduler::new()
            .run(&mut scene, &cameras(3), &mut renderer, &job)
            .unwrap();

        assert_eq!(summary.rendered, 3);
        assert_eq!(summary.overview_index, 3);
        assert_eq!(summary.outputs.len(), 4);
        assert_eq!(renderer.calls, 4);
        assert!(summary.outputs.iter().all(|p| p.exists()));
        std::fs::remove_dir_all(job.basename.parent().unwrap()).ok();
    }

    #[test]
    fn test_limit_truncates_but_keeps_all_frusta() {
        let mut scene = test_scene();
        let mut renderer = CountingRenderer::new();
        let mut job = job("limit");
        job.limit = Some(2);

        let summary = RenderScheduler::new()
            .run(&mut scene, &cameras(5), &mut renderer, &job)
            .unwrap();

        // Two per-camera frames, overview at index 2.
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.overview_index, 2);
        assert_eq!(summary.outputs.len(), 3);

        // The overview still shows every camera in the file.
        assert_eq!(scene.frustum_count(), 5);
        std::fs::remove_dir_all(job.basename.parent().unwrap()).ok();
    }

    #[test]
    fn test_frusta_land_on_cameras_under_scene_transform() {
        let mut scene = test_scene();
        scene.set_world_transform(Mat4::new_translation(&Vec3::new(100.0, 0.0, 0.0)));
        scene.update_world_transforms();
        scene.compute_bounds();

        // A camera already expressed in world space, as the pipeline
        // hands them to the scheduler.
        let mut camera = CameraDescriptor::default_with_aspect(1.0);
        camera.position = Point3::new(95.0, 0.0, 5.0);
        let authored = crate::scene::frustum::make_camera_frustum(&camera);

        let mut renderer = CountingRenderer::new();
        let job = job("world");
        RenderScheduler::new()
            .run(&mut scene, &[camera], &mut renderer, &job)
            .unwrap();

        let (effective, local) = scene
            .iter()
            .find_map(|(_, node)| match &node.kind {
                NodeKind::Frustum { mesh, .. } => {
                    Some((node.world_transform, mesh.vertices[0].position))
                }
                _ => None,
            })
            .unwrap();
        let placed = effective.transform_point(&Point3::new(local[0], local[1], local[2]));
        let expected = authored.vertices[0].position;

        // World propagation must not shift the frustum a second time.
        assert!((placed.x - expected[0]).abs() < 1e-3);
        assert!((placed.y - expected[1]).abs() < 1e-3);
        assert!((placed.z - expected[2]).abs() < 1e-3);
        std::fs::remove_dir_all(job.basename.parent().unwrap()).ok();
    }

    #[test]
    fn test_failure_aborts_remaining_cameras() {
        let mut scene = test_scene();
        let mut renderer = CountingRenderer::new();
        renderer.fail_at = Some(1);
        let job = job("fail");

        let mut scheduler = RenderScheduler::new();
        let err = scheduler
            .run(&mut scene, &cameras(3), &mut renderer, &job)
            .unwrap_err();

        assert!(matches!(err, PipelineError::Render { camera: 1, .. }));
        assert_eq!(scheduler.state(), SchedulerState::Rendering);
        // Only the frame before the failure exists.
        assert!(job.frame_path(0).exists());
        assert!(!job.frame_path(1).exists());
        std::fs::remove_dir_all(job.basename.parent().unwrap()).ok();
    }

    #[test]
    fn test_barrier_fires_once() {
        let mut scene = test_scene();
        let mut barrier = LoadBarrier::new();
        assert!(!barrier.is_drained());

        assert_eq!(barrier.drain(&mut scene).unwrap(), 0);
        assert!(barrier.is_drained());
        assert_eq!(barrier.drain(&mut scene).unwrap(), 0);
    }

    /// Fails the run if it is ever asked to render while texture
    /// loads are still outstanding.
    struct BarrierGuardRenderer;

    impl Renderer for BarrierGuardRenderer {
        fn render(
            &mut self,
            scene: &SceneContainer,
            _camera: &CameraDescriptor,
        ) -> Result<PixelBuffer, RenderError> {
            if !scene.pending_textures().is_empty() {
                return Err(RenderError::Camera(
                    "rendered before loads drained".to_string(),
                ));
            }
            Ok(PixelBuffer::filled(4, 4, [0, 0, 0, 255]))
        }
    }

    #[test]
    fn test_no_render_call_before_barrier_drains() {
        let dir = std::env::temp_dir().join(format!(
            "scene_render_guard_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let texture_path = dir.join("tex.png");
        PixelBuffer::filled(2, 2, [1, 2, 3, 255])
            .save_png(&texture_path, false)
            .unwrap();

        let mut scene = SceneContainer::new(AssetInfo::default());
        let mut material = Material::default();
        material.texture_path = Some(texture_path);
        scene.insert(SceneNode::new(
            "textured",
            NodeKind::Object {
                mesh: Mesh::cube(1.0),
                material,
                identity: NodeIdentity::default(),
            },
        ));
        scene.update_world_transforms();
        scene.compute_bounds();

        let job = RenderJob {
            basename: dir.join("scene"),
            suffix: ".png".to_string(),
            limit: None,
            compress: false,
        };
        RenderScheduler::new()
            .run(&mut scene, &cameras(2), &mut BarrierGuardRenderer, &job)
            .unwrap();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_barrier_loads_pending_textures() {
        let dir = std::env::temp_dir().join(format!(
            "scene_render_barrier_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let texture_path = dir.join("tex.png");
        PixelBuffer::filled(2, 2, [10, 20, 30, 255])
            .save_png(&texture_path, false)
            .unwrap();

        let mut scene = SceneContainer::new(AssetInfo::default());
        let mut material = Material::default();
        material.texture_path = Some(texture_path);
        scene.insert(SceneNode::new(
            "textured",
            NodeKind::Object {
                mesh: Mesh::cube(1.0),
                material,
                identity: NodeIdentity::default(),
            },
        ));

        let mut barrier = LoadBarrier::new();
        assert_eq!(barrier.drain(&mut scene).unwrap(), 1);
        assert!(scene.pending_textures().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }
}
