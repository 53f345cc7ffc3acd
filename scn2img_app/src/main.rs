//! scn2img: batch scene-to-image renderer
//!
//! Loads a scene once, renders one PNG per camera pose in the camera
//! file, then a final overview frame showing every camera's frustum.

use std::path::PathBuf;

use clap::Parser;

use scene_render::assets::CatalogResolver;
use scene_render::config::{Config, JobConfig};
use scene_render::render::SoftwareRenderer;
use scene_render::{run_job, RenderSummary};

#[derive(Parser, Debug)]
#[command(name = "scn2img", version, about = "Render scenes to images from camera poses")]
struct Args {
    /// Job configuration file (RON or TOML); flags override its values
    #[arg(long)]
    config: Option<String>,

    /// Scene or model id within the asset source
    #[arg(long)]
    id: Option<String>,

    /// Asset source catalog name
    #[arg(long)]
    source: Option<String>,

    /// Scene level (floor) to render
    #[arg(long)]
    level: Option<u32>,

    /// Explicit file path to the scene or model, bypassing the catalog
    #[arg(long)]
    path: Option<PathBuf>,

    /// File format hint for an explicit path
    #[arg(long)]
    format: Option<String>,

    /// Camera pose file, one camera per line
    #[arg(long)]
    cameras: Option<PathBuf>,

    /// Render at most this many cameras
    #[arg(long)]
    limit: Option<usize>,

    /// Base directory for output files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Output image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Disable ambient occlusion
    #[arg(long)]
    no_ambient_occlusion: bool,

    /// Enable lights (shadows follow)
    #[arg(long)]
    use_lights: bool,

    /// Use best PNG compression
    #[arg(long)]
    compress_png: bool,

    /// Recoloring scheme (`category` or `index`)
    #[arg(long)]
    color_by: Option<String>,

    /// Fallback color name for uncategorized objects
    #[arg(long)]
    color: Option<String>,

    /// Encode semantic indices into pixel values
    #[arg(long)]
    encode_index: bool,

    /// Write the final index table next to the frames
    #[arg(long)]
    write_index: bool,

    /// Previously written category index table to reuse
    #[arg(long)]
    index: Option<PathBuf>,

    /// Previously written object index table to reuse
    #[arg(long)]
    object_index: Option<PathBuf>,

    /// Asset catalog file (RON)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

impl Args {
    /// Fold the flags over the base configuration
    fn apply(&self, mut config: JobConfig) -> JobConfig {
        if let Some(id) = &self.id {
            config.id = id.clone();
        }
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if self.level.is_some() {
            config.level = self.level;
        }
        if self.path.is_some() {
            config.path = self.path.clone();
        }
        if self.format.is_some() {
            config.format = self.format.clone();
        }
        if self.cameras.is_some() {
            config.cameras = self.cameras.clone();
        }
        if self.limit.is_some() {
            config.limit = self.limit;
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.no_ambient_occlusion {
            config.use_ambient_occlusion = false;
        }
        if self.use_lights {
            config.use_lights = true;
        }
        if self.compress_png {
            config.compress_png = true;
        }
        if self.color_by.is_some() {
            config.color_by = self.color_by.clone();
        }
        if let Some(color) = &self.color {
            config.color = color.clone();
        }
        if self.encode_index {
            config.encode_index = true;
        }
        if self.write_index {
            config.write_index = true;
        }
        if self.index.is_some() {
            config.index = self.index.clone();
        }
        if self.object_index.is_some() {
            config.object_index = self.object_index.clone();
        }
        config
    }
}

fn run(args: &Args) -> Result<RenderSummary, Box<dyn std::error::Error>> {
    let base = match &args.config {
        Some(path) => JobConfig::load_from_file(path)?,
        None => JobConfig::default(),
    };
    let config = args.apply(base);

    let mut resolver = match &args.catalog {
        Some(path) => CatalogResolver::from_file(path)?,
        None => CatalogResolver::empty(),
    };
    let mut renderer = SoftwareRenderer::new(config.render_settings());

    Ok(run_job(&config, &mut resolver, &mut renderer)?)
}

fn main() {
    scene_render::foundation::logging::init();

    let args = Args::parse();
    match run(&args) {
        Ok(summary) => {
            log::info!(
                "Done: {} camera frame(s), overview at index {}",
                summary.rendered,
                summary.overview_index
            );
        }
        Err(e) => {
            log::error!("scn2img failed: {e}");
            std::process::exit(1);
        }
    }
}
