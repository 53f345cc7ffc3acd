//! Configuration system
//!
//! File-backed configuration (RON or TOML) plus the job description
//! consumed by the render pipeline. A [`JobConfig`] carries everything
//! a single invocation needs: which asset to load, which camera file to
//! read, where the frames go, and how to color them.

use std::path::{Path, PathBuf};

pub use serde::{Deserialize, Serialize};

use crate::render::{RenderFlags, RenderSettings};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Description of one batch render invocation
///
/// Field defaults mirror the tool's historical CLI defaults, so a
/// config file only needs to override what differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Scene or model id within the asset source
    pub id: String,

    /// Asset source catalog name
    pub source: String,

    /// Scene level (floor) to render, if the asset has levels
    pub level: Option<u32>,

    /// Explicit file path to the scene or model, bypassing the catalog
    pub path: Option<PathBuf>,

    /// File format hint for an explicit path
    pub format: Option<String>,

    /// Camera file to render from (required)
    pub cameras: Option<PathBuf>,

    /// Limit on the number of cameras to render
    pub limit: Option<usize>,

    /// Base directory for output files
    pub output_dir: PathBuf,

    /// Output image width in pixels
    pub width: u32,

    /// Output image height in pixels
    pub height: u32,

    /// Whether to apply ambient occlusion
    pub use_ambient_occlusion: bool,

    /// Whether to use lights (shadows follow this toggle)
    pub use_lights: bool,

    /// Compress PNG output with the encoder's best setting
    pub compress_png: bool,

    /// Recoloring scheme (`category`, `index`, or none for photometric)
    pub color_by: Option<String>,

    /// Fallback color name for uncategorized objects
    pub color: String,

    /// Encode the semantic index directly into pixel values
    pub encode_index: bool,

    /// Write the final index table next to the rendered frames
    pub write_index: bool,

    /// Previously written index table to reuse for consistent colors
    pub index: Option<PathBuf>,

    /// Previously written per-object index table
    pub object_index: Option<PathBuf>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            id: "0004dd3cb11e50530676f77b55262d38".to_string(),
            source: "p5dScene".to_string(),
            level: None,
            path: None,
            format: None,
            cameras: None,
            limit: None,
            output_dir: PathBuf::from("."),
            width: 640,
            height: 480,
            use_ambient_occlusion: true,
            use_lights: false,
            compress_png: false,
            color_by: None,
            color: "gray".to_string(),
            encode_index: false,
            write_index: false,
            index: None,
            object_index: None,
        }
    }
}

impl Config for JobConfig {}

impl JobConfig {
    /// Fully qualified asset id, `source.id`
    pub fn full_id(&self) -> String {
        format!("{}.{}", self.source, self.id)
    }

    /// Output aspect ratio (width / height)
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Base output path for frames: `{output_dir}/{id}` plus `_{level}`
    /// when a scene level was requested
    pub fn basename(&self) -> PathBuf {
        let stem = match self.level {
            Some(level) => format!("{}_{}", self.id, level),
            None => self.id.clone(),
        };
        self.output_dir.join(stem)
    }

    /// Filename suffix for rendered frames
    ///
    /// `.encoded.png` when index encoding is active, and the coloring
    /// scheme name is prepended when one is set, e.g. `.category.png`.
    pub fn output_suffix(&self) -> String {
        let suffix = if self.encode_index {
            ".encoded.png".to_string()
        } else {
            ".png".to_string()
        };
        match &self.color_by {
            Some(scheme) => format!(".{scheme}{suffix}"),
            None => suffix,
        }
    }

    /// Derive renderer settings from the job
    ///
    /// Index encoding force-disables ambient occlusion, lights, and
    /// shadows: any shading contribution would corrupt the encoded
    /// pixel values. Shadows otherwise follow the lights toggle.
    pub fn render_settings(&self) -> RenderSettings {
        let mut flags = RenderFlags::empty();
        if !self.encode_index {
            if self.use_ambient_occlusion {
                flags |= RenderFlags::AMBIENT_OCCLUSION;
            }
            if self.use_lights {
                flags |= RenderFlags::LIGHTS | RenderFlags::SHADOWS;
            }
        }
        RenderSettings {
            width: self.width,
            height: self.height,
            flags,
            compress: self.compress_png,
        }
    }

    /// Check that the job names a camera file
    pub fn validate(&self) -> Result<&Path, String> {
        self.cameras
            .as_deref()
            .ok_or_else(|| "no camera file supplied".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_without_level() {
        let config = JobConfig {
            id: "abc123".to_string(),
            output_dir: PathBuf::from("out"),
            ..Default::default()
        };
        assert_eq!(config.basename(), PathBuf::from("out/abc123"));
    }

    #[test]
    fn test_basename_with_level() {
        let config = JobConfig {
            id: "abc123".to_string(),
            level: Some(2),
            output_dir: PathBuf::from("out"),
            ..Default::default()
        };
        assert_eq!(config.basename(), PathBuf::from("out/abc123_2"));
    }

    #[test]
    fn test_output_suffix_combinations() {
        let mut config = JobConfig::default();
        assert_eq!(config.output_suffix(), ".png");

        config.encode_index = true;
        assert_eq!(config.output_suffix(), ".encoded.png");

        config.color_by = Some("category".to_string());
        assert_eq!(config.output_suffix(), ".category.encoded.png");

        config.encode_index = false;
        assert_eq!(config.output_suffix(), ".category.png");
    }

    #[test]
    fn test_encode_index_disables_shading() {
        let config = JobConfig {
            encode_index: true,
            use_lights: true,
            use_ambient_occlusion: true,
            ..Default::default()
        };
        assert!(config.render_settings().flags.is_empty());
    }

    #[test]
    fn test_shadows_follow_lights() {
        let config = JobConfig {
            use_lights: true,
            ..Default::default()
        };
        let flags = config.render_settings().flags;
        assert!(flags.contains(RenderFlags::LIGHTS));
        assert!(flags.contains(RenderFlags::SHADOWS));
    }

    #[test]
    fn test_validate_requires_cameras() {
        let config = JobConfig::default();
        assert!(config.validate().is_err());

        let config = JobConfig {
            cameras: Some(PathBuf::from("cams.txt")),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
