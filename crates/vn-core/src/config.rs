//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file, failing if it cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref p) = self.tools.encoder_path {
            if !p.exists() {
                warnings.push(format!(
                    "tools.encoder_path {} does not exist; falling back to PATH",
                    p.display()
                ));
            }
        }
        if let Some(ref p) = self.tools.probe_path {
            if !p.exists() {
                warnings.push(format!(
                    "tools.probe_path {} does not exist; falling back to PATH",
                    p.display()
                ));
            }
        }

        if let Some(ref dir) = self.pipeline.temp_dir {
            if !dir.is_dir() {
                warnings.push(format!(
                    "pipeline.temp_dir {} is not a directory",
                    dir.display()
                ));
            }
        }

        if self.pipeline.thumbnail_width == 0 {
            warnings.push("pipeline.thumbnail_width is 0; thumbnails will fail".into());
        }

        for (name, secs) in [
            ("probe_timeout_secs", self.pipeline.probe_timeout_secs),
            ("transcode_timeout_secs", self.pipeline.transcode_timeout_secs),
            ("thumbnail_timeout_secs", self.pipeline.thumbnail_timeout_secs),
        ] {
            if secs == 0 {
                warnings.push(format!(
                    "pipeline.{name} is 0; every invocation of that tool will time out"
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Paths to external CLI tools.
///
/// `encoder_path` is the one tool location a deployment normally sets.
/// The probe tool is resolved next to it unless `probe_path` says otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    #[serde(alias = "ffmpeg_path")]
    pub encoder_path: Option<PathBuf>,
    #[serde(alias = "ffprobe_path")]
    pub probe_path: Option<PathBuf>,
}

/// Scratch location, thumbnail size and per-tool deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scratch directory for workspace files. `None` means the OS temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Thumbnail width in pixels; height follows the aspect ratio.
    pub thumbnail_width: u32,
    pub probe_timeout_secs: u64,
    pub transcode_timeout_secs: u64,
    pub thumbnail_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            thumbnail_width: 640,
            probe_timeout_secs: 60,
            transcode_timeout_secs: 3600,
            thumbnail_timeout_secs: 60,
        }
    }
}

impl PipelineConfig {
    /// The effective scratch directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn transcode_timeout(&self) -> Duration {
        Duration::from_secs(self.transcode_timeout_secs)
    }

    pub fn thumbnail_timeout(&self) -> Duration {
        Duration::from_secs(self.thumbnail_timeout_secs)
    }
}
