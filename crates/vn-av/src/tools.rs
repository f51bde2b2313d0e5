//! External tool detection and management.
//!
//! The [`ToolRegistry`] resolves the locations of the two external CLI tools
//! the pipeline drives (ffmpeg and ffprobe) once, at startup, from
//! [`vn_core::config::ToolsConfig`]. Components receive the registry
//! explicitly instead of consulting global state, which keeps them testable
//! with stand-in executables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &[FFMPEG, FFPROBE];

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `-version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding resolved tool paths.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, PathBuf>,
}

impl ToolRegistry {
    /// Resolve tools from configuration, falling back to `PATH`.
    ///
    /// - ffmpeg: `encoder_path` if it exists, else `which ffmpeg`.
    /// - ffprobe: `probe_path` if it exists, else an `ffprobe` sitting next
    ///   to the configured encoder, else `which ffprobe`.
    ///
    /// Tools that are not found are omitted; [`ToolRegistry::require`]
    /// reports them when they are first needed.
    pub fn discover(tools_config: &vn_core::config::ToolsConfig) -> Self {
        let mut tools = HashMap::new();

        let encoder = existing(tools_config.encoder_path.as_deref())
            .or_else(|| which::which(FFMPEG).ok());

        let prober = existing(tools_config.probe_path.as_deref())
            .or_else(|| {
                tools_config
                    .encoder_path
                    .as_deref()
                    .and_then(sibling_probe)
            })
            .or_else(|| which::which(FFPROBE).ok());

        if let Some(path) = encoder {
            tools.insert(FFMPEG.to_string(), path);
        }
        if let Some(path) = prober {
            tools.insert(FFPROBE.to_string(), path);
        }

        Self { tools }
    }

    /// Return the path for the given tool, or an [`vn_core::Error::Tool`] if
    /// the tool was not found during discovery.
    pub fn require(&self, name: &str) -> vn_core::Result<&Path> {
        self.tools
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                vn_core::Error::tool(name, format!("{name} not found; is it installed and in PATH?"))
            })
    }

    /// First line of `<tool> -version`, if the tool was found and runs.
    pub fn version(&self, name: &str) -> Option<String> {
        self.tools.get(name).and_then(|path| detect_version(path))
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(path) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(path),
                    path: Some(path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

fn existing(path: Option<&Path>) -> Option<PathBuf> {
    path.filter(|p| p.exists()).map(Path::to_path_buf)
}

/// `ffprobe` in the same directory as the configured encoder.
fn sibling_probe(encoder: &Path) -> Option<PathBuf> {
    let dir = encoder.parent()?;
    let name = if cfg!(windows) { "ffprobe.exe" } else { FFPROBE };
    let candidate = dir.join(name);
    candidate.exists().then_some(candidate)
}

/// Run `<tool> -version` and return the first line of stdout.
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path)
        .arg("-version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}
