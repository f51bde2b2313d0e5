//! Persist a [`ProcessedVideoArtifact`] into a local directory.
//!
//! Never overwrites: if a file with the artifact's name already exists
//! (typically the source clip when it was already named `*.mp4`), a
//! numbered variant is chosen instead.

use std::path::{Path, PathBuf};

use serde::Serialize;
use vn_core::Result;
use vn_pipeline::ProcessedVideoArtifact;

/// Where the assets of one artifact were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedAssets {
    pub video: PathBuf,
    pub video_bytes: usize,
    pub thumbnail: Option<PathBuf>,
}

/// Write the artifact's video (and thumbnail, if any) into `out_dir`,
/// creating the directory if needed.
pub fn write_artifact(artifact: &ProcessedVideoArtifact, out_dir: &Path) -> Result<ExportedAssets> {
    std::fs::create_dir_all(out_dir)?;

    let video = free_path(out_dir, &artifact.video_filename);
    std::fs::write(&video, &artifact.video_bytes)?;
    tracing::info!("wrote {} ({} bytes)", video.display(), artifact.video_bytes.len());

    let thumbnail = match &artifact.thumbnail {
        Some(thumb) => {
            let path = free_path(out_dir, &thumb.filename);
            std::fs::write(&path, &thumb.bytes)?;
            tracing::info!("wrote {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok(ExportedAssets {
        video,
        video_bytes: artifact.video_bytes.len(),
        thumbnail,
    })
}

/// `dir/name` if it does not exist yet, else `dir/stem-N.ext` for the
/// first free N.
fn free_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    (1u32..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem}-{n}.{ext}")),
            None => dir.join(format!("{stem}-{n}")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
