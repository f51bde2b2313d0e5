//! Per-invocation scratch files.
//!
//! A [`ScopedWorkspace`] owns three paths (input, output, thumbnail) inside
//! a shared scratch directory. Paths are keyed by a discriminator that
//! combines a nanosecond timestamp, a process-wide sequence number and a
//! random UUID component, so concurrent invocations never collide.
//!
//! Every path is removed when the workspace is released. [`ScopedWorkspace::release`]
//! is the normal exit; `Drop` performs the same cleanup when a workspace is
//! abandoned (early return, panic, or a caller dropping the pipeline future).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use vn_core::{base_name, canonical_video_filename, THUMBNAIL_EXTENSION};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Longest stem and extension (in bytes) kept from the client's filename.
/// Together with the prefix and discriminator this stays well below the
/// usual 255-byte component limit.
const MAX_STEM_LEN: usize = 64;
const MAX_EXTENSION_LEN: usize = 16;

/// The three scratch paths of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspacePaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub thumbnail: PathBuf,
}

impl WorkspacePaths {
    /// The paths as an array, in creation order.
    pub fn all(&self) -> [&Path; 3] {
        [
            self.input.as_path(),
            self.output.as_path(),
            self.thumbnail.as_path(),
        ]
    }
}

/// Scratch paths for exactly one pipeline invocation.
///
/// # Example
///
/// ```no_run
/// use vn_av::ScopedWorkspace;
///
/// let ws = ScopedWorkspace::acquire(&std::env::temp_dir(), "clip.mov").unwrap();
/// std::fs::write(ws.input(), b"...").unwrap();
/// // ... probe / transcode into ws.output() ...
/// ws.release();
/// ```
#[derive(Debug)]
pub struct ScopedWorkspace {
    discriminator: String,
    paths: WorkspacePaths,
    released: bool,
}

impl ScopedWorkspace {
    /// Allocate fresh, collision-free paths under `root`.
    ///
    /// Nothing is created on disk; `root` must already exist.
    pub fn acquire(root: &Path, original_filename: &str) -> vn_core::Result<Self> {
        if !root.is_dir() {
            return Err(vn_core::Error::Workspace(format!(
                "scratch directory {} does not exist",
                root.display()
            )));
        }

        let discriminator = new_discriminator();
        let paths = layout(root, &discriminator, original_filename);

        tracing::debug!(
            "workspace {discriminator}: input={} output={} thumbnail={}",
            paths.input.display(),
            paths.output.display(),
            paths.thumbnail.display()
        );

        Ok(Self {
            discriminator,
            paths,
            released: false,
        })
    }

    /// The unique key of this workspace.
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// Path the raw upload is written to.
    pub fn input(&self) -> &Path {
        &self.paths.input
    }

    /// Path the transcoder writes the canonical video to.
    pub fn output(&self) -> &Path {
        &self.paths.output
    }

    /// Path the thumbnail frame is written to.
    pub fn thumbnail(&self) -> &Path {
        &self.paths.thumbnail
    }

    /// All three paths.
    pub fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }

    /// Delete every path of this workspace.
    ///
    /// Individual deletion failures are logged and do not stop the remaining
    /// deletions. A path that was never created is not an error.
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for path in self.paths.all() {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::trace!("removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    "workspace {}: failed to remove {}: {e}",
                    self.discriminator,
                    path.display()
                ),
            }
        }
    }
}

impl Drop for ScopedWorkspace {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!("workspace {} dropped without release", self.discriminator);
            self.cleanup();
        }
    }
}

/// `<nanos>-<seq>-<uuid8>`: timestamp, process-local sequence, and a random
/// component for uniqueness across processes sharing the scratch dir.
fn new_discriminator() -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{nanos}-{seq}-{}", &random[..8])
}

fn layout(root: &Path, discriminator: &str, original_filename: &str) -> WorkspacePaths {
    let name = truncate(&sanitize(base_name(original_filename)));
    let name = if name.is_empty() { "upload".to_string() } else { name };
    let output_name = canonical_video_filename(&name);

    WorkspacePaths {
        input: root.join(format!("input-{discriminator}-{name}")),
        output: root.join(format!("output-{discriminator}-{output_name}")),
        thumbnail: root.join(format!("thumb-{discriminator}.{THUMBNAIL_EXTENSION}")),
    }
}

/// Keep filenames shell- and filesystem-friendly; ffmpeg also treats a
/// leading `-` or a `:` prefix specially.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Cap the stem and extension of an already sanitized (ASCII) name.
fn truncate(name: &str) -> String {
    let (stem, extension) = match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    };
    let stem = &stem[..stem.len().min(MAX_STEM_LEN)];
    let extension = &extension[..extension.len().min(MAX_EXTENSION_LEN)];
    format!("{stem}{extension}")
}
