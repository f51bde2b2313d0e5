//! Media metadata probing.

mod ffprobe;
pub mod types;

use std::path::Path;

use async_trait::async_trait;

pub use ffprobe::FfprobeProber;
pub use types::{ProbedMetadata, ProbedStream, StreamKind};

/// Extracts stream and format metadata from a media file.
///
/// Implementations report every failure (tool missing, non-zero exit,
/// unparseable output, no video stream) as [`vn_core::Error::Probe`].
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe the file at `path`.
    async fn probe(&self, path: &Path) -> vn_core::Result<ProbedMetadata>;
}
