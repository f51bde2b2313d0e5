//! Best-effort preview frame from the transcoded video.

use std::path::Path;
use std::sync::Arc;

use vn_av::{MediaEncoder, MediaProber};

use crate::events::EventSender;

/// Extracts one still at the temporal midpoint of an already transcoded
/// file.
///
/// Thumbnails degrade the result when they fail; they never fail the
/// pipeline. [`ThumbnailExtractor::extract`] therefore reports a plain
/// success flag.
#[derive(Clone)]
pub struct ThumbnailExtractor {
    prober: Arc<dyn MediaProber>,
    encoder: Arc<dyn MediaEncoder>,
    width: u32,
}

impl ThumbnailExtractor {
    pub fn new(prober: Arc<dyn MediaProber>, encoder: Arc<dyn MediaEncoder>, width: u32) -> Self {
        Self {
            prober,
            encoder,
            width,
        }
    }

    /// Write a thumbnail of `transcoded` to `thumbnail`.
    ///
    /// Returns `false` (after logging a warning and emitting a
    /// [`PipelineEvent::Warning`](crate::PipelineEvent::Warning)) on any
    /// failure.
    pub async fn extract(&self, transcoded: &Path, thumbnail: &Path, events: &EventSender) -> bool {
        match self.try_extract(transcoded, thumbnail).await {
            Ok(()) => true,
            Err(e) => {
                let message = format!("thumbnail extraction failed: {e}");
                tracing::warn!("{message}");
                events.warning(message);
                false
            }
        }
    }

    async fn try_extract(&self, transcoded: &Path, thumbnail: &Path) -> vn_core::Result<()> {
        if self.width == 0 {
            return Err(vn_core::Error::Validation("thumbnail width is 0".into()));
        }

        let meta = self.prober.probe(transcoded).await?;
        let duration = meta
            .duration
            .filter(|d| !d.is_zero())
            .ok_or_else(|| vn_core::Error::Probe("transcoded file has zero duration".into()))?;

        let midpoint = duration / 2;
        self.encoder
            .extract_frame(transcoded, thumbnail, midpoint, self.width)
            .await
    }
}

impl std::fmt::Debug for ThumbnailExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailExtractor")
            .field("prober", &self.prober.name())
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}
