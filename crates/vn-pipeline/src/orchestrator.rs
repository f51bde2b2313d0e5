//! The video pipeline: one upload in, one canonical artifact out.
//!
//! ```text
//! Received → Probing → OrientationResolved → Transcoding → ThumbnailPhase → Succeeded
//!               └──────────────┬──────────────────┘
//!                              └→ Failed
//! ```
//!
//! Every invocation owns a [`ScopedWorkspace`]; it is released before the
//! terminal stage is reported, whatever the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::Instrument;
use vn_av::{
    resolve_orientation, FfmpegEncoder, FfprobeProber, MediaEncoder, MediaProber,
    ScopedWorkspace, ToolRegistry,
};
use vn_core::config::{Config, PipelineConfig};
use vn_core::{canonical_video_filename, Error, Result};

use crate::artifact::{ProcessedVideoArtifact, RawMediaInput, ThumbnailImage};
use crate::events::{EventSender, PipelineStage};
use crate::thumbnail::ThumbnailExtractor;

/// Per-deployment knobs of the pipeline. The encoding parameters themselves
/// are fixed.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Directory the per-invocation scratch files are created in.
    pub scratch_dir: PathBuf,
    /// Thumbnail width in pixels.
    pub thumbnail_width: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            scratch_dir: config.scratch_dir(),
            thumbnail_width: config.thumbnail_width,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Runs uploads through probe, orientation, transcode and thumbnail.
///
/// A pipeline holds no per-invocation state; one instance can serve any
/// number of concurrent [`VideoPipeline::process`] calls.
pub struct VideoPipeline {
    prober: Arc<dyn MediaProber>,
    encoder: Arc<dyn MediaEncoder>,
    thumbnails: ThumbnailExtractor,
    settings: PipelineSettings,
    events: Arc<EventSender>,
}

impl VideoPipeline {
    /// Create a pipeline from explicit collaborators.
    pub fn new(
        prober: Arc<dyn MediaProber>,
        encoder: Arc<dyn MediaEncoder>,
        settings: PipelineSettings,
    ) -> Self {
        let thumbnails =
            ThumbnailExtractor::new(prober.clone(), encoder.clone(), settings.thumbnail_width);
        Self {
            prober,
            encoder,
            thumbnails,
            settings,
            events: Arc::new(EventSender::noop()),
        }
    }

    /// Create a pipeline backed by ffprobe/ffmpeg as located by `config`.
    ///
    /// Fails with [`Error::Tool`] when either executable cannot be found, so
    /// a misconfigured deployment is caught at startup rather than on the
    /// first upload.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tools = ToolRegistry::discover(&config.tools);
        let prober =
            FfprobeProber::from_registry(&tools)?.with_timeout(config.pipeline.probe_timeout());
        let encoder = FfmpegEncoder::from_registry(&tools)?.with_timeouts(
            config.pipeline.transcode_timeout(),
            config.pipeline.thumbnail_timeout(),
        );

        Ok(Self::new(
            Arc::new(prober),
            Arc::new(encoder),
            PipelineSettings::from_config(&config.pipeline),
        ))
    }

    /// Builder: attach an event sender.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Arc::new(events);
        self
    }

    /// Normalize one uploaded video.
    ///
    /// # Errors
    ///
    /// - [`Error::Probe`] if the input cannot be inspected; nothing is
    ///   transcoded.
    /// - [`Error::Transcode`] if encoding fails; no thumbnail is attempted.
    /// - [`Error::Workspace`] / [`Error::Io`] if the scratch area is unusable.
    ///
    /// Thumbnail failures are not errors: the artifact is returned without
    /// one.
    pub async fn process(
        &self,
        bytes: Vec<u8>,
        original_filename: &str,
    ) -> Result<ProcessedVideoArtifact> {
        self.process_input(RawMediaInput::new(bytes, original_filename))
            .await
    }

    /// [`VideoPipeline::process`] taking a [`RawMediaInput`].
    pub async fn process_input(&self, input: RawMediaInput) -> Result<ProcessedVideoArtifact> {
        self.events.stage(PipelineStage::Received);

        let workspace =
            match ScopedWorkspace::acquire(&self.settings.scratch_dir, &input.original_filename) {
                Ok(ws) => ws,
                Err(e) => {
                    tracing::error!("video pipeline failed before start: {e}");
                    self.events.stage(PipelineStage::Failed);
                    return Err(e);
                }
            };

        let span = tracing::info_span!(
            "video_pipeline",
            id = %workspace.discriminator(),
            file = %input.original_filename,
        );

        let result = self.run(&workspace, input).instrument(span.clone()).await;

        workspace.release();

        let _enter = span.enter();
        match &result {
            Ok(artifact) => {
                tracing::info!(
                    "video pipeline succeeded: {} ({} bytes, thumbnail: {})",
                    artifact.video_filename,
                    artifact.video_bytes.len(),
                    artifact.thumbnail.is_some()
                );
                self.events.stage(PipelineStage::Succeeded);
            }
            Err(e) => {
                tracing::error!("video pipeline failed: {e}");
                self.events.stage(PipelineStage::Failed);
            }
        }

        result
    }

    async fn run(
        &self,
        workspace: &ScopedWorkspace,
        input: RawMediaInput,
    ) -> Result<ProcessedVideoArtifact> {
        let RawMediaInput {
            bytes,
            original_filename,
        } = input;

        tracing::info!("received {} bytes", bytes.len());
        write_input(workspace.input(), &bytes).await?;
        drop(bytes);

        self.events.stage(PipelineStage::Probing);
        let metadata = self
            .prober
            .probe(workspace.input())
            .await
            .map_err(into_probe_error)?;

        let directive = resolve_orientation(&metadata);
        self.events.stage(PipelineStage::OrientationResolved);
        tracing::info!(
            "probed {} via {}: orientation {directive}",
            metadata.format_name.as_deref().unwrap_or("unknown format"),
            self.prober.name(),
        );

        self.events.stage(PipelineStage::Transcoding);
        self.encoder
            .transcode(workspace.input(), workspace.output(), directive)
            .await
            .map_err(into_transcode_error)?;

        let video_bytes = tokio::fs::read(workspace.output())
            .await
            .map_err(|e| Error::transcode(format!("transcoded output unreadable: {e}")))?;
        if video_bytes.is_empty() {
            return Err(Error::transcode("transcoded output is empty"));
        }

        self.events.stage(PipelineStage::ThumbnailPhase);
        let thumbnail = self.collect_thumbnail(workspace).await;

        Ok(
            ProcessedVideoArtifact::new(video_bytes, canonical_video_filename(&original_filename))
                .with_thumbnail(thumbnail),
        )
    }

    async fn collect_thumbnail(&self, workspace: &ScopedWorkspace) -> Option<ThumbnailImage> {
        if !self
            .thumbnails
            .extract(workspace.output(), workspace.thumbnail(), &self.events)
            .await
        {
            return None;
        }

        match tokio::fs::read(workspace.thumbnail()).await {
            Ok(bytes) if !bytes.is_empty() => {
                let filename = workspace
                    .thumbnail()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("thumb-{}.jpg", workspace.discriminator()));
                Some(ThumbnailImage { bytes, filename })
            }
            Ok(_) => {
                let message = "thumbnail file is empty".to_string();
                tracing::warn!("{message}");
                self.events.warning(message);
                None
            }
            Err(e) => {
                let message = format!("failed to read thumbnail: {e}");
                tracing::warn!("{message}");
                self.events.warning(message);
                None
            }
        }
    }
}

impl std::fmt::Debug for VideoPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPipeline")
            .field("prober", &self.prober.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Write the upload into scratch space without blocking the runtime.
///
/// The file is created before the first await, so cleanup of an abandoned
/// invocation always finds it. A write still in flight then lands in the
/// unlinked inode and can never recreate the path.
async fn write_input(path: &Path, bytes: &[u8]) -> Result<()> {
    let workspace_error =
        |e: std::io::Error| Error::Workspace(format!("failed to write {}: {e}", path.display()));

    let file = std::fs::File::create(path).map_err(workspace_error)?;
    let mut file = tokio::fs::File::from_std(file);
    file.write_all(bytes).await.map_err(workspace_error)?;
    file.flush().await.map_err(workspace_error)?;
    Ok(())
}

/// Any failure while probing is a probe failure.
fn into_probe_error(e: Error) -> Error {
    match e {
        e @ Error::Probe(_) => e,
        other => Error::Probe(other.into_message()),
    }
}

/// Any failure while transcoding is a transcode failure.
fn into_transcode_error(e: Error) -> Error {
    match e {
        e @ Error::Transcode { .. } => e,
        other => Error::transcode(other.into_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_reclassified() {
        assert!(matches!(
            into_probe_error(Error::tool("ffprobe", "timed out after 60s")),
            Error::Probe(ref m) if m == "ffprobe: timed out after 60s"
        ));
        assert!(matches!(
            into_transcode_error(Error::tool("ffmpeg", "exited with status 1: boom")),
            Error::Transcode { ref message } if message.contains("boom")
        ));
        assert!(matches!(
            into_probe_error(Error::Probe("kept".into())),
            Error::Probe(ref m) if m == "kept"
        ));
    }

    #[test]
    fn from_config_fails_without_tools() {
        let mut config = Config::default();
        config.tools.encoder_path = Some(PathBuf::from("/definitely/not/here/ffmpeg"));
        config.tools.probe_path = Some(PathBuf::from("/definitely/not/here/ffprobe"));
        // Falls back to PATH; only assert on the error shape when nothing is found.
        if let Err(e) = VideoPipeline::from_config(&config) {
            assert!(matches!(e, Error::Tool { .. }), "{e}");
        }
    }

    #[tokio::test]
    async fn write_input_reports_workspace_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_input(&dir.path().join("gone/input.mov"), b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Workspace(ref m) if m.contains("failed to write")), "{err}");
    }

    #[tokio::test]
    async fn write_input_writes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.mov");
        let bytes = vec![7u8; 3 * 1024 * 1024];
        write_input(&path, &bytes).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn settings_follow_config() {
        let mut cfg = PipelineConfig::default();
        cfg.temp_dir = Some(PathBuf::from("/scratch"));
        cfg.thumbnail_width = 320;
        let s = PipelineSettings::from_config(&cfg);
        assert_eq!(s.scratch_dir, PathBuf::from("/scratch"));
        assert_eq!(s.thumbnail_width, 320);
    }
}
