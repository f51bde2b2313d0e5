//! Encoding actions driven through ffmpeg: the canonical transcode and
//! single-frame extraction.

mod frame;
mod transcode;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

pub use frame::{extract_frame, frame_args};
pub use transcode::{
    transcode, transcode_args, EncoderFeatures, AUDIO_BITRATE, AUDIO_CODEC, CRF, PIXEL_FORMAT,
    PRESET, VIDEO_CODEC,
};

use crate::orientation::OrientationDirective;
use crate::tools::{ToolRegistry, FFMPEG};

/// Encoder operations the pipeline depends on.
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Transcode `input` into the canonical streaming format at `output`,
    /// applying `directive`. Failures are [`vn_core::Error::Transcode`].
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        directive: OrientationDirective,
    ) -> vn_core::Result<()>;

    /// Write one frame of `input`, taken at `at`, scaled to `width` pixels
    /// wide, as a JPEG at `output`.
    async fn extract_frame(
        &self,
        input: &Path,
        output: &Path,
        at: Duration,
        width: u32,
    ) -> vn_core::Result<()>;
}

/// [`MediaEncoder`] backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
    features: EncoderFeatures,
    transcode_timeout: Duration,
    frame_timeout: Duration,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            features: EncoderFeatures::default(),
            transcode_timeout: Duration::from_secs(3600),
            frame_timeout: Duration::from_secs(60),
        }
    }

    /// Locate ffmpeg in `tools` and detect its features from `-version`.
    pub fn from_registry(tools: &ToolRegistry) -> vn_core::Result<Self> {
        let encoder = Self::new(tools.require(FFMPEG)?.to_path_buf());
        let features = tools
            .version(FFMPEG)
            .map(|line| EncoderFeatures::from_version(&line))
            .unwrap_or_default();
        tracing::debug!("ffmpeg features: {features:?}");
        Ok(encoder.with_features(features))
    }

    pub fn with_features(mut self, features: EncoderFeatures) -> Self {
        self.features = features;
        self
    }

    /// Builder: per-invocation deadlines for transcoding and frame grabs.
    pub fn with_timeouts(mut self, transcode: Duration, frame: Duration) -> Self {
        self.transcode_timeout = transcode;
        self.frame_timeout = frame;
        self
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        directive: OrientationDirective,
    ) -> vn_core::Result<()> {
        transcode(
            &self.ffmpeg_path,
            input,
            output,
            directive,
            self.features,
            self.transcode_timeout,
        )
        .await
    }

    async fn extract_frame(
        &self,
        input: &Path,
        output: &Path,
        at: Duration,
        width: u32,
    ) -> vn_core::Result<()> {
        extract_frame(&self.ffmpeg_path, input, output, at, width, self.frame_timeout).await
    }
}
