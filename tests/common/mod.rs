//! Shared test harness for pipeline integration tests.
//!
//! Provides [`MockProber`] and [`MockEncoder`], content-driven stand-ins for
//! ffprobe/ffmpeg, and [`Harness`], which wires them into a
//! [`VideoPipeline`] rooted in a fresh temporary scratch directory.
//!
//! Input bytes drive the mocks:
//!
//! - `rotate=<deg>[;anything]` probes as a video whose rotate tag is `<deg>`.
//! - `garbage` fails probing.
//! - anything the mock encoder wrote (`mp4:` prefix) probes as a 10s video.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use vn_av::{MediaEncoder, MediaProber, OrientationDirective, ProbedMetadata, ProbedStream, StreamKind};
use vn_core::{Error, Result};
use vn_pipeline::{EventSender, PipelineEvent, PipelineSettings, PipelineStage, VideoPipeline};

pub const TRANSCODED_DURATION: Duration = Duration::from_secs(10);

#[derive(Default)]
pub struct MockProber {
    pub probed: Mutex<Vec<PathBuf>>,
}

fn video(tag_rotation: Option<f64>, duration: Option<Duration>) -> ProbedMetadata {
    ProbedMetadata {
        format_name: Some("mov,mp4,m4a,3gp,3g2,mj2".into()),
        duration,
        streams: vec![ProbedStream {
            index: 0,
            kind: StreamKind::Video,
            codec_name: Some("h264".into()),
            width: Some(1920),
            height: Some(1080),
            tag_rotation,
            side_data_rotation: None,
            attached_pic: false,
        }],
    }
}

#[async_trait]
impl MediaProber for MockProber {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<ProbedMetadata> {
        self.probed.lock().push(path.to_path_buf());

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Probe(format!("cannot read {}: {e}", path.display())))?;
        let text = String::from_utf8_lossy(&bytes);

        if text.starts_with("mp4:") {
            return Ok(video(None, Some(TRANSCODED_DURATION)));
        }

        let head = text.split(';').next().unwrap_or_default();
        match head.strip_prefix("rotate=") {
            Some(deg) => {
                let deg: f64 = deg
                    .parse()
                    .map_err(|_| Error::Probe(format!("bad rotate tag {deg:?}")))?;
                Ok(video(Some(deg), Some(Duration::from_secs(3))))
            }
            None => Err(Error::Probe(
                "Invalid data found when processing input".into(),
            )),
        }
    }
}

#[derive(Default)]
pub struct MockEncoder {
    pub fail_transcode: bool,
    pub fail_frame: bool,
    pub transcodes: Mutex<Vec<(PathBuf, PathBuf, OrientationDirective)>>,
    pub frames: Mutex<Vec<(PathBuf, PathBuf, Duration, u32)>>,
}

#[async_trait]
impl MediaEncoder for MockEncoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        directive: OrientationDirective,
    ) -> Result<()> {
        self.transcodes
            .lock()
            .push((input.to_path_buf(), output.to_path_buf(), directive));

        if self.fail_transcode {
            // A half-written output must still be cleaned up.
            tokio::fs::write(output, b"partial").await?;
            return Err(Error::transcode("moov atom not found"));
        }

        let mut body = b"mp4:".to_vec();
        body.extend(tokio::fs::read(input).await?);
        tokio::fs::write(output, body).await?;
        Ok(())
    }

    async fn extract_frame(
        &self,
        input: &Path,
        output: &Path,
        at: Duration,
        width: u32,
    ) -> Result<()> {
        self.frames
            .lock()
            .push((input.to_path_buf(), output.to_path_buf(), at, width));

        if self.fail_frame {
            return Err(Error::tool("ffmpeg", "Output file is empty, nothing was encoded"));
        }
        tokio::fs::write(output, b"\xff\xd8\xff\xe0jpeg").await?;
        Ok(())
    }
}

/// A pipeline over mocks plus everything it reported.
pub struct Harness {
    pub scratch: TempDir,
    pub prober: Arc<MockProber>,
    pub encoder: Arc<MockEncoder>,
    pub events: Arc<Mutex<Vec<PipelineEvent>>>,
    /// Number of files left in the scratch directory each time a terminal
    /// stage was reported.
    pub leftovers_at_terminal: Arc<Mutex<Vec<usize>>>,
    pub pipeline: VideoPipeline,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_encoder(MockEncoder::default())
    }

    pub fn with_encoder(encoder: MockEncoder) -> Self {
        let scratch = tempfile::tempdir().expect("failed to create scratch dir");
        let prober = Arc::new(MockProber::default());
        let encoder = Arc::new(encoder);
        let events = Arc::new(Mutex::new(Vec::new()));
        let leftovers_at_terminal = Arc::new(Mutex::new(Vec::new()));

        let sink = events.clone();
        let leftovers = leftovers_at_terminal.clone();
        let scratch_path = scratch.path().to_path_buf();
        let sender = EventSender::new(move |event| {
            if let PipelineEvent::Stage(stage) = event {
                if stage.is_terminal() {
                    leftovers.lock().push(count_files(&scratch_path));
                }
            }
            sink.lock().push(event.clone());
        });

        let settings = PipelineSettings {
            scratch_dir: scratch.path().to_path_buf(),
            thumbnail_width: 640,
        };
        let pipeline = VideoPipeline::new(prober.clone(), encoder.clone(), settings)
            .with_events(sender);

        Self {
            scratch,
            prober,
            encoder,
            events,
            leftovers_at_terminal,
            pipeline,
        }
    }

    pub fn stages(&self) -> Vec<PipelineStage> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Stage(s) => Some(*s),
                PipelineEvent::Warning(_) => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Warning(w) => Some(w.clone()),
                PipelineEvent::Stage(_) => None,
            })
            .collect()
    }

    pub fn scratch_files(&self) -> usize {
        count_files(self.scratch.path())
    }
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|rd| rd.count()).unwrap_or(0)
}
