//! FFprobe-based [`MediaProber`] implementation.
//!
//! Shells out to `ffprobe -v error -print_format json -show_format -show_streams`
//! and maps the JSON output into [`ProbedMetadata`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::types::{ProbedMetadata, ProbedStream, StreamKind};
use super::MediaProber;
use crate::command::ToolCommand;
use crate::tools::{ToolRegistry, FFPROBE};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    /// Path to the ffprobe binary.
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self {
            ffprobe_path,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a prober from a resolved registry.
    pub fn from_registry(tools: &ToolRegistry) -> vn_core::Result<Self> {
        Ok(Self::new(tools.require(FFPROBE)?.to_path_buf()))
    }

    /// Builder: bound each ffprobe run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> vn_core::Result<ProbedMetadata> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.timeout(self.timeout);
        cmd.args([
            "-v", "error",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ]);
        cmd.path_arg(path);

        let output = cmd
            .execute()
            .await
            .map_err(|e| vn_core::Error::Probe(e.into_message()))?;

        parse_ffprobe_json(&output.stdout)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: Option<u32>,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
    #[serde(default)]
    tags: FfprobeTags,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    /// ffprobe prints tag values as strings (`"90"`), but hand-edited or
    /// older outputs sometimes carry a number.
    rotate: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<Value>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse ffprobe's JSON document.
///
/// A document without a video stream is rejected: the pipeline has nothing
/// to normalize in that case.
pub(crate) fn parse_ffprobe_json(json: &str) -> vn_core::Result<ProbedMetadata> {
    let ff: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| vn_core::Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

    let format_duration = ff
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_seconds);

    let mut streams = Vec::with_capacity(ff.streams.len());
    let mut stream_duration = None;

    for (pos, stream) in ff.streams.into_iter().enumerate() {
        let kind = StreamKind::from_codec_type(stream.codec_type.as_deref().unwrap_or(""));
        if kind == StreamKind::Video && stream_duration.is_none() {
            stream_duration = stream.duration.as_deref().and_then(parse_seconds);
        }

        let side_data_rotation = stream
            .side_data_list
            .iter()
            .find_map(|sd| sd.rotation.as_ref().and_then(numeric));

        streams.push(ProbedStream {
            index: stream.index.unwrap_or(pos as u32),
            kind,
            codec_name: stream.codec_name,
            width: stream.width,
            height: stream.height,
            tag_rotation: stream.tags.rotate.as_ref().and_then(numeric),
            side_data_rotation,
            attached_pic: stream.disposition.attached_pic == 1,
        });
    }

    let metadata = ProbedMetadata {
        format_name: ff.format.and_then(|f| f.format_name),
        duration: format_duration.or(stream_duration),
        streams,
    };

    if metadata.primary_video().is_none() {
        return Err(vn_core::Error::Probe("no video stream found".into()));
    }

    Ok(metadata)
}

/// A JSON number, or a string holding one.
fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_seconds(s: &str) -> Option<Duration> {
    let secs: f64 = s.trim().parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}
