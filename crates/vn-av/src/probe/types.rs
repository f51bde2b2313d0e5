//! Probe result types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Kind of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Other,
}

impl StreamKind {
    pub fn from_codec_type(codec_type: &str) -> Self {
        match codec_type {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitle" => Self::Subtitle,
            "data" => Self::Data,
            _ => Self::Other,
        }
    }
}

/// One stream as reported by the inspection tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbedStream {
    pub index: u32,
    pub kind: StreamKind,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Degrees from the stream's `rotate` tag.
    pub tag_rotation: Option<f64>,
    /// Degrees from display-matrix side data.
    pub side_data_rotation: Option<f64>,
    /// Cover art carried as a single-frame video stream.
    #[serde(default)]
    pub attached_pic: bool,
}

/// Structured description of a probed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbedMetadata {
    pub format_name: Option<String>,
    #[serde(with = "duration_secs_opt")]
    pub duration: Option<Duration>,
    pub streams: Vec<ProbedStream>,
}

impl ProbedMetadata {
    /// The first video stream, ignoring attached pictures (cover art).
    pub fn primary_video(&self) -> Option<&ProbedStream> {
        self.streams
            .iter()
            .find(|s| s.kind == StreamKind::Video && !s.attached_pic)
    }

    pub fn has_audio(&self) -> bool {
        self.streams.iter().any(|s| s.kind == StreamKind::Audio)
    }
}

/// Serde helpers to (de)serialize `Option<Duration>` as fractional seconds.
mod duration_secs_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<f64>::deserialize(deserializer)?;
        Ok(secs
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64))
    }
}
