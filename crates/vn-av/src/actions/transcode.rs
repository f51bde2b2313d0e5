//! Canonical H.264/AAC fast-start transcode.

use std::path::Path;
use std::time::Duration;

use crate::command::ToolCommand;
use crate::orientation::OrientationDirective;

pub const VIDEO_CODEC: &str = "libx264";
/// Favors encoding speed over maximal compression.
pub const PRESET: &str = "fast";
pub const CRF: u32 = 23;
pub const PIXEL_FORMAT: &str = "yuv420p";
pub const AUDIO_CODEC: &str = "aac";
pub const AUDIO_BITRATE: &str = "128k";

/// Capabilities of the installed ffmpeg that change the argument list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderFeatures {
    /// `-display_rotation` is understood (ffmpeg 6.1 and later).
    ///
    /// From 6.1 on, `-noautorotate` passes the input display matrix through
    /// to the output and `-metadata:s:v:0 rotate=0` no longer clears it, so
    /// the matrix has to be overridden on the input as well.
    pub display_rotation: bool,
}

impl EncoderFeatures {
    /// Derive features from the first line of `ffmpeg -version`.
    ///
    /// Release builds report `ffmpeg version 7.0.2` (or `n7.0.2`), git
    /// snapshots `ffmpeg version N-112345-g...`. Snapshots are assumed to
    /// be recent; anything unparseable gets no optional features.
    pub fn from_version(version_line: &str) -> Self {
        let Some(version) = version_line
            .split_whitespace()
            .skip_while(|w| *w != "version")
            .nth(1)
        else {
            return Self::default();
        };

        if version.starts_with("N-") {
            return Self {
                display_rotation: true,
            };
        }

        let mut parts = version
            .trim_start_matches('n')
            .split(|c: char| !c.is_ascii_digit())
            .map(|p| p.parse::<u32>().ok());
        let (Some(Some(major)), minor) = (parts.next(), parts.next()) else {
            return Self::default();
        };
        let minor = minor.flatten().unwrap_or(0);

        Self {
            display_rotation: (major, minor) >= (6, 1),
        }
    }
}

/// Build the ffmpeg argument list for the canonical transcode.
///
/// When `directive` carries a rotation, ffmpeg's own autorotation is
/// disabled (`-noautorotate`, before `-i`), the transpose filter is applied
/// and the output rotation tag is cleared. Without the first step ffmpeg
/// would honor the display matrix itself and the filter would rotate the
/// frames a second time; without the last a player that reads the tag would.
/// On encoders with [`EncoderFeatures::display_rotation`] the input display
/// matrix is also reset with `-display_rotation:v:0 0`.
pub fn transcode_args(
    input: &Path,
    output: &Path,
    directive: OrientationDirective,
    features: EncoderFeatures,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-hide_banner".into(), "-v".into(), "error".into()];

    let filter = directive.filter();
    if filter.is_some() {
        args.push("-noautorotate".into());
        if features.display_rotation {
            args.extend(["-display_rotation:v:0", "0"].map(String::from));
        }
    }

    args.push("-i".into());
    args.push(input.to_string_lossy().into_owned());

    let crf = CRF.to_string();
    args.extend(
        [
            "-c:v", VIDEO_CODEC,
            "-preset", PRESET,
            "-crf", crf.as_str(),
            "-pix_fmt", PIXEL_FORMAT,
            "-movflags", "+faststart",
        ]
        .map(String::from),
    );

    if let Some(vf) = filter {
        args.extend(["-vf", vf, "-metadata:s:v:0", "rotate=0"].map(String::from));
    }

    args.extend(["-c:a", AUDIO_CODEC, "-b:a", AUDIO_BITRATE, "-f", "mp4"].map(String::from));
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Transcode `input` to `output` and wait for ffmpeg to finish.
///
/// Any tool failure (spawn, timeout, non-zero exit) is reported as
/// [`vn_core::Error::Transcode`] carrying ffmpeg's diagnostic text. A run
/// that exits cleanly but leaves no output file is treated the same way.
pub async fn transcode(
    ffmpeg: &Path,
    input: &Path,
    output: &Path,
    directive: OrientationDirective,
    features: EncoderFeatures,
    timeout: Duration,
) -> vn_core::Result<()> {
    tracing::info!(
        "transcode: {:?} -> {:?} (codec={VIDEO_CODEC}, preset={PRESET}, crf={CRF}, orientation={directive})",
        input,
        output,
    );

    let mut cmd = ToolCommand::new(ffmpeg.to_path_buf());
    cmd.timeout(timeout);
    cmd.args(transcode_args(input, output, directive, features));

    cmd.execute()
        .await
        .map_err(|e| vn_core::Error::transcode(e.into_message()))?;

    match tokio::fs::metadata(output).await {
        Ok(m) if m.len() > 0 => Ok(()),
        Ok(_) => Err(vn_core::Error::transcode("encoder produced an empty file")),
        Err(e) => Err(vn_core::Error::transcode(format!(
            "encoder produced no output file: {e}"
        ))),
    }
}
