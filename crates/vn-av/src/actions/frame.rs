//! Single-frame JPEG extraction.

use std::path::Path;
use std::time::Duration;

use crate::command::ToolCommand;

/// Build the ffmpeg arguments to grab one frame at `at`, scaled to `width`
/// with proportional height.
///
/// `-ss` is placed before `-i` so ffmpeg seeks in the demuxer instead of
/// decoding everything up to the timestamp.
pub fn frame_args(input: &Path, output: &Path, at: Duration, width: u32) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-hide_banner".into(), "-v".into(), "error".into()];
    args.extend(["-ss".to_string(), format!("{:.3}", at.as_secs_f64())]);
    args.push("-i".into());
    args.push(input.to_string_lossy().into_owned());
    args.extend(["-frames:v", "1", "-an"].map(String::from));
    args.extend(["-vf".to_string(), format!("scale={width}:-1")]);
    args.extend(["-q:v", "2", "-f", "image2"].map(String::from));
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Extract a single frame from `input` into `output`.
///
/// Fails with [`vn_core::Error::Tool`] when ffmpeg fails or when it exits
/// cleanly without writing an image (seeking past the last frame does
/// exactly that).
pub async fn extract_frame(
    ffmpeg: &Path,
    input: &Path,
    output: &Path,
    at: Duration,
    width: u32,
    timeout: Duration,
) -> vn_core::Result<()> {
    tracing::debug!("frame grab: {:?} @ {:?} -> {:?} (width={width})", input, at, output);

    let mut cmd = ToolCommand::new(ffmpeg.to_path_buf());
    cmd.timeout(timeout);
    cmd.args(frame_args(input, output, at, width));
    cmd.execute().await?;

    match tokio::fs::metadata(output).await {
        Ok(m) if m.len() > 0 => Ok(()),
        _ => Err(vn_core::Error::tool("ffmpeg", "no frame was written")),
    }
}
