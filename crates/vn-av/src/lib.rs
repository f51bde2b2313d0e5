//! # vn-av
//!
//! External tool plumbing for the vidnorm pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- resolve and cache the ffmpeg
//!   and ffprobe executables from configuration or `PATH`.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Scratch files** ([`ScopedWorkspace`]) -- collision-free temp paths for
//!   one invocation, removed on every exit path.
//! - **Orientation** ([`OrientationDirective`], [`resolve_orientation`]) --
//!   rotation metadata to filter directive.
//! - **Probing** ([`MediaProber`], [`FfprobeProber`]) -- structured stream
//!   metadata via ffprobe.
//! - **Encoding** ([`MediaEncoder`], [`FfmpegEncoder`]) -- canonical H.264/AAC
//!   transcode and single-frame extraction via ffmpeg.

pub mod actions;
pub mod command;
pub mod orientation;
pub mod probe;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use actions::{EncoderFeatures, FfmpegEncoder, MediaEncoder};
pub use command::{ToolCommand, ToolOutput};
pub use orientation::{resolve_orientation, OrientationDirective};
pub use probe::{FfprobeProber, MediaProber, ProbedMetadata, ProbedStream, StreamKind};
pub use tools::{ToolInfo, ToolRegistry};
pub use workspace::{ScopedWorkspace, WorkspacePaths};
