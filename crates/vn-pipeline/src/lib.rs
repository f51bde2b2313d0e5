//! # vn-pipeline
//!
//! Orchestration of the video normalization pipeline.
//!
//! This crate provides:
//!
//! - **[`VideoPipeline`]** -- runs one upload through probe → orientation →
//!   transcode → thumbnail, releasing its scratch files on every exit path.
//! - **[`ThumbnailExtractor`]** -- best-effort midpoint preview frame.
//! - **[`RawMediaInput`] / [`ProcessedVideoArtifact`]** -- the pipeline's
//!   input and its sole success value.
//! - **[`PipelineStage`] / [`PipelineEvent`] / [`EventSender`]** -- stage
//!   transitions and non-fatal warnings reported to the caller.

pub mod artifact;
pub mod events;
pub mod orchestrator;
pub mod thumbnail;

// Re-export key types at the crate root.
pub use artifact::{ProcessedVideoArtifact, RawMediaInput, ThumbnailImage};
pub use events::{EventSender, PipelineEvent, PipelineStage};
pub use orchestrator::{PipelineSettings, VideoPipeline};
pub use thumbnail::ThumbnailExtractor;
