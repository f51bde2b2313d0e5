//! vn-core: shared error type, configuration, and media constants.
//!
//! This crate is the foundational dependency for the other vn-* crates. It
//! carries no process or filesystem logic of its own beyond reading the
//! configuration file.

pub mod config;
pub mod error;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
