//! vidnorm - video upload normalization
//!
//! The pipeline itself lives in the `vn-*` crates; this library crate holds
//! what the binary adds on top and exposes it for integration testing.

pub mod export;
