//! Configuration types for tasksmith.
//!
//! This crate provides the configuration types used by tasksmith
//! for `.tasksmith/config.yaml` files.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;
