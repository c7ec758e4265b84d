//! Shared fixture builders for integration tests across the transcript
//! observability core's crates. Not published, not part of the public API.

pub mod builders;
pub mod fixtures;

pub use tempfile::{TempDir, tempdir};
