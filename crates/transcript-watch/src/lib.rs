//! Non-blocking, multi-session tailing of AI coding agent transcript files.
//!
//! Three layers, each building on the one before:
//! - [`TranscriptWatcher`] tails one file (or one directory's UUID-named
//!   children, in discovery mode) and normalizes each line through an
//!   adapter from `transcript-adapters`.
//! - [`DirectoryWatcher`] watches a directory of session files directly,
//!   spawning one child `TranscriptWatcher` per file and fanning their
//!   output into a single merged channel pair.
//! - [`SessionRegistry`] tracks many such watches at once, keyed by an
//!   opaque task id, so a host process doesn't need its own bookkeeping.
//!
//! Every watcher is non-blocking by construction: a slow or absent consumer
//! causes dropped events (reported on the error channel), never a stall of
//! the underlying poll loop.

mod active_file;
mod cancel;
mod channels;
mod config;
mod directory;
mod discovery;
mod error;
mod registry;
mod stats;
mod watcher;

pub use channels::{Channels, ParsedChannels, RawChannels};
pub use config::{DirectoryWatcherConfig, TranscriptWatcherConfig};
pub use directory::{DirectoryChannels, DirectoryWatcher};
pub use error::{Error, Result};
pub use registry::{SessionRegistry, WatchChannels, WatchSpec};
pub use stats::WatcherStats;
pub use watcher::TranscriptWatcher;
