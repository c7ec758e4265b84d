use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a single Transcript Watcher.
///
/// `path` is either a single transcript file, or, when `discover_uuid` is
/// set, a directory whose UUID-named `.jsonl` children are tailed
/// concurrently by the same watcher.
#[derive(Debug, Clone)]
pub struct TranscriptWatcherConfig {
    pub path: PathBuf,
    /// Required unless `raw_mode` is true.
    pub source: Option<String>,
    pub event_buffer_size: usize,
    pub poll_interval: Duration,
    pub discover_uuid: bool,
    pub raw_mode: bool,
}

impl Default for TranscriptWatcherConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            source: None,
            event_buffer_size: 1000,
            poll_interval: Duration::from_millis(100),
            discover_uuid: false,
            raw_mode: false,
        }
    }
}

impl TranscriptWatcherConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// Configuration for a Directory Watcher: always discovery mode, always
/// parsed mode (raw mode is a per-Transcript-Watcher concept this layer
/// doesn't expose).
#[derive(Debug, Clone)]
pub struct DirectoryWatcherConfig {
    pub path: PathBuf,
    pub source: String,
    pub event_buffer_size: usize,
    pub poll_interval: Duration,
}

impl DirectoryWatcherConfig {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            event_buffer_size: 1000,
            poll_interval: Duration::from_millis(100),
        }
    }
}
