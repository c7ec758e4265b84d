use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Read-only snapshot of a Transcript Watcher's health. A plain,
/// `Clone`-able struct rather than a trait object so a consumer's test can
/// assert on it directly.
#[derive(Debug, Clone, Default)]
pub struct WatcherStats {
    pub path: PathBuf,
    pub discover_dir: bool,
    /// Base names only, not full paths.
    pub active_files: Vec<String>,
    pub source: Option<String>,
    pub lines_read: u64,
    pub initialized: bool,
    pub closed: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    active_files: Vec<String>,
    lines_read: u64,
    initialized: bool,
    closed: bool,
    last_error: Option<String>,
}

/// The mutable half of a watcher's statistics, shared between the poll loop
/// (writer) and any number of concurrent [`SharedStats::snapshot`] callers
/// (readers). `path`/`discover_dir`/`source` are fixed at construction and
/// copied into every snapshot without taking the lock.
#[derive(Debug, Clone)]
pub struct SharedStats {
    path: PathBuf,
    discover_dir: bool,
    source: Option<String>,
    inner: Arc<Mutex<Inner>>,
}

impl SharedStats {
    pub(crate) fn new(path: PathBuf, discover_dir: bool, source: Option<String>) -> Self {
        Self {
            path,
            discover_dir,
            source,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub(crate) fn mark_initialized(&self) {
        self.inner.lock().expect("stats lock poisoned").initialized = true;
    }

    pub(crate) fn mark_closed(&self) {
        self.inner.lock().expect("stats lock poisoned").closed = true;
    }

    pub(crate) fn add_lines_read(&self, n: u64) {
        self.inner.lock().expect("stats lock poisoned").lines_read += n;
    }

    pub(crate) fn set_active_files(&self, files: Vec<String>) {
        self.inner.lock().expect("stats lock poisoned").active_files = files;
    }

    pub(crate) fn record_error(&self, message: impl Into<String>) {
        self.inner.lock().expect("stats lock poisoned").last_error = Some(message.into());
    }

    pub fn snapshot(&self) -> WatcherStats {
        let inner = self.inner.lock().expect("stats lock poisoned");
        WatcherStats {
            path: self.path.clone(),
            discover_dir: self.discover_dir,
            active_files: inner.active_files.clone(),
            source: self.source.clone(),
            lines_read: inner.lines_read,
            initialized: inner.initialized,
            closed: inner.closed,
            last_error: inner.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_writes() {
        let stats = SharedStats::new(PathBuf::from("/tmp/x.jsonl"), false, Some("claude".into()));
        stats.mark_initialized();
        stats.add_lines_read(3);
        stats.add_lines_read(2);
        stats.set_active_files(vec!["x.jsonl".to_string()]);
        stats.record_error("boom");

        let snap = stats.snapshot();
        assert!(snap.initialized);
        assert!(!snap.closed);
        assert_eq!(snap.lines_read, 5);
        assert_eq!(snap.active_files, vec!["x.jsonl".to_string()]);
        assert_eq!(snap.last_error.as_deref(), Some("boom"));
        assert_eq!(snap.source.as_deref(), Some("claude"));
    }

    #[test]
    fn mark_closed_is_visible_in_snapshot() {
        let stats = SharedStats::new(PathBuf::from("/tmp/x.jsonl"), false, None);
        stats.mark_closed();
        assert!(stats.snapshot().closed);
    }
}
