use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::{DirectoryWatcherConfig, TranscriptWatcherConfig};
use crate::directory::{DirectoryChannels, DirectoryWatcher};
use crate::error::{Error, Result};
use crate::stats::WatcherStats;
use crate::watcher::TranscriptWatcher;
use crate::Channels;

/// What a Session Registry entry actually watches: either a single
/// Transcript Watcher or a Directory Watcher fanning in several. The two
/// mechanisms expose different channel shapes, so the registry is generic
/// over which one a given task asked for rather than forcing both onto one
/// watcher type (`watch(task_id, config)` is polymorphic in practice).
pub enum WatchSpec {
    Transcript(TranscriptWatcherConfig),
    Directory(DirectoryWatcherConfig),
}

/// The channel set handed back for one registry entry, mirroring whichever
/// `WatchSpec` variant was requested.
pub enum WatchChannels {
    Transcript(Channels),
    Directory(DirectoryChannels),
}

enum Entry {
    Transcript(Arc<TranscriptWatcher>),
    Directory(Arc<DirectoryWatcher>),
}

impl Entry {
    async fn stop(&self) {
        match self {
            Entry::Transcript(watcher) => watcher.stop().await,
            Entry::Directory(watcher) => watcher.stop().await,
        }
    }

    fn stats(&self) -> WatcherStats {
        match self {
            Entry::Transcript(watcher) => watcher.stats(),
            Entry::Directory(watcher) => watcher.stats(),
        }
    }
}

/// Tracks every task's transcript watch by `task_id`, so a host process
/// doesn't have to hold its own map of watcher handles.
#[derive(Default)]
pub struct SessionRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct and start a watcher for `task_id`. If one is already
    /// registered under that id, it is stopped and replaced.
    pub async fn watch(&self, task_id: impl Into<String>, spec: WatchSpec) -> Result<WatchChannels> {
        let task_id = task_id.into();

        // Take the handle under the lock, but stop it (a potentially slow,
        // awaiting operation) outside the lock, so a slow stop never holds
        // up unrelated registry reads/writes.
        let previous = self.entries.write().await.remove(&task_id);
        if let Some(previous) = previous {
            previous.stop().await;
        }

        let (entry, channels) = match spec {
            WatchSpec::Transcript(config) => {
                let (watcher, channels) = TranscriptWatcher::new(config)?;
                let watcher = Arc::new(watcher);
                watcher.start().await?;
                (Entry::Transcript(watcher), WatchChannels::Transcript(channels))
            }
            WatchSpec::Directory(config) => {
                let (watcher, channels) = DirectoryWatcher::new(config)?;
                let watcher = Arc::new(watcher);
                watcher.start().await?;
                (Entry::Directory(watcher), WatchChannels::Directory(channels))
            }
        };

        self.entries.write().await.insert(task_id, entry);
        Ok(channels)
    }

    /// Stop and deregister a single task's watch. A no-op if `task_id` isn't
    /// registered.
    pub async fn stop(&self, task_id: &str) {
        let entry = self.entries.write().await.remove(task_id);
        if let Some(entry) = entry {
            entry.stop().await;
        }
    }

    /// Stop and deregister every registered watch, e.g. on process shutdown.
    pub async fn stop_all(&self) {
        let entries: Vec<Entry> = self.entries.write().await.drain().map(|(_, entry)| entry).collect();
        for entry in entries {
            entry.stop().await;
        }
    }

    /// Statistics for a single registered task, if it exists.
    pub async fn stats(&self, task_id: &str) -> Option<WatcherStats> {
        self.entries.read().await.get(task_id).map(Entry::stats)
    }

    /// `task_id`s currently registered.
    pub async fn task_ids(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }
}
