use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot};
use tracing::{info, info_span};

use crate::cancel::CancelToken;
use crate::channels::{Channels, send_error};
use crate::config::{DirectoryWatcherConfig, TranscriptWatcherConfig};
use crate::discovery::is_uuid_jsonl;
use crate::error::{Error, Result};
use crate::stats::{SharedStats, WatcherStats};
use crate::watcher::TranscriptWatcher;

use transcript_types::ParsedEvent;

enum Lifecycle {
    New,
    Started(Arc<CancelToken>, tokio::task::JoinHandle<()>),
    Closed,
}

/// Channels exposed by a Directory Watcher: one merged event stream and one
/// merged, filename-annotated error stream, fanned in from every child
/// Transcript Watcher.
pub struct DirectoryChannels {
    pub events: mpsc::Receiver<ParsedEvent>,
    pub errors: mpsc::Receiver<Error>,
    pub done: oneshot::Receiver<()>,
}

/// One discovered session file and the child watcher tailing it.
struct Child {
    watcher: Arc<TranscriptWatcher>,
    forwarder: tokio::task::JoinHandle<()>,
}

type Children = Arc<AsyncMutex<HashMap<String, Child>>>;

/// Watches a directory of UUID-named `.jsonl` session files, spawning one
/// child [`TranscriptWatcher`] per discovered file and fanning their output
/// into a single pair of merged channels.
pub struct DirectoryWatcher {
    config: DirectoryWatcherConfig,
    stats: SharedStats,
    children: Children,
    // Held only until `start` moves it into the poll task — never cloned and
    // kept around, or the producer side would outlive the task and the
    // merged channels would never close on `stop` (see TranscriptWatcher's
    // identical `producers` field).
    producers: AsyncMutex<Option<(mpsc::Sender<ParsedEvent>, mpsc::Sender<Error>)>>,
    done_tx: AsyncMutex<Option<oneshot::Sender<()>>>,
    lifecycle: AsyncMutex<Lifecycle>,
}

impl DirectoryWatcher {
    /// Construct a directory watcher and its merged channel set. Fails
    /// synchronously if `source` names no registered adapter, same as a
    /// Transcript Watcher would.
    pub fn new(config: DirectoryWatcherConfig) -> Result<(Self, DirectoryChannels)> {
        if config.path.as_os_str().is_empty() {
            return Err(Error::InitFailed("path is required".to_string()));
        }
        transcript_adapters::get(&config.source).map_err(|_| Error::UnknownSource(config.source.clone()))?;

        let stats = SharedStats::new(config.path.clone(), true, Some(config.source.clone()));
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer_size.max(1));
        let (errors_tx, errors_rx) = mpsc::channel(crate::channels::ERROR_CHANNEL_CAPACITY);
        let (done_tx, done_rx) = oneshot::channel();

        let watcher = Self {
            config,
            stats,
            children: Arc::new(AsyncMutex::new(HashMap::new())),
            producers: AsyncMutex::new(Some((events_tx, errors_tx))),
            done_tx: AsyncMutex::new(Some(done_tx)),
            lifecycle: AsyncMutex::new(Lifecycle::New),
        };
        Ok((watcher, DirectoryChannels { events: events_rx, errors: errors_rx, done: done_rx }))
    }

    /// Aggregate statistics snapshot across every tracked session.
    pub fn stats(&self) -> WatcherStats {
        self.stats.snapshot()
    }

    /// Base names of every session file currently being tailed.
    pub async fn active_sessions(&self) -> Vec<String> {
        self.children.lock().await.keys().cloned().collect()
    }

    /// Idempotent; fails with `WatcherClosed` once stopped.
    pub async fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Started(..) => return Ok(()),
            Lifecycle::Closed => return Err(Error::WatcherClosed),
            Lifecycle::New => {}
        }

        let done_tx = self.done_tx.lock().await.take();
        let (events_tx, errors_tx) = self
            .producers
            .lock()
            .await
            .take()
            .expect("producers are only consumed once, by the New->Started transition");
        let cancel = CancelToken::new();
        let cancel_for_task = Arc::clone(&cancel);

        let config = self.config.clone();
        let stats = self.stats.clone();
        let children = Arc::clone(&self.children);

        let handle = tokio::spawn(async move {
            run(config, stats, events_tx, errors_tx, children, cancel_for_task).await;
            if let Some(tx) = done_tx {
                let _ = tx.send(());
            }
        });

        *lifecycle = Lifecycle::Started(cancel, handle);
        Ok(())
    }

    /// Idempotent; synchronously waits for the directory poll loop, every
    /// child Transcript Watcher, and every forwarder task to finish.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Lifecycle::Started(cancel, handle) = std::mem::replace(&mut *lifecycle, Lifecycle::Closed) {
            cancel.cancel();
            let _ = handle.await;
        }

        let mut children = self.children.lock().await;
        for (_, child) in children.drain() {
            child.watcher.stop().await;
            let _ = child.forwarder.await;
        }
        self.stats.mark_closed();
    }
}

async fn run(
    config: DirectoryWatcherConfig,
    stats: SharedStats,
    events_tx: mpsc::Sender<ParsedEvent>,
    errors_tx: mpsc::Sender<Error>,
    children: Children,
    cancel: Arc<CancelToken>,
) {
    let span = info_span!("directory_watcher", path = %config.path.display(), source = %config.source);
    let _enter = span.enter();
    info!("started");
    stats.mark_initialized();

    loop {
        discover(&config, &stats, &events_tx, &errors_tx, &children).await;
        stats.set_active_files(children.lock().await.keys().cloned().collect());

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(config.poll_interval) => {}
        }
    }

    stats.mark_closed();
    info!("stopped");
}

async fn discover(
    config: &DirectoryWatcherConfig,
    stats: &SharedStats,
    events_tx: &mpsc::Sender<ParsedEvent>,
    errors_tx: &mpsc::Sender<Error>,
    children: &Children,
) {
    let mut read_dir = match tokio::fs::read_dir(&config.path).await {
        Ok(rd) => rd,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
        Err(err) => {
            send_error(errors_tx, stats, Error::DirectoryError(err)).await;
            return;
        }
    };

    loop {
        let entry = match read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                send_error(errors_tx, stats, Error::DirectoryError(err)).await;
                break;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_uuid_jsonl(&name) {
            continue;
        }

        let mut children_guard = children.lock().await;
        if children_guard.contains_key(&name) {
            continue;
        }

        let child_config = TranscriptWatcherConfig {
            path: entry.path(),
            source: Some(config.source.clone()),
            // Each child gets a fraction of the parent's buffer, since the
            // parent's merged channel is the real backpressure point.
            event_buffer_size: (config.event_buffer_size / 10).max(1),
            poll_interval: config.poll_interval,
            discover_uuid: false,
            raw_mode: false,
        };

        let (watcher, channels) = match TranscriptWatcher::new(child_config) {
            Ok(pair) => pair,
            Err(err) => {
                send_error(errors_tx, stats, Error::Forwarded(name, Box::new(err))).await;
                continue;
            }
        };
        let watcher = Arc::new(watcher);
        if let Err(err) = watcher.start().await {
            send_error(errors_tx, stats, Error::Forwarded(name, Box::new(err))).await;
            continue;
        }

        let Channels::Parsed(parsed) = channels else {
            unreachable!("child transcript watchers are always constructed in parsed mode");
        };

        let forwarder = tokio::spawn(forward(name.clone(), parsed, events_tx.clone(), errors_tx.clone(), stats.clone()));

        children_guard.insert(name, Child { watcher, forwarder });
    }
}

/// Drains one child's two channels into the Directory Watcher's merged pair
/// until both have closed. Closes independently rather than breaking on the
/// first `None`, since a child's events and errors channels are distinct
/// `mpsc` pairs that may be observed to close in either order even though
/// both producer halves are dropped in the same instant.
async fn forward(
    file_name: String,
    mut parsed: crate::channels::ParsedChannels,
    events_tx: mpsc::Sender<ParsedEvent>,
    errors_tx: mpsc::Sender<Error>,
    stats: SharedStats,
) {
    let mut events_open = true;
    let mut errors_open = true;

    while events_open || errors_open {
        tokio::select! {
            event = parsed.events.recv(), if events_open => {
                match event {
                    Some(event) => {
                        if events_tx.try_send(event).is_err() {
                            let dropped = Error::Forwarded(file_name.clone(), Box::new(Error::BufferFull("merged event channel full, dropping event".to_string())));
                            send_error(&errors_tx, &stats, dropped).await;
                        }
                    }
                    None => events_open = false,
                }
            }
            err = parsed.errors.recv(), if errors_open => {
                match err {
                    Some(err) => send_error(&errors_tx, &stats, Error::Forwarded(file_name.clone(), Box::new(err))).await,
                    None => errors_open = false,
                }
            }
        }
    }
}
