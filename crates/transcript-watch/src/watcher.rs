use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{info, info_span, warn};

use transcript_adapters::Adapter;
use transcript_types::{RawEntry, RawLine};

use crate::active_file::ActiveFile;
use crate::cancel::CancelToken;
use crate::channels::{Channels, ParsedChannels, Producers, RawChannels, send_error};
use crate::config::TranscriptWatcherConfig;
use crate::discovery::is_uuid_jsonl;
use crate::error::{Error, Result};
use crate::stats::{SharedStats, WatcherStats};

enum Lifecycle {
    New,
    Started(Arc<CancelToken>, tokio::task::JoinHandle<()>),
    Closed,
}

/// Tails one or more JSONL transcript files, producing either normalized
/// [`transcript_types::ParsedEvent`]s or raw lines depending on
/// `config.raw_mode`.
pub struct TranscriptWatcher {
    config: TranscriptWatcherConfig,
    adapter: Option<Arc<dyn Adapter>>,
    stats: SharedStats,
    producers: AsyncMutex<Option<Producers>>,
    done_tx: AsyncMutex<Option<oneshot::Sender<()>>>,
    lifecycle: AsyncMutex<Lifecycle>,
}

impl TranscriptWatcher {
    /// Construct a watcher and its channel set. Fails synchronously on
    /// `InitFailed`/`UnknownSource`; never fails merely because `path`
    /// doesn't exist yet.
    pub fn new(config: TranscriptWatcherConfig) -> Result<(Self, Channels)> {
        if config.path.as_os_str().is_empty() {
            return Err(Error::InitFailed("path is required".to_string()));
        }

        let adapter = if config.raw_mode {
            None
        } else {
            let source = config
                .source
                .clone()
                .ok_or_else(|| Error::InitFailed("source is required unless raw_mode is set".to_string()))?;
            Some(
                transcript_adapters::get(&source).map_err(|_| Error::UnknownSource(source))?,
            )
        };

        let stats = SharedStats::new(config.path.clone(), config.discover_uuid, config.source.clone());
        let (done_tx, done_rx) = oneshot::channel();

        let (producers, channels) = if config.raw_mode {
            let (lines_tx, lines_rx) = tokio::sync::mpsc::channel(config.event_buffer_size.max(1));
            let (errors_tx, errors_rx) = tokio::sync::mpsc::channel(crate::channels::ERROR_CHANNEL_CAPACITY);
            (
                Producers::Raw { lines: lines_tx, errors: errors_tx },
                Channels::Raw(RawChannels { lines: lines_rx, errors: errors_rx, done: done_rx }),
            )
        } else {
            let (events_tx, events_rx) = tokio::sync::mpsc::channel(config.event_buffer_size.max(1));
            let (errors_tx, errors_rx) = tokio::sync::mpsc::channel(crate::channels::ERROR_CHANNEL_CAPACITY);
            (
                Producers::Parsed { events: events_tx, errors: errors_tx },
                Channels::Parsed(ParsedChannels { events: events_rx, errors: errors_rx, done: done_rx }),
            )
        };

        let watcher = Self {
            config,
            adapter,
            stats,
            producers: AsyncMutex::new(Some(producers)),
            done_tx: AsyncMutex::new(Some(done_tx)),
            lifecycle: AsyncMutex::new(Lifecycle::New),
        };
        Ok((watcher, channels))
    }

    /// Current statistics snapshot. Safe to call concurrently with
    /// the poll loop.
    pub fn stats(&self) -> WatcherStats {
        self.stats.snapshot()
    }

    pub(crate) fn shared_stats(&self) -> SharedStats {
        self.stats.clone()
    }

    /// Idempotent: a second call while already started is a no-op. Fails
    /// with `WatcherClosed` if this watcher has already been stopped.
    pub async fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Started(..) => return Ok(()),
            Lifecycle::Closed => return Err(Error::WatcherClosed),
            Lifecycle::New => {}
        }

        let producers = self
            .producers
            .lock()
            .await
            .take()
            .expect("producers are only consumed once, by the New->Started transition");
        let done_tx = self.done_tx.lock().await.take();
        let cancel = CancelToken::new();
        let cancel_for_task = Arc::clone(&cancel);

        let config = self.config.clone();
        let adapter = self.adapter.clone();
        let stats = self.stats.clone();

        let handle = tokio::spawn(async move {
            run(config, adapter, stats, producers, cancel_for_task).await;
            if let Some(tx) = done_tx {
                let _ = tx.send(());
            }
        });

        *lifecycle = Lifecycle::Started(cancel, handle);
        Ok(())
    }

    /// Idempotent; synchronously waits for the poll loop to exit and its
    /// channels to close.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Lifecycle::Started(cancel, handle) = std::mem::replace(&mut *lifecycle, Lifecycle::Closed) {
            cancel.cancel();
            let _ = handle.await;
        }
        self.stats.mark_closed();
    }
}

async fn run(
    config: TranscriptWatcherConfig,
    adapter: Option<Arc<dyn Adapter>>,
    stats: SharedStats,
    mut producers: Producers,
    cancel: Arc<CancelToken>,
) {
    let span = info_span!("transcript_watcher", path = %config.path.display(), source = config.source.as_deref().unwrap_or("<raw>"));
    let _enter = span.enter();
    info!("started");
    stats.mark_initialized();

    let mut active: HashMap<PathBuf, ActiveFile> = HashMap::new();
    let mut line_numbers: HashMap<PathBuf, u64> = HashMap::new();

    loop {
        if config.discover_uuid {
            discover_and_open(&config.path, &mut active, &stats, &producers).await;
        } else if active.is_empty() {
            try_open_single(&config.path, &mut active, &stats, &producers).await;
        }

        stats.set_active_files(active.keys().map(|p| base_name(p)).collect());

        for (path, file) in active.iter_mut() {
            let (lines, read_errors) = file.read_available_lines().await;
            if !lines.is_empty() {
                stats.add_lines_read(lines.len() as u64);
            }
            for err in read_errors {
                send_error(&producers.errors_sender(), &stats, err).await;
            }

            let counter = line_numbers.entry(path.clone()).or_insert(0);
            for line in lines {
                // A stripped newline means the budget collapses by one versus
                // the raw-with-newline accounting would otherwise suggest.
                if line.is_empty() {
                    continue;
                }
                *counter += 1;
                process_line(&adapter, &stats, &mut producers, *counter, line).await;
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(config.poll_interval) => {}
        }
    }

    stats.mark_closed();
    drop(producers);
    info!("stopped");
}

fn base_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

async fn discover_and_open(dir: &Path, active: &mut HashMap<PathBuf, ActiveFile>, stats: &SharedStats, producers: &Producers) {
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
        Err(err) => {
            send_error(&producers.errors_sender(), stats, Error::DirectoryError(err)).await;
            return;
        }
    };

    loop {
        let entry = match read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                send_error(&producers.errors_sender(), stats, Error::DirectoryError(err)).await;
                break;
            }
        };

        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if active.contains_key(&path) || !is_uuid_jsonl(&name) {
            continue;
        }

        match ActiveFile::open(&path).await {
            Ok(file) => {
                active.insert(path, file);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => send_error(&producers.errors_sender(), stats, Error::FileReadError(err)).await,
        }
    }
}

async fn try_open_single(path: &Path, active: &mut HashMap<PathBuf, ActiveFile>, stats: &SharedStats, producers: &Producers) {
    match ActiveFile::open(path).await {
        Ok(file) => {
            active.insert(path.to_path_buf(), file);
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => send_error(&producers.errors_sender(), stats, Error::FileReadError(err)).await,
    }
}

async fn process_line(
    adapter: &Option<Arc<dyn Adapter>>,
    stats: &SharedStats,
    producers: &mut Producers,
    line_number: u64,
    bytes: Vec<u8>,
) {
    match producers {
        Producers::Raw { lines, errors } => {
            let raw_line = RawLine::new(bytes, Utc::now());
            if lines.try_send(raw_line).is_err() {
                send_error(errors, stats, Error::BufferFull("raw event channel full, dropping event".to_string())).await;
            }
        }
        Producers::Parsed { events, errors } => {
            let adapter = adapter.as_ref().expect("parsed mode always resolves an adapter at construction");
            let session_id_hint = extract_session_id_hint(&bytes);
            let raw_entry = RawEntry::new(line_number, bytes, session_id_hint);

            match adapter.parse_entry(&raw_entry) {
                Ok(parsed) => {
                    for event in parsed {
                        if events.try_send(event).is_err() {
                            send_error(errors, stats, Error::BufferFull("event channel full, dropping event".to_string())).await;
                        }
                    }
                }
                Err(err) => {
                    warn!(line = line_number, "malformed transcript entry: {}", err);
                    send_error(errors, stats, Error::from(err)).await;
                }
            }
        }
    }
}

/// Best-effort `sessionId` extraction for routing/correlation — a second,
/// cheap decode purely for routing; its failure is never an error.
fn extract_session_id_hint(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value.get("sessionId")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use transcript_testing::fixtures::{append_line, write_jsonl};

    use super::*;
    use crate::config::TranscriptWatcherConfig;

    fn claude_user_line(uuid: &str, session_id: &str, text: &str) -> String {
        serde_json::json!({
            "type": "user",
            "uuid": uuid,
            "sessionId": session_id,
            "timestamp": "2025-01-15T10:30:00.000Z",
            "message": { "role": "user", "content": text },
        })
        .to_string()
    }

    fn claude_assistant_text(uuid: &str, session_id: &str, text: &str) -> String {
        serde_json::json!({
            "type": "assistant",
            "uuid": uuid,
            "sessionId": session_id,
            "message": { "role": "assistant", "content": [ { "type": "text", "text": text } ] },
        })
        .to_string()
    }

    #[tokio::test]
    async fn scenario_a_single_user_text_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jsonl(dir.path(), "s1.jsonl", &[claude_user_line("u1", "s1", "Hi")]);

        let config = TranscriptWatcherConfig {
            path,
            source: Some("claude".to_string()),
            poll_interval: Duration::from_millis(20),
            ..Default::default()
        };
        let (watcher, channels) = TranscriptWatcher::new(config).unwrap();
        watcher.start().await.unwrap();

        let Channels::Parsed(mut parsed) = channels else { panic!("expected parsed channels") };
        let event = tokio::time::timeout(Duration::from_secs(1), parsed.events.recv())
            .await
            .expect("event within timeout")
            .expect("channel open");

        assert_eq!(event.event_type, transcript_types::EventType::UserPrompt);
        assert!(event.is_human_input);
        assert_eq!(event.session_id, "s1");
        assert_eq!(event.content_preview.as_deref(), Some("Hi"));

        watcher.stop().await;
    }

    #[tokio::test]
    async fn scenario_f_file_created_after_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.jsonl");

        let config = TranscriptWatcherConfig {
            path: path.clone(),
            source: Some("claude".to_string()),
            poll_interval: Duration::from_millis(20),
            ..Default::default()
        };
        let (watcher, channels) = TranscriptWatcher::new(config).unwrap();
        watcher.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        append_line(&path, &claude_assistant_text("a1", "s1", "hello"));

        let Channels::Parsed(mut parsed) = channels else { panic!("expected parsed channels") };
        let event = tokio::time::timeout(Duration::from_secs(1), parsed.events.recv())
            .await
            .expect("event within timeout")
            .expect("channel open");
        assert_eq!(event.event_type, transcript_types::EventType::AiOutput);

        assert!(parsed.errors.try_recv().is_err());
        watcher.stop().await;
    }

    // Needs its own OS thread for the error-drain task to make progress
    // concurrently with the watcher's poll loop (the error channel's capacity
    // of 10 is smaller than the 15 expected drops, so nothing below this
    // count survives unless something keeps draining it as the watcher runs).
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn scenario_e_backpressure_drops_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..20).map(|i| claude_user_line(&format!("u{i}"), "s1", "x")).collect();
        let path = write_jsonl(dir.path(), "s1.jsonl", &lines);

        let config = TranscriptWatcherConfig {
            path,
            source: Some("claude".to_string()),
            event_buffer_size: 5,
            poll_interval: Duration::from_millis(20),
            ..Default::default()
        };
        let (watcher, channels) = TranscriptWatcher::new(config).unwrap();
        watcher.start().await.unwrap();

        let Channels::Parsed(mut parsed) = channels else { panic!("expected parsed channels") };

        // Never drain events, so sends to that channel keep failing; drain
        // errors concurrently so the bounded error channel doesn't itself
        // cap how many BufferFull reports we can observe.
        let drain = tokio::spawn(async move {
            let mut dropped = 0u32;
            while parsed.errors.recv().await.is_some() {
                dropped += 1;
            }
            dropped
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        let stats = watcher.stats();
        assert_eq!(stats.lines_read, 20);
        assert!(!stats.closed);

        watcher.stop().await;
        let dropped = drain.await.unwrap();
        assert!(dropped >= 15, "expected at least 15 BufferFull errors, got {dropped}");
    }

    #[tokio::test]
    async fn raw_mode_emits_lines_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_jsonl(dir.path(), "raw.jsonl", &["hello world".to_string()]);

        let config = TranscriptWatcherConfig {
            path,
            raw_mode: true,
            poll_interval: Duration::from_millis(20),
            ..Default::default()
        };
        let (watcher, channels) = TranscriptWatcher::new(config).unwrap();
        watcher.start().await.unwrap();

        let Channels::Raw(mut raw) = channels else { panic!("expected raw channels") };
        let line = tokio::time::timeout(Duration::from_secs(1), raw.lines.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line.bytes, b"hello world");

        watcher.stop().await;
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_start_fails_after_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jsonl");
        let config = TranscriptWatcherConfig {
            path,
            source: Some("claude".to_string()),
            ..Default::default()
        };
        let (watcher, _channels) = TranscriptWatcher::new(config).unwrap();
        watcher.start().await.unwrap();
        watcher.stop().await;
        watcher.stop().await;

        let err = watcher.start().await.unwrap_err();
        assert!(matches!(err, Error::WatcherClosed));
    }

    #[tokio::test]
    async fn second_start_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jsonl");
        let config = TranscriptWatcherConfig {
            path,
            source: Some("claude".to_string()),
            ..Default::default()
        };
        let (watcher, _channels) = TranscriptWatcher::new(config).unwrap();
        watcher.start().await.unwrap();
        watcher.start().await.unwrap();
        watcher.stop().await;
    }

    #[test]
    fn construction_fails_on_unknown_source() {
        let config = TranscriptWatcherConfig {
            path: PathBuf::from("/tmp/whatever.jsonl"),
            source: Some("not-a-real-source".to_string()),
            ..Default::default()
        };
        let err = TranscriptWatcher::new(config).unwrap_err();
        assert!(matches!(err, Error::UnknownSource(_)));
    }

    #[test]
    fn construction_does_not_fail_when_path_is_missing() {
        let config = TranscriptWatcherConfig {
            path: PathBuf::from("/tmp/does-not-exist-at-all.jsonl"),
            source: Some("claude".to_string()),
            ..Default::default()
        };
        assert!(TranscriptWatcher::new(config).is_ok());
    }
}
