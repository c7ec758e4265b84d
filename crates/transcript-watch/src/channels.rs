use tokio::sync::{mpsc, oneshot};

use transcript_types::{ParsedEvent, RawLine};

use crate::error::Error;

/// Capacity of every watcher's error channel. Kept small and fixed so that
/// reporting errors can never itself become a source of backpressure.
pub const ERROR_CHANNEL_CAPACITY: usize = 10;

/// Channels exposed by a Transcript Watcher running in parsed mode.
pub struct ParsedChannels {
    pub events: mpsc::Receiver<ParsedEvent>,
    pub errors: mpsc::Receiver<Error>,
    pub done: oneshot::Receiver<()>,
}

/// Channels exposed by a Transcript Watcher running in raw mode.
pub struct RawChannels {
    pub lines: mpsc::Receiver<RawLine>,
    pub errors: mpsc::Receiver<Error>,
    pub done: oneshot::Receiver<()>,
}

/// The channel set returned by construction, keyed on `raw_mode`. The two
/// modes use two distinct, separately-typed channels rather than one
/// `Emitted::Parsed/Raw` envelope, so neither side pays a runtime
/// discriminant check on the hot path.
pub enum Channels {
    Parsed(ParsedChannels),
    Raw(RawChannels),
}

/// The producer-side halves, owned by a watcher's poll loop. Dropped at the
/// end of the loop so receivers observe a closed channel exactly once, after
/// the loop has actually exited.
pub(crate) enum Producers {
    Parsed {
        events: mpsc::Sender<ParsedEvent>,
        errors: mpsc::Sender<Error>,
    },
    Raw {
        lines: mpsc::Sender<RawLine>,
        errors: mpsc::Sender<Error>,
    },
}

impl Producers {
    pub(crate) fn errors_sender(&self) -> mpsc::Sender<Error> {
        match self {
            Producers::Parsed { errors, .. } | Producers::Raw { errors, .. } => errors.clone(),
        }
    }
}

/// Report one error on a watcher's error channel via `try_send`, recording it
/// in `stats` first. If the error channel itself is full, the error is
/// dropped silently (logged at the call site) rather than retried, so that
/// reporting a drop can never itself cause backpressure.
pub(crate) async fn send_error(errors: &mpsc::Sender<Error>, stats: &crate::stats::SharedStats, err: Error) {
    stats.record_error(err.to_string());
    if errors.try_send(err).is_err() {
        tracing::warn!("error channel full, dropping error report");
    }
}
