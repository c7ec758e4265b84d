use transcript_types::{ParsedEvent, RawEntry};

use crate::error::Result;

/// A source-specific transcript parser.
///
/// Responsibilities:
/// - Recognize its own entry shapes (one JSON object per line)
/// - Normalize them into zero or more adapter-independent [`ParsedEvent`]s
/// - Silently drop entry types it doesn't represent as events (never error
///   on an unrecognized `type`, only on a recognized-but-malformed one)
pub trait Adapter: Send + Sync {
    /// Unique adapter name (e.g. "claude"), used as the registry key and as
    /// the `source` a Transcript Watcher is configured with.
    fn name(&self) -> &'static str;

    /// Parse one raw transcript line into zero, one, or more events.
    ///
    /// Returns `Ok(vec![])` for lines that are valid JSON but carry no
    /// semantic content this adapter maps to an event. Returns `Err` only
    /// when the line is malformed JSON or violates this adapter's structural
    /// contract (missing/mistyped required field).
    fn parse_entry(&self, entry: &RawEntry) -> Result<Vec<ParsedEvent>>;
}
