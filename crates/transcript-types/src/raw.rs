use chrono::{DateTime, Utc};

/// One unparsed line read from a transcript file, handed to an adapter's
/// `parse_entry`. `line_number` is 1-based within its own file — it does not
/// reset across files inside a Directory Watcher.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub line_number: u64,
    pub bytes: Vec<u8>,
    /// Best-effort `sessionId` extracted for routing/correlation; absence is
    /// not an error.
    pub session_id_hint: Option<String>,
}

impl RawEntry {
    pub fn new(line_number: u64, bytes: Vec<u8>, session_id_hint: Option<String>) -> Self {
        Self {
            line_number,
            bytes,
            session_id_hint,
        }
    }

    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }
}

/// One unparsed line, emitted verbatim when a Transcript Watcher runs in raw mode.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub bytes: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

impl RawLine {
    pub fn new(bytes: Vec<u8>, timestamp: DateTime<Utc>) -> Self {
        Self { bytes, timestamp }
    }
}
