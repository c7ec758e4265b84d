use std::fmt;

/// Result type for transcript-watch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the watcher layer. Most variants are reported on a
/// watcher's error channel rather than returned — only construction/lifecycle
/// failures propagate synchronously (see each variant's doc comment).
#[derive(Debug)]
pub enum Error {
    /// Missing required config, or an inaccessible path at construction time.
    /// Returned synchronously from construction.
    InitFailed(String),

    /// The requested adapter source is not registered. Returned synchronously
    /// from construction (when not in raw mode).
    UnknownSource(String),

    /// `start` called on an already-stopped watcher. Returned synchronously.
    WatcherClosed,

    /// A single line was invalid JSON or violated the adapter's structural
    /// contract. Reported on the error channel; the line is skipped.
    MalformedEntry(transcript_adapters::Error),

    /// An event/raw channel could not accept a send. Reported on the error
    /// channel, one entry per dropped item.
    BufferFull(String),

    /// I/O error other than EOF or NotExist while reading a file. Reported on
    /// the error channel.
    FileReadError(std::io::Error),

    /// Readdir failure other than NotExist. Reported on the error channel;
    /// retried on the next poll tick.
    DirectoryError(std::io::Error),

    /// A child Transcript Watcher's error, re-surfaced on a Directory
    /// Watcher's merged error channel with the originating filename attached.
    Forwarded(String, Box<Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InitFailed(msg) => write!(f, "watcher init failed: {}", msg),
            Error::UnknownSource(name) => write!(f, "unknown adapter source: {}", name),
            Error::WatcherClosed => write!(f, "watcher is closed"),
            Error::MalformedEntry(err) => write!(f, "malformed entry: {}", err),
            Error::BufferFull(msg) => write!(f, "{}", msg),
            Error::FileReadError(err) => write!(f, "file read error: {}", err),
            Error::DirectoryError(err) => write!(f, "directory error: {}", err),
            Error::Forwarded(file, err) => write!(f, "{}: {}", file, err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedEntry(err) => Some(err),
            Error::FileReadError(err) | Error::DirectoryError(err) => Some(err),
            Error::Forwarded(_, err) => Some(err),
            Error::InitFailed(_) | Error::UnknownSource(_) | Error::WatcherClosed | Error::BufferFull(_) => None,
        }
    }
}

impl From<transcript_adapters::Error> for Error {
    fn from(err: transcript_adapters::Error) -> Self {
        Error::MalformedEntry(err)
    }
}
