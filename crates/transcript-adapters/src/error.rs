use std::fmt;

/// Result type for transcript-adapters operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while routing or parsing a transcript entry
#[derive(Debug)]
pub enum Error {
    /// The entry's JSON did not decode as valid JSON at all
    Json(serde_json::Error),

    /// The entry decoded as JSON but did not match any shape this adapter
    /// understands (missing required field, wrong type, unexpected variant)
    MalformedEntry(String),

    /// No adapter is registered under the requested name
    UnknownSource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::MalformedEntry(msg) => write!(f, "malformed entry: {}", msg),
            Error::UnknownSource(name) => write!(f, "unknown adapter source: {}", name),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::MalformedEntry(_) | Error::UnknownSource(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
