use chrono::{DateTime, Utc};

/// Parse a transcript entry's `timestamp` field. Tries RFC 3339 with
/// nanoseconds, then plain RFC 3339, then falls back to wall-clock now.
/// Never fails: a malformed or missing timestamp is not a reason to reject
/// the entry.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return Utc::now(),
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
