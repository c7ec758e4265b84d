use std::sync::atomic::{AtomicU16, Ordering};

use chrono::{DateTime, Utc};

static COUNTER: AtomicU16 = AtomicU16::new(0);

/// Generate an event id: `<YYYYMMDDHHMMSS.nnnnnnnnn>-<4 hex digit counter>`.
///
/// Distinct from the timestamp's nanosecond field, the counter is a single
/// process-wide atomic, masked to 16 bits, so two events minted within the
/// same nanosecond still get distinct ids (up to 65536 of them).
pub fn generate(timestamp: DateTime<Utc>) -> String {
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}.{:09}-{:04x}",
        timestamp.format("%Y%m%d%H%M%S"),
        timestamp.timestamp_subsec_nanos(),
        count
    )
}

/// Reset the counter to zero. Only meant for test determinism; never called
/// from production code paths.
#[cfg(test)]
pub(crate) fn reset_for_test() {
    COUNTER.store(0, Ordering::Relaxed);
}
