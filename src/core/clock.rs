//! Fixed-offset local clock for the order/delivery subsystem.
//!
//! The platform operates in a single region; couriers, the kitchen, and the
//! admin panel all read and write wall-clock times at UTC+5:30. Timestamps in
//! the order subsystem are stored as naive values on that clock - there is no
//! per-user timezone.

use chrono::{FixedOffset, NaiveDateTime, Utc};

/// The platform's fixed UTC offset, in seconds (+5:30).
const LOCAL_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// Returns the current wall-clock time on the platform's fixed local clock.
#[must_use]
pub fn now_local() -> NaiveDateTime {
    // The offset is a compile-time constant well inside chrono's valid range.
    #[allow(clippy::unwrap_used)]
    let offset = FixedOffset::east_opt(LOCAL_OFFSET_SECONDS).unwrap();
    Utc::now().with_timezone(&offset).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_clock_is_offset_from_utc() {
        let utc = Utc::now().naive_utc();
        let local = now_local();
        let drift = (local - utc).num_minutes();
        // 5h30m ahead of UTC, allowing a minute of slop around the two reads
        assert!((329..=331).contains(&drift), "unexpected drift: {drift}");
    }
}
