//! Clock resolver — "now" as a calendar date and a minute-resolution time
//! of day in the configured zone.
//!
//! Two calls within the same wall-clock minute in the same zone yield
//! identical output; the dedupe key's correctness rests on that.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// The current minute, rendered in one time zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowParts {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Time of day, `HH:MM`, seconds truncated.
    pub hhmm: String,
}

/// Resolve the current instant in `tz`.
pub fn now_parts(tz: Tz) -> NowParts {
    parts_at(Utc::now(), tz)
}

/// Resolve an arbitrary instant in `tz`. Used by tests and backfills.
pub fn parts_at(instant: DateTime<Utc>, tz: Tz) -> NowParts {
    let local = instant.with_timezone(&tz);
    NowParts {
        date: local.format("%Y-%m-%d").to_string(),
        hhmm: local.format("%H:%M").to_string(),
    }
}
