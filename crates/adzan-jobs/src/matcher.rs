//! Schedule matcher — which occasion, if any, is due for one user this
//! minute.
//!
//! The reminder side of matching is a plain store query
//! (`Store::due_reminders`); only the per-user prayer selection needs
//! logic of its own.

use adzan_core::Occasion;
use adzan_store::ScheduleRow;

/// Pick the prayer occasion due at `hhmm` for one schedule row.
///
/// An occasion matches iff its enable flag is set AND its configured time
/// equals `hhmm` exactly (string equality at minute resolution). A missing
/// flag or time never matches. If two configured times coincide, the first
/// occasion in [`Occasion::ALL`] priority order wins.
pub fn pick_prayer(row: &ScheduleRow, hhmm: &str) -> Option<Occasion> {
    Occasion::ALL
        .into_iter()
        .find(|&occasion| row.flag(occasion) == Some(true) && row.time(occasion) == Some(hhmm))
}
