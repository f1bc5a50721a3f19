//! # Adzan Jobs
//!
//! The time-triggered dispatch engine. Once per minute a trigger (external
//! scheduler, the built-in ticker, or a staff member hitting the console)
//! runs two jobs — the prayer-time "adzan" job and the custom-reminder job.
//! Each job is one sequential pass:
//!
//! ```text
//! clock resolver → schedule matcher → recipient resolver
//!     → idempotent enqueue (dedupe_key) → push dispatcher → run recorder
//! ```
//!
//! There is no lock and no cross-invocation state: concurrent triggers
//! coordinate solely through the unique dedupe key at insert time. The
//! invocation that wins an insert dispatches that row; everyone else
//! no-ops. Per-recipient transport failures are bookkept, never fatal.

pub mod clock;
pub mod matcher;
pub mod runner;
pub mod summary;


pub use clock::{NowParts, now_parts, parts_at};
pub use matcher::pick_prayer;
pub use runner::{JobContext, run_adzan_job, run_all, run_reminder_job};
pub use summary::{CombinedRun, JobError, JobSummary, Totals};
