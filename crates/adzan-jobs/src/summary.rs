//! Job outcome types — summaries and the typed failure reason.
//!
//! Errors are values here, not exceptions: a job returns either a
//! [`JobSummary`] or a [`JobError`], and the combined run carries both
//! jobs' results side by side.

use serde::Serialize;
use thiserror::Error;

use adzan_core::ConfigError;
use adzan_store::StoreError;

/// Why a job aborted. Per-recipient transport failures are not errors —
/// they are counted in the summary.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Summary of one completed job invocation.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    /// "adzan" or "reminder".
    pub job: &'static str,
    /// Rows this invocation owned (newly queued; candidates on the
    /// short-circuit paths).
    pub processed: u64,
    pub sent: u64,
    pub failed: u64,
    /// The HH:MM minute the run resolved.
    pub time: String,
    pub time_zone: String,
    /// Set on the short-circuit paths ("No schedule", …).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Element-wise sum of the two jobs' counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub processed: u64,
    pub sent: u64,
    pub failed: u64,
}

impl Totals {
    fn add(&mut self, summary: &JobSummary) {
        self.processed += summary.processed;
        self.sent += summary.sent;
        self.failed += summary.failed;
    }
}

/// Outcome of the combined "run both" entry point. Both jobs always run;
/// a first-job failure never skips the second, and totals aggregate
/// whatever succeeded.
#[derive(Debug)]
pub struct CombinedRun {
    pub adzan: Result<JobSummary, JobError>,
    pub reminder: Result<JobSummary, JobError>,
}

impl CombinedRun {
    /// Sum the counters of the jobs that completed.
    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        if let Ok(summary) = &self.adzan {
            totals.add(summary);
        }
        if let Ok(summary) = &self.reminder {
            totals.add(summary);
        }
        totals
    }

    /// True when both jobs completed (partial delivery still counts as
    /// completed — it is bookkept, not fatal).
    pub fn is_ok(&self) -> bool {
        self.adzan.is_ok() && self.reminder.is_ok()
    }
}
