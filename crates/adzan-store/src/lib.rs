//! # Adzan Store
//!
//! SQLite-backed datastore for the admin console and the dispatch engine.
//!
//! Six tables: `users`, `adzan_schedules`, `custom_reminders`,
//! `notification_logs`, `cron_job_runs` and `admins`. Statements are atomic but there
//! is no transaction spanning a job's read and enqueue phases — the unique
//! `dedupe_key` column on `notification_logs` is the correctness mechanism
//! for concurrent triggers, not isolation.

pub mod error;
pub mod models;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::StoreError;
pub use models::{
    Admin, CronRun, CustomReminder, DeviceRegistration, LogEntry, LogFilter, LogStatus, NewCronRun,
    NewLogEntry, NewReminder, QueuedLog, ReminderUpdate, RunStatus, ScheduleRow, ScheduleUpdate,
    User, UserUpdate,
};
pub use store::Store;
