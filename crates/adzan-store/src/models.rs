//! Row types and update payloads for the console tables.

use adzan_core::Occasion;
use serde::{Deserialize, Serialize};

/// A mobile-app user as seen by the console and the dispatch engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    /// Push token; `None` or empty means the user is unreachable.
    pub token_firebase: Option<String>,
    /// Opt-in flag for custom reminder broadcasts.
    pub is_reminder: bool,
    pub created_at: String,
}

/// Partial update applied to a user from the console.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub token_firebase: Option<Option<String>>,
    pub is_reminder: Option<bool>,
}

/// Device token registration from the mobile app.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRegistration {
    pub user_id: Option<String>,
    pub token: String,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub is_reminder: Option<bool>,
}

/// One per-user prayer schedule row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub id: i64,
    pub user_id: Option<String>,
    pub city_name: Option<String>,
    pub is_subuh: Option<bool>,
    pub is_dzuhur: Option<bool>,
    pub is_ashar: Option<bool>,
    pub is_maghrib: Option<bool>,
    pub is_isya: Option<bool>,
    pub subuh_time: Option<String>,
    pub dzuhur_time: Option<String>,
    pub ashar_time: Option<String>,
    pub maghrib_time: Option<String>,
    pub isya_time: Option<String>,
    pub created_at: String,
}

impl ScheduleRow {
    /// Enable flag for one occasion. Missing means "not enabled".
    pub fn flag(&self, occasion: Occasion) -> Option<bool> {
        match occasion {
            Occasion::Subuh => self.is_subuh,
            Occasion::Dzuhur => self.is_dzuhur,
            Occasion::Ashar => self.is_ashar,
            Occasion::Maghrib => self.is_maghrib,
            Occasion::Isya => self.is_isya,
        }
    }

    /// Configured time for one occasion.
    pub fn time(&self, occasion: Occasion) -> Option<&str> {
        match occasion {
            Occasion::Subuh => self.subuh_time.as_deref(),
            Occasion::Dzuhur => self.dzuhur_time.as_deref(),
            Occasion::Ashar => self.ashar_time.as_deref(),
            Occasion::Maghrib => self.maghrib_time.as_deref(),
            Occasion::Isya => self.isya_time.as_deref(),
        }
    }
}

/// Partial update applied to a schedule row from the console.
/// `Some(None)` on a time field clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleUpdate {
    pub city_name: Option<String>,
    pub is_subuh: Option<bool>,
    pub is_dzuhur: Option<bool>,
    pub is_ashar: Option<bool>,
    pub is_maghrib: Option<bool>,
    pub is_isya: Option<bool>,
    pub subuh_time: Option<Option<String>>,
    pub dzuhur_time: Option<Option<String>>,
    pub ashar_time: Option<Option<String>>,
    pub maghrib_time: Option<Option<String>>,
    pub isya_time: Option<Option<String>>,
}

/// A staff-managed recurring reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomReminder {
    pub id: String,
    pub title: String,
    pub body: String,
    /// HH:MM firing time; multiple reminders may share one.
    pub schedule_time: String,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating a reminder.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReminder {
    pub title: String,
    pub body: String,
    pub schedule_time: String,
    pub is_active: Option<bool>,
    pub sort_order: Option<i64>,
}

/// Partial update applied to a reminder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub schedule_time: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i64>,
}

/// Delivery state of a notification log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Queued,
    Sent,
    Failed,
}

impl LogStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

/// One notification log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub user_id: Option<String>,
    /// "adzan", "reminder" or "manual".
    pub source_type: String,
    pub category: String,
    pub title: String,
    pub body: String,
    pub status: LogStatus,
    pub error_message: Option<String>,
    pub scheduled_time: Option<String>,
    /// Unique across all time; the at-most-once-per-minute guarantee.
    pub dedupe_key: String,
    pub metadata: serde_json::Value,
    pub created_at: String,
    pub sent_at: Option<String>,
}

/// Insert payload for a notification log entry.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub user_id: Option<String>,
    pub source_type: String,
    pub category: String,
    pub title: String,
    pub body: String,
    pub status: LogStatus,
    pub error_message: Option<String>,
    pub scheduled_time: Option<String>,
    pub dedupe_key: String,
    pub metadata: serde_json::Value,
    pub sent_at: Option<String>,
}

/// Id + dedupe key of a row the enqueue actually inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedLog {
    pub id: i64,
    pub dedupe_key: String,
}

/// Filters for the log viewer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilter {
    pub status: Option<LogStatus>,
    pub source_type: Option<String>,
    pub limit: Option<i64>,
}

/// Outcome of one job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

impl RunStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

/// One cron job run audit row. Append-only, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronRun {
    pub id: i64,
    pub job_name: String,
    pub status: RunStatus,
    pub processed_count: i64,
    pub sent_count: i64,
    pub failed_count: i64,
    pub note: Option<String>,
    pub created_at: String,
}

/// Insert payload for a cron job run row.
#[derive(Debug, Clone)]
pub struct NewCronRun {
    pub job_name: String,
    pub status: RunStatus,
    pub processed_count: i64,
    pub sent_count: i64,
    pub failed_count: i64,
    pub note: Option<String>,
}

/// A console admin account. Password is a salted SHA-256 hash; hashing
/// lives in the gateway, the store only persists the result.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password_salt: String,
    pub password_hash: String,
    pub last_login_at: Option<String>,
}
