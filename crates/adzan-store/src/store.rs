//! SQLite store — all query/insert/update/upsert operations.
//!
//! The idempotent enqueue (`enqueue_logs`) is the heart of the dispatch
//! engine: `INSERT OR IGNORE` keyed on the unique `dedupe_key` column, and
//! only the rows that were actually inserted are returned to the caller.

use rusqlite::{Connection, ToSql, params};
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;

use crate::error::StoreError;
use crate::models::{
    Admin, CronRun, CustomReminder, DeviceRegistration, LogEntry, LogFilter, LogStatus, NewCronRun,
    NewLogEntry, NewReminder, QueuedLog, ReminderUpdate, RunStatus, ScheduleRow, ScheduleUpdate,
    User, UserUpdate,
};

type Result<T> = std::result::Result<T, StoreError>;

/// The application datastore.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)?;
        // WAL for concurrent reads from the console while a job runs.
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.migrate()?;
        Ok(store)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Lock)
    }

    /// Run schema migrations.
    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT,
                email TEXT,
                device_id TEXT,
                device_name TEXT,
                token_firebase TEXT,
                is_reminder INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS adzan_schedules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT REFERENCES users(id),
                city_name TEXT,
                is_subuh INTEGER,
                is_dzuhur INTEGER,
                is_ashar INTEGER,
                is_maghrib INTEGER,
                is_isya INTEGER,
                subuh_time TEXT,
                dzuhur_time TEXT,
                ashar_time TEXT,
                maghrib_time TEXT,
                isya_time TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS custom_reminders (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                schedule_time TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notification_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT,
                source_type TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'queued',
                error_message TEXT,
                scheduled_time TEXT,
                dedupe_key TEXT NOT NULL UNIQUE,
                metadata TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                sent_at TEXT
            );

            CREATE TABLE IF NOT EXISTS cron_job_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_name TEXT NOT NULL,
                status TEXT NOT NULL,
                processed_count INTEGER NOT NULL DEFAULT 0,
                sent_count INTEGER NOT NULL DEFAULT 0,
                failed_count INTEGER NOT NULL DEFAULT 0,
                note TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS admins (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT,
                password_salt TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                last_login_at TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_logs_status ON notification_logs(status);
            CREATE INDEX IF NOT EXISTS idx_logs_source ON notification_logs(source_type);
            CREATE INDEX IF NOT EXISTS idx_schedules_user ON adzan_schedules(user_id);
            ",
        )?;
        Ok(())
    }

    // ─── Users ──────────────────────────────────────

    /// List users, newest first.
    pub fn list_users(&self, limit: i64) -> Result<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, device_id, device_name, token_firebase, is_reminder, created_at
             FROM users ORDER BY created_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], map_user)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Apply a partial update to one user. Returns false if the id is unknown.
    pub fn update_user(&self, id: &str, update: &UserUpdate) -> Result<bool> {
        let conn = self.lock()?;
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(name) = &update.name {
            sets.push("name = ?");
            values.push(name);
        }
        if let Some(email) = &update.email {
            sets.push("email = ?");
            values.push(email);
        }
        if let Some(token) = &update.token_firebase {
            sets.push("token_firebase = ?");
            values.push(token);
        }
        if let Some(is_reminder) = &update.is_reminder {
            sets.push("is_reminder = ?");
            values.push(is_reminder);
        }
        if sets.is_empty() {
            return Ok(false);
        }

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let id_owned = id.to_string();
        values.push(&id_owned);
        let changed = conn.execute(&sql, &values[..])?;
        Ok(changed == 1)
    }

    /// Register a device token: update by user id, else by device id,
    /// else create a new user (with an empty schedule row). Returns the
    /// user id the token now belongs to.
    pub fn upsert_device(&self, reg: &DeviceRegistration) -> Result<String> {
        let is_reminder = reg.is_reminder.unwrap_or(true);

        if let Some(user_id) = &reg.user_id {
            let conn = self.lock()?;
            let changed = conn.execute(
                "UPDATE users SET token_firebase = ?1, is_reminder = ?2, device_id = ?3, device_name = ?4
                 WHERE id = ?5",
                params![reg.token, is_reminder, reg.device_id, reg.device_name, user_id],
            )?;
            if changed == 1 {
                return Ok(user_id.clone());
            }
        }

        if let Some(device_id) = &reg.device_id {
            let conn = self.lock()?;
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM users WHERE device_id = ?1 LIMIT 1",
                    [device_id],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(ignore_no_rows)?;
            if let Some(id) = existing {
                conn.execute(
                    "UPDATE users SET token_firebase = ?1, is_reminder = ?2, device_name = ?3
                     WHERE id = ?4",
                    params![reg.token, is_reminder, reg.device_name, id],
                )?;
                return Ok(id);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (id, device_id, device_name, token_firebase, is_reminder, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, reg.device_id, reg.device_name, reg.token, is_reminder, now],
        )?;
        conn.execute(
            "INSERT INTO adzan_schedules (user_id, created_at) VALUES (?1, ?2)",
            params![id, now],
        )?;
        tracing::info!("📱 New device registered for user {id}");
        Ok(id)
    }

    /// Push tokens for a set of user ids, skipping null/empty tokens.
    pub fn users_with_tokens(&self, ids: &[String]) -> Result<Vec<(String, String)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, token_firebase FROM users
             WHERE id IN ({placeholders})
               AND token_firebase IS NOT NULL AND token_firebase != ''",
        );
        let mut stmt = conn.prepare(&sql)?;
        let values: Vec<&dyn ToSql> = ids.iter().map(|id| id as &dyn ToSql).collect();
        let rows = stmt.query_map(&values[..], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Users opted in to reminders with a usable token.
    pub fn reminder_recipients(&self) -> Result<Vec<(String, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, token_firebase FROM users
             WHERE is_reminder = 1 AND token_firebase IS NOT NULL AND token_firebase != ''
             ORDER BY created_at",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Every user with a usable token (manual broadcast audience).
    pub fn broadcast_recipients(&self) -> Result<Vec<(String, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, token_firebase FROM users
             WHERE token_firebase IS NOT NULL AND token_firebase != ''
             ORDER BY created_at",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    // ─── Adzan schedules ──────────────────────────────────────

    /// List schedule rows for the console, newest first.
    pub fn list_schedules(&self, limit: i64) -> Result<Vec<ScheduleRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SCHEDULE_COLS} FROM adzan_schedules ORDER BY created_at DESC LIMIT ?1",
        ))?;
        let rows = stmt.query_map([limit], map_schedule)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Schedule rows with at least one enabled prayer at exactly `hhmm`.
    /// The OR-of-five-ANDs mirrors the matcher: a null flag or time never
    /// matches.
    pub fn due_schedules(&self, hhmm: &str) -> Result<Vec<ScheduleRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SCHEDULE_COLS} FROM adzan_schedules
             WHERE (is_subuh = 1 AND subuh_time = ?1)
                OR (is_dzuhur = 1 AND dzuhur_time = ?1)
                OR (is_ashar = 1 AND ashar_time = ?1)
                OR (is_maghrib = 1 AND maghrib_time = ?1)
                OR (is_isya = 1 AND isya_time = ?1)
             ORDER BY id",
        ))?;
        let rows = stmt.query_map([hhmm], map_schedule)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Apply a partial update to one schedule row.
    pub fn update_schedule(&self, id: i64, update: &ScheduleUpdate) -> Result<bool> {
        let conn = self.lock()?;
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(city) = &update.city_name {
            sets.push("city_name = ?");
            values.push(city);
        }
        let flags: [(&str, &Option<bool>); 5] = [
            ("is_subuh = ?", &update.is_subuh),
            ("is_dzuhur = ?", &update.is_dzuhur),
            ("is_ashar = ?", &update.is_ashar),
            ("is_maghrib = ?", &update.is_maghrib),
            ("is_isya = ?", &update.is_isya),
        ];
        for (set, value) in flags {
            if let Some(flag) = value {
                sets.push(set);
                values.push(flag);
            }
        }
        let times: [(&str, &Option<Option<String>>); 5] = [
            ("subuh_time = ?", &update.subuh_time),
            ("dzuhur_time = ?", &update.dzuhur_time),
            ("ashar_time = ?", &update.ashar_time),
            ("maghrib_time = ?", &update.maghrib_time),
            ("isya_time = ?", &update.isya_time),
        ];
        for (set, value) in times {
            if let Some(time) = value {
                sets.push(set);
                values.push(time);
            }
        }
        if sets.is_empty() {
            return Ok(false);
        }

        let sql = format!("UPDATE adzan_schedules SET {} WHERE id = ?", sets.join(", "));
        values.push(&id);
        let changed = conn.execute(&sql, &values[..])?;
        Ok(changed == 1)
    }

    // ─── Custom reminders ──────────────────────────────────────

    /// List reminders ordered by schedule time then sort order.
    pub fn list_reminders(&self) -> Result<Vec<CustomReminder>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, body, schedule_time, is_active, sort_order, created_at, updated_at
             FROM custom_reminders ORDER BY schedule_time, sort_order",
        )?;
        let rows = stmt.query_map([], map_reminder)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Active reminders scheduled exactly at `hhmm`, sort order ascending.
    pub fn due_reminders(&self, hhmm: &str) -> Result<Vec<CustomReminder>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, body, schedule_time, is_active, sort_order, created_at, updated_at
             FROM custom_reminders
             WHERE is_active = 1 AND schedule_time = ?1
             ORDER BY sort_order",
        )?;
        let rows = stmt.query_map([hhmm], map_reminder)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Create a reminder, returning its id.
    pub fn create_reminder(&self, new: &NewReminder) -> Result<String> {
        let conn = self.lock()?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO custom_reminders (id, title, body, schedule_time, is_active, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                id,
                new.title,
                new.body,
                new.schedule_time,
                new.is_active.unwrap_or(true),
                new.sort_order.unwrap_or(0),
                now,
            ],
        )?;
        Ok(id)
    }

    /// Apply a partial update to one reminder.
    pub fn update_reminder(&self, id: &str, update: &ReminderUpdate) -> Result<bool> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        let mut sets: Vec<&str> = vec!["updated_at = ?"];
        let mut values: Vec<&dyn ToSql> = vec![&now];

        if let Some(title) = &update.title {
            sets.push("title = ?");
            values.push(title);
        }
        if let Some(body) = &update.body {
            sets.push("body = ?");
            values.push(body);
        }
        if let Some(time) = &update.schedule_time {
            sets.push("schedule_time = ?");
            values.push(time);
        }
        if let Some(active) = &update.is_active {
            sets.push("is_active = ?");
            values.push(active);
        }
        if let Some(order) = &update.sort_order {
            sets.push("sort_order = ?");
            values.push(order);
        }

        let sql = format!("UPDATE custom_reminders SET {} WHERE id = ?", sets.join(", "));
        let id_owned = id.to_string();
        values.push(&id_owned);
        let changed = conn.execute(&sql, &values[..])?;
        Ok(changed == 1)
    }

    /// Delete a reminder. Returns false if the id is unknown.
    pub fn delete_reminder(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM custom_reminders WHERE id = ?1", [id])?;
        Ok(changed == 1)
    }

    // ─── Notification logs ──────────────────────────────────────

    /// Idempotent bulk enqueue. Inserts each entry unless its dedupe key
    /// already exists, and returns exactly the rows that were newly
    /// inserted — a colliding key is a silent no-op, not an error.
    pub fn enqueue_logs(&self, entries: &[NewLogEntry]) -> Result<Vec<QueuedLog>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        let mut queued = Vec::new();
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO notification_logs
                 (user_id, source_type, category, title, body, status, error_message,
                  scheduled_time, dedupe_key, metadata, created_at, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for entry in entries {
                let changed = stmt.execute(params![
                    entry.user_id,
                    entry.source_type,
                    entry.category,
                    entry.title,
                    entry.body,
                    entry.status.as_str(),
                    entry.error_message,
                    entry.scheduled_time,
                    entry.dedupe_key,
                    entry.metadata.to_string(),
                    now,
                    entry.sent_at,
                ])?;
                if changed == 1 {
                    queued.push(QueuedLog {
                        id: tx.last_insert_rowid(),
                        dedupe_key: entry.dedupe_key.clone(),
                    });
                }
            }
        }
        tx.commit()?;
        Ok(queued)
    }

    /// Insert one log row directly (manual sends carry their terminal
    /// status at insert time).
    pub fn insert_log(&self, entry: &NewLogEntry) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO notification_logs
             (user_id, source_type, category, title, body, status, error_message,
              scheduled_time, dedupe_key, metadata, created_at, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                entry.user_id,
                entry.source_type,
                entry.category,
                entry.title,
                entry.body,
                entry.status.as_str(),
                entry.error_message,
                entry.scheduled_time,
                entry.dedupe_key,
                entry.metadata.to_string(),
                Utc::now().to_rfc3339(),
                entry.sent_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Mark a queued row delivered. Dedupe key and scheduled time are
    /// never touched.
    pub fn mark_log_sent(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE notification_logs
             SET status = 'sent', sent_at = ?1, error_message = NULL
             WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    /// Mark a queued row failed with the transport's error text.
    pub fn mark_log_failed(&self, id: i64, error: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE notification_logs SET status = 'failed', error_message = ?1 WHERE id = ?2",
            params![error, id],
        )?;
        Ok(())
    }

    /// Fetch one log entry by id.
    pub fn get_log(&self, id: i64) -> Result<Option<LogEntry>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {LOG_COLS} FROM notification_logs WHERE id = ?1"),
            [id],
            map_log,
        )
        .map(Some)
        .or_else(ignore_no_rows)
    }

    /// Recent log entries for the viewer, optionally filtered.
    pub fn recent_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;
        let mut sql = format!("SELECT {LOG_COLS} FROM notification_logs");
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        let status = filter.status.map(|s| s.as_str().to_string());
        if let Some(status) = &status {
            clauses.push("status = ?");
            values.push(status);
        }
        if let Some(source) = &filter.source_type {
            clauses.push("source_type = ?");
            values.push(source);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id DESC LIMIT ?");
        let limit = filter.limit.unwrap_or(200).clamp(1, 2000);
        values.push(&limit);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(&values[..], map_log)?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    // ─── Cron job runs ──────────────────────────────────────

    /// Append one run summary row.
    pub fn insert_cron_run(&self, run: &NewCronRun) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO cron_job_runs
             (job_name, status, processed_count, sent_count, failed_count, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run.job_name,
                run.status.as_str(),
                run.processed_count,
                run.sent_count,
                run.failed_count,
                run.note,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Recent run rows, newest first.
    pub fn recent_runs(&self, limit: i64) -> Result<Vec<CronRun>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, job_name, status, processed_count, sent_count, failed_count, note, created_at
             FROM cron_job_runs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], |row| {
            Ok(CronRun {
                id: row.get(0)?,
                job_name: row.get(1)?,
                status: run_status_from(&row.get::<_, String>(2)?),
                processed_count: row.get(3)?,
                sent_count: row.get(4)?,
                failed_count: row.get(5)?,
                note: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    // ─── Admins ──────────────────────────────────────

    /// Insert a console admin (credentials already hashed by the caller).
    pub fn insert_admin(&self, admin: &Admin) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO admins (id, email, full_name, password_salt, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                admin.id,
                admin.email,
                admin.full_name,
                admin.password_salt,
                admin.password_hash,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Look up an admin by email.
    pub fn find_admin(&self, email: &str) -> Result<Option<Admin>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, email, full_name, password_salt, password_hash, last_login_at
             FROM admins WHERE email = ?1",
            [email],
            |row| {
                Ok(Admin {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    full_name: row.get(2)?,
                    password_salt: row.get(3)?,
                    password_hash: row.get(4)?,
                    last_login_at: row.get(5)?,
                })
            },
        )
        .map(Some)
        .or_else(ignore_no_rows)
    }

    /// Record a successful login.
    pub fn touch_admin_login(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE admins SET last_login_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }
}

const SCHEDULE_COLS: &str = "id, user_id, city_name, is_subuh, is_dzuhur, is_ashar, is_maghrib, \
     is_isya, subuh_time, dzuhur_time, ashar_time, maghrib_time, isya_time, created_at";

const LOG_COLS: &str = "id, user_id, source_type, category, title, body, status, error_message, \
     scheduled_time, dedupe_key, metadata, created_at, sent_at";

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        device_id: row.get(3)?,
        device_name: row.get(4)?,
        token_firebase: row.get(5)?,
        is_reminder: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_schedule(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduleRow> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        city_name: row.get(2)?,
        is_subuh: row.get(3)?,
        is_dzuhur: row.get(4)?,
        is_ashar: row.get(5)?,
        is_maghrib: row.get(6)?,
        is_isya: row.get(7)?,
        subuh_time: row.get(8)?,
        dzuhur_time: row.get(9)?,
        ashar_time: row.get(10)?,
        maghrib_time: row.get(11)?,
        isya_time: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn map_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<CustomReminder> {
    Ok(CustomReminder {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        schedule_time: row.get(3)?,
        is_active: row.get(4)?,
        sort_order: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogEntry> {
    let metadata: String = row.get(10)?;
    Ok(LogEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        source_type: row.get(2)?,
        category: row.get(3)?,
        title: row.get(4)?,
        body: row.get(5)?,
        status: log_status_from(&row.get::<_, String>(6)?),
        error_message: row.get(7)?,
        scheduled_time: row.get(8)?,
        dedupe_key: row.get(9)?,
        metadata: serde_json::from_str(&metadata).unwrap_or_default(),
        created_at: row.get(11)?,
        sent_at: row.get(12)?,
    })
}

fn log_status_from(value: &str) -> LogStatus {
    match value {
        "sent" => LogStatus::Sent,
        "failed" => LogStatus::Failed,
        _ => LogStatus::Queued,
    }
}

fn run_status_from(value: &str) -> RunStatus {
    match value {
        "partial" => RunStatus::Partial,
        "failed" => RunStatus::Failed,
        _ => RunStatus::Success,
    }
}

fn ignore_no_rows<T>(err: rusqlite::Error) -> std::result::Result<Option<T>, StoreError> {
    match err {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(StoreError::Db(other)),
    }
}
