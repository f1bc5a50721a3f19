//! API route handlers for the admin console.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::SET_COOKIE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use adzan_core::{is_adzan_prayer_name, valid_hhmm};
use adzan_jobs::{JobContext, JobError, JobSummary};
use adzan_push::PushMessage;
use adzan_store::{
    DeviceRegistration, LogFilter, LogStatus, NewLogEntry, NewReminder, ReminderUpdate,
    ScheduleUpdate, StoreError, UserUpdate,
};

use super::server::{AppState, session_from_headers};
use crate::session::{self, SESSION_COOKIE};

fn ok(value: serde_json::Value) -> Response {
    Json(value).into_response()
}

fn fail(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({"ok": false, "error": error.into()})),
    )
        .into_response()
}

fn store_err(e: StoreError) -> Response {
    fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

// ─── Health ───────────────────────────────────────────────

/// Health check endpoint (public).
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "adzan-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

// ─── Auth ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Log an admin in and set the signed session cookie.
pub async fn auth_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Response {
    if state.config.admin.session_secret.is_empty() {
        return fail(
            StatusCode::INTERNAL_SERVER_ERROR,
            "admin.session_secret is not configured",
        );
    }

    let admin = match state.store.find_admin(payload.email.trim()) {
        Ok(Some(admin)) => admin,
        Ok(None) => return fail(StatusCode::UNAUTHORIZED, "Email atau password salah."),
        Err(e) => return store_err(e),
    };
    if !session::verify_password(&admin.password_salt, &admin.password_hash, &payload.password) {
        return fail(StatusCode::UNAUTHORIZED, "Email atau password salah.");
    }
    if let Err(e) = state.store.touch_admin_login(&admin.id) {
        return store_err(e);
    }

    let ttl = state.config.admin.session_ttl_secs;
    let token = session::issue(
        &state.config.admin.session_secret,
        &admin.id,
        &admin.email,
        ttl,
    );
    let cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl}");
    tracing::info!("🔑 Admin {} logged in", admin.email);

    (
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({
            "ok": true,
            "admin": {"id": admin.id, "email": admin.email, "full_name": admin.full_name},
        })),
    )
        .into_response()
}

/// Clear the session cookie.
pub async fn auth_logout() -> Response {
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    (
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({"ok": true})),
    )
        .into_response()
}

/// Who am I — echoes the verified session.
pub async fn auth_me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match session_from_headers(&state, &headers) {
        Some(session) => ok(serde_json::json!({
            "ok": true,
            "admin": {"id": session.admin_id, "email": session.email},
        })),
        None => fail(StatusCode::UNAUTHORIZED, "Unauthorized"),
    }
}

// ─── Users & devices ──────────────────────────────────────

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Response {
    match state.store.list_users(query.limit.unwrap_or(100)) {
        Ok(users) => ok(serde_json::json!({"ok": true, "data": users})),
        Err(e) => store_err(e),
    }
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Response {
    match state.store.update_user(&id, &update) {
        Ok(true) => ok(serde_json::json!({"ok": true})),
        Ok(false) => fail(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => store_err(e),
    }
}

/// Device token registration from the mobile app (public).
pub async fn register_device(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<DeviceRegistration>,
) -> Response {
    if registration.token.len() < 16 {
        return fail(StatusCode::BAD_REQUEST, "token is too short");
    }
    match state.store.upsert_device(&registration) {
        Ok(user_id) => ok(serde_json::json!({"ok": true, "user_id": user_id})),
        Err(e) => store_err(e),
    }
}

// ─── Adzan schedules ──────────────────────────────────────

pub async fn list_schedules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Response {
    match state.store.list_schedules(query.limit.unwrap_or(100)) {
        Ok(rows) => ok(serde_json::json!({"ok": true, "data": rows})),
        Err(e) => store_err(e),
    }
}

pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<ScheduleUpdate>,
) -> Response {
    let times = [
        &update.subuh_time,
        &update.dzuhur_time,
        &update.ashar_time,
        &update.maghrib_time,
        &update.isya_time,
    ];
    for time in times.into_iter().flatten().flatten() {
        if !valid_hhmm(time) {
            return fail(StatusCode::BAD_REQUEST, "prayer times must be HH:MM");
        }
    }

    match state.store.update_schedule(id, &update) {
        Ok(true) => ok(serde_json::json!({"ok": true})),
        Ok(false) => fail(StatusCode::NOT_FOUND, "Schedule not found"),
        Err(e) => store_err(e),
    }
}

// ─── Custom reminders ─────────────────────────────────────

pub async fn list_reminders(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_reminders() {
        Ok(rows) => ok(serde_json::json!({"ok": true, "data": rows})),
        Err(e) => store_err(e),
    }
}

pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Json(reminder): Json<NewReminder>,
) -> Response {
    if reminder.title.trim().is_empty() || reminder.body.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "title and body are required");
    }
    if !valid_hhmm(&reminder.schedule_time) {
        return fail(StatusCode::BAD_REQUEST, "schedule_time must be HH:MM");
    }
    match state.store.create_reminder(&reminder) {
        Ok(id) => ok(serde_json::json!({"ok": true, "id": id})),
        Err(e) => store_err(e),
    }
}

pub async fn update_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<ReminderUpdate>,
) -> Response {
    if let Some(time) = &update.schedule_time
        && !valid_hhmm(time)
    {
        return fail(StatusCode::BAD_REQUEST, "schedule_time must be HH:MM");
    }
    match state.store.update_reminder(&id, &update) {
        Ok(true) => ok(serde_json::json!({"ok": true})),
        Ok(false) => fail(StatusCode::NOT_FOUND, "Reminder not found"),
        Err(e) => store_err(e),
    }
}

pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store.delete_reminder(&id) {
        Ok(true) => ok(serde_json::json!({"ok": true})),
        Ok(false) => fail(StatusCode::NOT_FOUND, "Reminder not found"),
        Err(e) => store_err(e),
    }
}

// ─── Logs & runs ──────────────────────────────────────────

pub async fn list_notification_logs(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<LogFilter>,
) -> Response {
    match state.store.recent_logs(&filter) {
        Ok(rows) => ok(serde_json::json!({"ok": true, "data": rows})),
        Err(e) => store_err(e),
    }
}

pub async fn list_cron_runs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Response {
    match state.store.recent_runs(query.limit.unwrap_or(50)) {
        Ok(rows) => ok(serde_json::json!({"ok": true, "data": rows})),
        Err(e) => store_err(e),
    }
}

// ─── Manual broadcast ─────────────────────────────────────

#[derive(Deserialize)]
pub struct NotifyPayload {
    pub title: String,
    pub body: String,
    pub prayer_name: String,
    pub city: String,
    pub timezone: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Send a one-off notification to every user with a token, logging one
/// `manual` row per recipient with its outcome.
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<NotifyPayload>,
) -> Response {
    let Some(admin) = session_from_headers(&state, &headers) else {
        return fail(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let recipients = match state.store.broadcast_recipients() {
        Ok(recipients) => recipients,
        Err(e) => return store_err(e),
    };
    if recipients.is_empty() {
        return ok(serde_json::json!({
            "ok": true,
            "sent": 0,
            "failed": 0,
            "targeted": 0,
            "warning": "Tidak ada user dengan token_firebase aktif.",
        }));
    }

    let mut builder = PushMessage::builder(&payload.title, &payload.body)
        .data("type", "manual")
        .data("prayer_name", &payload.prayer_name)
        .data("city", &payload.city)
        .data("timezone", &payload.timezone)
        .data_map(payload.data.clone());
    if is_adzan_prayer_name(&payload.prayer_name) {
        builder = builder
            .android_channel_id(state.config.adzan_sound.android_channel_id.as_str())
            .android_sound(state.config.adzan_sound.android_sound.as_str())
            .apns_sound(state.config.adzan_sound.apns_sound.as_str());
    }
    let message = match builder.build() {
        Ok(message) => message,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let token_to_user: HashMap<&str, &str> = recipients
        .iter()
        .map(|(user_id, token)| (token.as_str(), user_id.as_str()))
        .collect();
    let tokens: Vec<String> = recipients.iter().map(|(_, token)| token.clone()).collect();

    let outcome = adzan_push::broadcast(state.push.as_ref(), &tokens, &message).await;
    tracing::info!(
        "📣 Manual broadcast by {}: {} sent, {} failed",
        admin.email,
        outcome.sent,
        outcome.failed
    );

    let now = chrono::Utc::now().to_rfc3339();
    for result in &outcome.results {
        let Some(user_id) = token_to_user.get(result.token.as_str()) else {
            continue;
        };
        let entry = NewLogEntry {
            user_id: Some((*user_id).to_string()),
            source_type: "manual".into(),
            category: payload.prayer_name.trim().to_lowercase(),
            title: payload.title.clone(),
            body: payload.body.clone(),
            status: if result.ok {
                LogStatus::Sent
            } else {
                LogStatus::Failed
            },
            error_message: result.error.clone(),
            scheduled_time: None,
            dedupe_key: format!("manual:{}", uuid::Uuid::new_v4()),
            metadata: serde_json::json!({
                "city": payload.city,
                "timezone": payload.timezone,
                "trigger_by": admin.email,
                "custom_data": payload.data,
            }),
            sent_at: result.ok.then(|| now.clone()),
        };
        // The push already happened; a bookkeeping failure must not undo it.
        if let Err(e) = state.store.insert_log(&entry) {
            tracing::warn!("⚠️ Failed to record manual log row: {e}");
        }
    }

    ok(serde_json::json!({
        "ok": true,
        "sent": outcome.sent,
        "failed": outcome.failed,
        "targeted": recipients.len(),
    }))
}

// ─── Cron triggers ────────────────────────────────────────

fn job_context(state: &AppState) -> JobContext<'_> {
    JobContext {
        store: &state.store,
        push: state.push.as_ref(),
        config: &state.config,
    }
}

fn summary_json(result: &Result<JobSummary, JobError>) -> serde_json::Value {
    match result {
        Ok(summary) => serde_json::to_value(summary).unwrap_or_default(),
        Err(e) => serde_json::json!({"error": e.to_string()}),
    }
}

/// Run both jobs for the current minute.
pub async fn cron_run_all(State(state): State<Arc<AppState>>) -> Response {
    let combined = adzan_jobs::run_all(&job_context(&state)).await;
    let totals = combined.totals();
    let status = if combined.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(serde_json::json!({
            "ok": combined.is_ok(),
            "run_every": "1 minute",
            "adzan": summary_json(&combined.adzan),
            "reminder": summary_json(&combined.reminder),
            "total": totals,
        })),
    )
        .into_response()
}

pub async fn cron_run_adzan(State(state): State<Arc<AppState>>) -> Response {
    match adzan_jobs::run_adzan_job(&job_context(&state)).await {
        Ok(summary) => ok(serde_json::json!({"ok": true, "summary": summary})),
        Err(e) => fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub async fn cron_run_reminders(State(state): State<Arc<AppState>>) -> Response {
    match adzan_jobs::run_reminder_job(&job_context(&state)).await {
        Ok(summary) => ok(serde_json::json!({"ok": true, "summary": summary})),
        Err(e) => fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
