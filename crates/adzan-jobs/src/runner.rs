//! The two concrete jobs and the combined runner.
//!
//! Each job is one sequential pass over this minute's candidates. The
//! enqueue step owns idempotency: only rows this invocation actually
//! inserted get dispatched, so a duplicate trigger in the same minute
//! sends nothing.

use std::collections::{BTreeMap, HashMap};

use adzan_core::AppConfig;
use adzan_push::{PushError, PushMessage, PushTransport};
use adzan_store::{NewCronRun, NewLogEntry, LogStatus, QueuedLog, RunStatus, Store};

use crate::clock::{self, NowParts};
use crate::matcher;
use crate::summary::{CombinedRun, JobError, JobSummary};

/// Everything a job needs, constructed once by the caller and passed by
/// reference; jobs read no ambient state.
pub struct JobContext<'a> {
    pub store: &'a Store,
    pub push: &'a dyn PushTransport,
    pub config: &'a AppConfig,
}

/// One resolved (recipient, occasion) candidate, keyed by its dedupe key.
struct Prepared {
    dedupe_key: String,
    user_id: String,
    token: String,
    title: String,
    body: String,
    data: BTreeMap<String, String>,
    /// Adzan sends carry the configured channel/sound hints.
    adzan_sound: bool,
}

impl Prepared {
    fn build_message(&self, config: &AppConfig) -> Result<PushMessage, PushError> {
        let mut builder = PushMessage::builder(self.title.as_str(), self.body.as_str())
            .data_map(self.data.clone());
        if self.adzan_sound {
            builder = builder
                .android_channel_id(config.adzan_sound.android_channel_id.as_str())
                .android_sound(config.adzan_sound.android_sound.as_str())
                .apns_sound(config.adzan_sound.apns_sound.as_str());
        }
        builder.build()
    }
}

/// Run the prayer-time job for the current minute.
pub async fn run_adzan_job(ctx: &JobContext<'_>) -> Result<JobSummary, JobError> {
    let tz = ctx.config.tz()?;
    run_adzan_at(ctx, &clock::now_parts(tz)).await
}

/// Run the custom-reminder job for the current minute.
pub async fn run_reminder_job(ctx: &JobContext<'_>) -> Result<JobSummary, JobError> {
    let tz = ctx.config.tz()?;
    run_reminder_at(ctx, &clock::now_parts(tz)).await
}

/// Run both jobs unconditionally and report both outcomes. An adzan
/// failure never skips the reminder job; totals aggregate whatever
/// completed.
pub async fn run_all(ctx: &JobContext<'_>) -> CombinedRun {
    let adzan = run_adzan_job(ctx).await;
    if let Err(e) = &adzan {
        tracing::warn!("⚠️ adzan job failed: {e}");
    }
    let reminder = run_reminder_job(ctx).await;
    if let Err(e) = &reminder {
        tracing::warn!("⚠️ reminder job failed: {e}");
    }
    CombinedRun { adzan, reminder }
}

pub(crate) async fn run_adzan_at(
    ctx: &JobContext<'_>,
    parts: &NowParts,
) -> Result<JobSummary, JobError> {
    let rows = ctx.store.due_schedules(&parts.hhmm)?;
    if rows.is_empty() {
        ctx.store.insert_cron_run(&NewCronRun {
            job_name: "adzan".into(),
            status: RunStatus::Success,
            processed_count: 0,
            sent_count: 0,
            failed_count: 0,
            note: Some(format!("No schedule for {}", parts.hhmm)),
        })?;
        return Ok(short_circuit(ctx, "adzan", parts, 0, "No schedule"));
    }

    // Distinct user ids in row order, then their usable tokens.
    let mut user_ids: Vec<String> = Vec::new();
    for row in &rows {
        if let Some(id) = &row.user_id
            && !user_ids.contains(id)
        {
            user_ids.push(id.clone());
        }
    }
    let tokens: HashMap<String, String> =
        ctx.store.users_with_tokens(&user_ids)?.into_iter().collect();

    let mut prepared: Vec<Prepared> = Vec::new();
    for row in &rows {
        let Some(user_id) = &row.user_id else { continue };
        let Some(token) = tokens.get(user_id) else {
            continue;
        };
        let Some(occasion) = matcher::pick_prayer(row, &parts.hhmm) else {
            continue;
        };

        let city = row.city_name.clone().unwrap_or_else(|| "kota Anda".into());
        let mut data = BTreeMap::new();
        data.insert("type".into(), "adzan".into());
        data.insert("prayer_key".into(), occasion.key().into());
        data.insert("city".into(), city.clone());
        data.insert("scheduled_time".into(), parts.hhmm.clone());

        prepared.push(Prepared {
            dedupe_key: format!(
                "adzan:{}:{}:{}:{}",
                parts.date,
                parts.hhmm,
                user_id,
                occasion.key()
            ),
            user_id: user_id.clone(),
            token: token.clone(),
            title: format!("Waktu Adzan {}", occasion.label()),
            body: format!(
                "Sudah masuk waktu {} di {}. Yuk tunaikan sholat.",
                occasion.label(),
                city
            ),
            data,
            adzan_sound: true,
        });
    }

    if prepared.is_empty() {
        ctx.store.insert_cron_run(&NewCronRun {
            job_name: "adzan".into(),
            status: RunStatus::Success,
            processed_count: rows.len() as i64,
            sent_count: 0,
            failed_count: 0,
            note: Some(format!("No eligible tokens for {}", parts.hhmm)),
        })?;
        return Ok(short_circuit(
            ctx,
            "adzan",
            parts,
            rows.len() as u64,
            "No eligible users",
        ));
    }

    let entries: Vec<NewLogEntry> = prepared
        .iter()
        .map(|p| {
            let prayer_key = p.data.get("prayer_key").cloned().unwrap_or_default();
            let city = p.data.get("city").cloned().unwrap_or_default();
            NewLogEntry {
                user_id: Some(p.user_id.clone()),
                source_type: "adzan".into(),
                category: prayer_key.clone(),
                title: p.title.clone(),
                body: p.body.clone(),
                status: LogStatus::Queued,
                error_message: None,
                scheduled_time: Some(parts.hhmm.clone()),
                dedupe_key: p.dedupe_key.clone(),
                metadata: serde_json::json!({
                    "prayer_key": prayer_key,
                    "city": city,
                    "date": parts.date,
                    "time": parts.hhmm,
                }),
                sent_at: None,
            }
        })
        .collect();

    let queued = ctx.store.enqueue_logs(&entries)?;
    tracing::info!(
        "🕌 adzan {}: {} candidates, {} newly queued",
        parts.hhmm,
        prepared.len(),
        queued.len()
    );

    let (sent, failed) = dispatch_queued(ctx, &queued, &prepared).await?;
    record_and_summarize(ctx, "adzan", parts, queued.len() as u64, sent, failed)
}

pub(crate) async fn run_reminder_at(
    ctx: &JobContext<'_>,
    parts: &NowParts,
) -> Result<JobSummary, JobError> {
    let reminders = ctx.store.due_reminders(&parts.hhmm)?;
    if reminders.is_empty() {
        ctx.store.insert_cron_run(&NewCronRun {
            job_name: "reminder".into(),
            status: RunStatus::Success,
            processed_count: 0,
            sent_count: 0,
            failed_count: 0,
            note: Some(format!("No active reminder at {}", parts.hhmm)),
        })?;
        return Ok(short_circuit(ctx, "reminder", parts, 0, "No reminder"));
    }

    let recipients = ctx.store.reminder_recipients()?;
    if recipients.is_empty() {
        ctx.store.insert_cron_run(&NewCronRun {
            job_name: "reminder".into(),
            status: RunStatus::Success,
            processed_count: reminders.len() as i64,
            sent_count: 0,
            failed_count: 0,
            note: Some("No users with active reminder token".into()),
        })?;
        return Ok(short_circuit(
            ctx,
            "reminder",
            parts,
            reminders.len() as u64,
            "No reminder recipients",
        ));
    }

    // Every due reminder goes to every opted-in recipient.
    let mut prepared: Vec<Prepared> = Vec::new();
    for reminder in &reminders {
        for (user_id, token) in &recipients {
            let mut data = BTreeMap::new();
            data.insert("type".into(), "reminder".into());
            data.insert("reminder_id".into(), reminder.id.clone());
            data.insert("scheduled_time".into(), parts.hhmm.clone());

            prepared.push(Prepared {
                dedupe_key: format!(
                    "reminder:{}:{}:{}:{}",
                    parts.date, parts.hhmm, reminder.id, user_id
                ),
                user_id: user_id.clone(),
                token: token.clone(),
                title: reminder.title.clone(),
                body: reminder.body.clone(),
                data,
                adzan_sound: false,
            });
        }
    }

    let entries: Vec<NewLogEntry> = prepared
        .iter()
        .map(|p| NewLogEntry {
            user_id: Some(p.user_id.clone()),
            source_type: "reminder".into(),
            category: "custom_reminder".into(),
            title: p.title.clone(),
            body: p.body.clone(),
            status: LogStatus::Queued,
            error_message: None,
            scheduled_time: Some(parts.hhmm.clone()),
            dedupe_key: p.dedupe_key.clone(),
            metadata: serde_json::json!({
                "reminder_id": p.data.get("reminder_id"),
                "date": parts.date,
                "time": parts.hhmm,
            }),
            sent_at: None,
        })
        .collect();

    let queued = ctx.store.enqueue_logs(&entries)?;
    tracing::info!(
        "⏰ reminder {}: {} reminders × {} recipients, {} newly queued",
        parts.hhmm,
        reminders.len(),
        recipients.len(),
        queued.len()
    );

    let (sent, failed) = dispatch_queued(ctx, &queued, &prepared).await?;
    record_and_summarize(ctx, "reminder", parts, queued.len() as u64, sent, failed)
}

/// Send each newly queued row, one recipient at a time, in queue order.
/// Transport failures are written back to the row and counted; they never
/// abort the batch. Store failures do abort — the run row must not mask
/// them.
async fn dispatch_queued(
    ctx: &JobContext<'_>,
    queued: &[QueuedLog],
    prepared: &[Prepared],
) -> Result<(u64, u64), JobError> {
    let mut sent = 0;
    let mut failed = 0;
    for row in queued {
        let Some(payload) = prepared.iter().find(|p| p.dedupe_key == row.dedupe_key) else {
            continue;
        };
        let message = match payload.build_message(ctx.config) {
            Ok(message) => message,
            Err(e) => {
                ctx.store.mark_log_failed(row.id, &e.to_string())?;
                failed += 1;
                continue;
            }
        };
        match ctx.push.send(&payload.token, &message).await {
            Ok(()) => {
                ctx.store.mark_log_sent(row.id)?;
                sent += 1;
            }
            Err(e) => {
                tracing::warn!("⚠️ push to user {} failed: {e}", payload.user_id);
                ctx.store.mark_log_failed(row.id, &e.to_string())?;
                failed += 1;
            }
        }
    }
    Ok((sent, failed))
}

fn record_and_summarize(
    ctx: &JobContext<'_>,
    job: &'static str,
    parts: &NowParts,
    processed: u64,
    sent: u64,
    failed: u64,
) -> Result<JobSummary, JobError> {
    let status = if failed > 0 {
        RunStatus::Partial
    } else {
        RunStatus::Success
    };
    ctx.store.insert_cron_run(&NewCronRun {
        job_name: job.into(),
        status,
        processed_count: processed as i64,
        sent_count: sent as i64,
        failed_count: failed as i64,
        note: Some(format!("{} {}", parts.hhmm, ctx.config.time_zone)),
    })?;
    Ok(JobSummary {
        job,
        processed,
        sent,
        failed,
        time: parts.hhmm.clone(),
        time_zone: ctx.config.time_zone.clone(),
        message: None,
    })
}

fn short_circuit(
    ctx: &JobContext<'_>,
    job: &'static str,
    parts: &NowParts,
    processed: u64,
    message: &str,
) -> JobSummary {
    JobSummary {
        job,
        processed,
        sent: 0,
        failed: 0,
        time: parts.hhmm.clone(),
        time_zone: ctx.config.time_zone.clone(),
        message: Some(message.into()),
    }
}
