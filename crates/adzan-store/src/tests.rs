//! Store integration tests against an in-memory database.

use crate::models::*;
use crate::store::Store;

fn store() -> Store {
    Store::open_in_memory().unwrap()
}

fn register(store: &Store, token: &str, is_reminder: bool) -> String {
    store
        .upsert_device(&DeviceRegistration {
            user_id: None,
            token: token.into(),
            device_id: None,
            device_name: None,
            is_reminder: Some(is_reminder),
        })
        .unwrap()
}

fn log_entry(key: &str, user: &str) -> NewLogEntry {
    NewLogEntry {
        user_id: Some(user.into()),
        source_type: "adzan".into(),
        category: "subuh".into(),
        title: "Waktu Adzan Subuh".into(),
        body: "Sudah masuk waktu Subuh.".into(),
        status: LogStatus::Queued,
        error_message: None,
        scheduled_time: Some("04:30".into()),
        dedupe_key: key.into(),
        metadata: serde_json::json!({"prayer_key": "subuh"}),
        sent_at: None,
    }
}

#[test]
fn test_device_registration_creates_user_and_schedule() {
    let store = store();
    let id = register(&store, "tok-1", true);

    let users = store.list_users(10).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, id);
    assert_eq!(users[0].token_firebase.as_deref(), Some("tok-1"));
    assert!(users[0].is_reminder);

    // A blank schedule row is created alongside the user.
    let schedules = store.list_schedules(10).unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].user_id.as_deref(), Some(id.as_str()));
    assert_eq!(schedules[0].is_subuh, None);
}

#[test]
fn test_device_registration_updates_existing_by_device_id() {
    let store = store();
    let first = store
        .upsert_device(&DeviceRegistration {
            user_id: None,
            token: "tok-old".into(),
            device_id: Some("device-a".into()),
            device_name: Some("Pixel".into()),
            is_reminder: None,
        })
        .unwrap();
    let second = store
        .upsert_device(&DeviceRegistration {
            user_id: None,
            token: "tok-new".into(),
            device_id: Some("device-a".into()),
            device_name: None,
            is_reminder: Some(false),
        })
        .unwrap();

    assert_eq!(first, second);
    let users = store.list_users(10).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].token_firebase.as_deref(), Some("tok-new"));
    assert!(!users[0].is_reminder);
}

#[test]
fn test_schedule_update_and_due_match() {
    let store = store();
    let user = register(&store, "tok-1", true);
    let schedule_id = store.list_schedules(10).unwrap()[0].id;

    store
        .update_schedule(
            schedule_id,
            &ScheduleUpdate {
                city_name: Some("Bandung".into()),
                is_subuh: Some(true),
                subuh_time: Some(Some("04:30".into())),
                is_dzuhur: Some(true),
                // enabled but no time configured: must never match
                dzuhur_time: Some(None),
                ..ScheduleUpdate::default()
            },
        )
        .unwrap();

    let due = store.due_schedules("04:30").unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].user_id.as_deref(), Some(user.as_str()));
    assert_eq!(due[0].city_name.as_deref(), Some("Bandung"));

    assert!(store.due_schedules("04:31").unwrap().is_empty());
    // dzuhur has a flag but a null time
    assert!(store.due_schedules("12:00").unwrap().is_empty());
}

#[test]
fn test_due_schedules_ignores_disabled_flag() {
    let store = store();
    register(&store, "tok-1", true);
    let schedule_id = store.list_schedules(10).unwrap()[0].id;

    store
        .update_schedule(
            schedule_id,
            &ScheduleUpdate {
                is_subuh: Some(false),
                subuh_time: Some(Some("04:30".into())),
                ..ScheduleUpdate::default()
            },
        )
        .unwrap();

    assert!(store.due_schedules("04:30").unwrap().is_empty());
}

#[test]
fn test_reminder_crud_and_due_ordering() {
    let store = store();
    let late = store
        .create_reminder(&NewReminder {
            title: "Dzikir pagi".into(),
            body: "Jangan lupa dzikir pagi.".into(),
            schedule_time: "05:30".into(),
            is_active: None,
            sort_order: Some(2),
        })
        .unwrap();
    let early = store
        .create_reminder(&NewReminder {
            title: "Baca Quran".into(),
            body: "Luangkan waktu membaca Quran.".into(),
            schedule_time: "05:30".into(),
            is_active: Some(true),
            sort_order: Some(1),
        })
        .unwrap();
    let inactive = store
        .create_reminder(&NewReminder {
            title: "Nonaktif".into(),
            body: "tidak terkirim".into(),
            schedule_time: "05:30".into(),
            is_active: Some(false),
            sort_order: Some(0),
        })
        .unwrap();

    let due = store.due_reminders("05:30").unwrap();
    assert_eq!(due.len(), 2);
    assert_eq!(due[0].id, early);
    assert_eq!(due[1].id, late);
    assert!(store.due_reminders("05:31").unwrap().is_empty());

    assert!(
        store
            .update_reminder(
                &inactive,
                &ReminderUpdate {
                    is_active: Some(true),
                    ..ReminderUpdate::default()
                },
            )
            .unwrap()
    );
    assert_eq!(store.due_reminders("05:30").unwrap().len(), 3);

    assert!(store.delete_reminder(&inactive).unwrap());
    assert!(!store.delete_reminder(&inactive).unwrap());
    assert_eq!(store.list_reminders().unwrap().len(), 2);
}

#[test]
fn test_enqueue_is_idempotent() {
    let store = store();
    let entries = vec![
        log_entry("adzan:2026-08-31:04:30:u1:subuh", "u1"),
        log_entry("adzan:2026-08-31:04:30:u2:subuh", "u2"),
    ];

    let first = store.enqueue_logs(&entries).unwrap();
    assert_eq!(first.len(), 2);

    // Same minute, second trigger: nothing new.
    let second = store.enqueue_logs(&entries).unwrap();
    assert!(second.is_empty());

    // A third trigger with one fresh key only inserts that one.
    let mut mixed = entries.clone();
    mixed.push(log_entry("adzan:2026-08-31:04:30:u3:subuh", "u3"));
    let third = store.enqueue_logs(&mixed).unwrap();
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].dedupe_key, "adzan:2026-08-31:04:30:u3:subuh");

    assert_eq!(store.recent_logs(&LogFilter::default()).unwrap().len(), 3);
}

#[test]
fn test_status_updates_keep_key_and_schedule() {
    let store = store();
    let queued = store
        .enqueue_logs(&[log_entry("adzan:2026-08-31:04:30:u1:subuh", "u1")])
        .unwrap();
    let id = queued[0].id;

    store.mark_log_sent(id).unwrap();
    let row = store.get_log(id).unwrap().unwrap();
    assert_eq!(row.status, LogStatus::Sent);
    assert!(row.sent_at.is_some());
    assert_eq!(row.error_message, None);
    assert_eq!(row.dedupe_key, "adzan:2026-08-31:04:30:u1:subuh");
    assert_eq!(row.scheduled_time.as_deref(), Some("04:30"));

    store.mark_log_failed(id, "UNREGISTERED").unwrap();
    let row = store.get_log(id).unwrap().unwrap();
    assert_eq!(row.status, LogStatus::Failed);
    assert_eq!(row.error_message.as_deref(), Some("UNREGISTERED"));
    assert_eq!(row.dedupe_key, "adzan:2026-08-31:04:30:u1:subuh");
}

#[test]
fn test_log_filters() {
    let store = store();
    let queued = store
        .enqueue_logs(&[
            log_entry("adzan:2026-08-31:04:30:u1:subuh", "u1"),
            log_entry("adzan:2026-08-31:04:30:u2:subuh", "u2"),
        ])
        .unwrap();
    store.mark_log_failed(queued[0].id, "boom").unwrap();

    let failed = store
        .recent_logs(&LogFilter {
            status: Some(LogStatus::Failed),
            ..LogFilter::default()
        })
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, queued[0].id);

    let manual = store
        .recent_logs(&LogFilter {
            source_type: Some("manual".into()),
            ..LogFilter::default()
        })
        .unwrap();
    assert!(manual.is_empty());
}

#[test]
fn test_recipient_queries_skip_empty_tokens() {
    let store = store();
    let with_token = register(&store, "tok-1", true);
    let opted_out = register(&store, "tok-2", false);
    let no_token = register(&store, "tok-3", true);
    store
        .update_user(
            &no_token,
            &UserUpdate {
                token_firebase: Some(Some(String::new())),
                ..UserUpdate::default()
            },
        )
        .unwrap();

    let reminder = store.reminder_recipients().unwrap();
    assert_eq!(reminder.len(), 1);
    assert_eq!(reminder[0].0, with_token);

    let broadcast = store.broadcast_recipients().unwrap();
    assert_eq!(broadcast.len(), 2);

    let by_id = store
        .users_with_tokens(&[with_token.clone(), opted_out.clone(), no_token])
        .unwrap();
    assert_eq!(by_id.len(), 2);
}

#[test]
fn test_cron_runs_append_only() {
    let store = store();
    store
        .insert_cron_run(&NewCronRun {
            job_name: "adzan".into(),
            status: RunStatus::Success,
            processed_count: 0,
            sent_count: 0,
            failed_count: 0,
            note: Some("No schedule for 04:31".into()),
        })
        .unwrap();
    store
        .insert_cron_run(&NewCronRun {
            job_name: "reminder".into(),
            status: RunStatus::Partial,
            processed_count: 3,
            sent_count: 2,
            failed_count: 1,
            note: None,
        })
        .unwrap();

    let runs = store.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].job_name, "reminder");
    assert_eq!(runs[0].status, RunStatus::Partial);
    assert_eq!(runs[1].status, RunStatus::Success);
}

#[test]
fn test_admin_lookup_and_login_touch() {
    let store = store();
    store
        .insert_admin(&Admin {
            id: "admin-1".into(),
            email: "staff@example.com".into(),
            full_name: Some("Staff".into()),
            password_salt: "salt".into(),
            password_hash: "hash".into(),
            last_login_at: None,
        })
        .unwrap();

    let found = store.find_admin("staff@example.com").unwrap().unwrap();
    assert_eq!(found.id, "admin-1");
    assert!(found.last_login_at.is_none());
    assert!(store.find_admin("nobody@example.com").unwrap().is_none());

    store.touch_admin_login("admin-1").unwrap();
    let found = store.find_admin("staff@example.com").unwrap().unwrap();
    assert!(found.last_login_at.is_some());
}
