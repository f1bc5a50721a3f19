//! Router-level tests with an in-memory store and a fake transport.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use adzan_core::AppConfig;
use adzan_push::{PushError, PushMessage, PushTransport};
use adzan_store::{Admin, Store};

use crate::server::{AppState, build_router};
use crate::session;

struct FakePush;

#[async_trait]
impl PushTransport for FakePush {
    async fn send(&self, _token: &str, _message: &PushMessage) -> Result<(), PushError> {
        Ok(())
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.admin.session_secret = "test-session-secret".into();
    config.cron.secret = "test-cron-secret".into();
    config
}

fn router_with(store: Arc<Store>) -> Router {
    build_router(AppState {
        config: test_config(),
        store,
        push: Arc::new(FakePush),
        start_time: std::time::Instant::now(),
    })
}

fn seed_admin(store: &Store) {
    let salt = session::new_salt();
    let hash = session::hash_password(&salt, "rahasia-123");
    store
        .insert_admin(&Admin {
            id: "admin-1".into(),
            email: "staff@example.com".into(),
            full_name: Some("Staff".into()),
            password_salt: salt,
            password_hash: hash,
            last_login_at: None,
        })
        .unwrap();
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = router_with(Arc::new(Store::open_in_memory().unwrap()));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_secs"].is_number());
}

#[tokio::test]
async fn test_console_routes_require_session() {
    let app = router_with(Arc::new(Store::open_in_memory().unwrap()));
    let response = app
        .oneshot(Request::get("/api/users").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_cookie_and_opens_console() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    seed_admin(&store);

    let login = router_with(store.clone())
        .oneshot(json_post(
            "/api/auth/login",
            serde_json::json!({"email": "staff@example.com", "password": "rahasia-123"}),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = login
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let body = body_json(login).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["admin"]["email"], "staff@example.com");

    // last_login_at is stamped on success.
    let admin = store.find_admin("staff@example.com").unwrap().unwrap();
    assert!(admin.last_login_at.is_some());

    let users = router_with(store)
        .oneshot(
            Request::get("/api/users")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(users.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    seed_admin(&store);

    let response = router_with(store)
        .oneshot(json_post(
            "/api/auth/login",
            serde_json::json!({"email": "staff@example.com", "password": "salah"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_device_registration_is_public() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let response = router_with(store.clone())
        .oneshot(json_post(
            "/api/devices",
            serde_json::json!({"token": "fcm-token-0123456789", "device_name": "Pixel"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(store.list_users(10).unwrap().len(), 1);

    // Too-short tokens are rejected up front.
    let rejected = router_with(store)
        .oneshot(json_post(
            "/api/devices",
            serde_json::json!({"token": "short"}),
        ))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cron_route_accepts_shared_secret() {
    let store = Arc::new(Store::open_in_memory().unwrap());

    // No secret, no session: rejected.
    let rejected = router_with(store.clone())
        .oneshot(
            Request::post("/api/cron/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

    let response = router_with(store.clone())
        .oneshot(
            Request::post("/api/cron/run")
                .header("x-cron-secret", "test-cron-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    // Empty database: both jobs short-circuited but were recorded.
    assert_eq!(store.recent_runs(10).unwrap().len(), 2);

    // The query-string form works too.
    let via_query = router_with(store)
        .oneshot(
            Request::post("/api/cron/adzan?secret=test-cron-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(via_query.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_schedule_update_validates_hhmm() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    seed_admin(&store);
    let cookie = login_cookie(&store).await;

    store
        .upsert_device(&adzan_store::DeviceRegistration {
            user_id: None,
            token: "fcm-token-0123456789".into(),
            device_id: None,
            device_name: None,
            is_reminder: Some(true),
        })
        .unwrap();
    let schedule_id = store.list_schedules(10).unwrap()[0].id;

    let bad = router_with(store.clone())
        .oneshot(
            Request::patch(format!("/api/adzan-schedules/{schedule_id}"))
                .header(header::COOKIE, cookie.clone())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"dzuhur_time": "25:99"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let good = router_with(store.clone())
        .oneshot(
            Request::patch(format!("/api/adzan-schedules/{schedule_id}"))
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"is_dzuhur": true, "dzuhur_time": "12:00"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(good.status(), StatusCode::OK);
    assert_eq!(store.due_schedules("12:00").unwrap().len(), 1);
}

#[tokio::test]
async fn test_manual_broadcast_logs_per_recipient() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    seed_admin(&store);
    let cookie = login_cookie(&store).await;

    for token in ["fcm-token-aaaaaaaaaaaa", "fcm-token-bbbbbbbbbbbb"] {
        store
            .upsert_device(&adzan_store::DeviceRegistration {
                user_id: None,
                token: token.into(),
                device_id: None,
                device_name: None,
                is_reminder: Some(true),
            })
            .unwrap();
    }

    let response = router_with(store.clone())
        .oneshot(
            Request::post("/api/notifications")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "title": "Waktu Adzan Maghrib",
                        "body": "Sudah masuk waktu Maghrib di Bandung.",
                        "prayer_name": "Maghrib",
                        "city": "Bandung",
                        "timezone": "Asia/Jakarta",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["sent"], 2);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["targeted"], 2);

    let logs = store
        .recent_logs(&adzan_store::LogFilter {
            source_type: Some("manual".into()),
            ..adzan_store::LogFilter::default()
        })
        .unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.status == adzan_store::LogStatus::Sent));
    assert!(logs.iter().all(|l| l.category == "maghrib"));
    assert_eq!(logs[0].metadata["trigger_by"], "staff@example.com");
}

async fn login_cookie(store: &Arc<Store>) -> String {
    let response = router_with(store.clone())
        .oneshot(json_post(
            "/api/auth/login",
            serde_json::json!({"email": "staff@example.com", "password": "rahasia-123"}),
        ))
        .await
        .unwrap();
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}
