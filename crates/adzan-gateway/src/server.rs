//! HTTP server implementation using Axum.

use axum::{
    Router,
    extract::State,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use adzan_core::AppConfig;
use adzan_push::PushTransport;
use adzan_store::Store;

use crate::session;

/// Shared state for the gateway server.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<Store>,
    /// Push boundary; the FCM client in production, a fake in tests.
    pub push: Arc<dyn PushTransport>,
    pub start_time: std::time::Instant,
}

/// Session cookie auth middleware for the console routes.
async fn require_session(
    State(state): State<Arc<AppState>>,
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    if session_from_request(&state, &req).is_some() {
        return next.run(req).await;
    }
    unauthorized()
}

/// Cron trigger auth — a valid admin session, or the shared cron secret
/// via `x-cron-secret` header, bearer token, or `?secret=` query.
async fn require_cron_access(
    State(state): State<Arc<AppState>>,
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    if session_from_request(&state, &req).is_some() {
        return next.run(req).await;
    }

    let expected = &state.config.cron.secret;
    if !expected.is_empty() {
        let cron_header = req
            .headers()
            .get("x-cron-secret")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let auth_header = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if cron_header == expected.as_str() {
            return next.run(req).await;
        }
        if auth_header.strip_prefix("Bearer ") == Some(expected.as_str()) {
            return next.run(req).await;
        }
        if let Some(query) = req.uri().query() {
            for pair in query.split('&') {
                if let Some(secret) = pair.strip_prefix("secret=")
                    && secret == expected.as_str()
                {
                    return next.run(req).await;
                }
            }
        }
    }

    unauthorized()
}

/// Resolve the admin session from the request's cookies, if any.
pub(crate) fn session_from_request(
    state: &AppState,
    req: &axum::http::Request<axum::body::Body>,
) -> Option<session::Session> {
    session_from_headers(state, req.headers())
}

pub(crate) fn session_from_headers(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Option<session::Session> {
    let secret = &state.config.admin.session_secret;
    if secret.is_empty() {
        return None;
    }
    let cookies = headers.get("cookie")?.to_str().ok()?;
    let token = session::token_from_cookies(cookies)?;
    session::verify(secret, token)
}

fn unauthorized() -> axum::response::Response {
    axum::response::Response::builder()
        .status(axum::http::StatusCode::UNAUTHORIZED)
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from(
            serde_json::json!({"ok": false, "error": "Unauthorized"}).to_string(),
        ))
        .unwrap()
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    // Console routes — require a valid admin session cookie
    let console = Router::new()
        .route("/api/auth/me", get(super::routes::auth_me))
        .route("/api/auth/logout", post(super::routes::auth_logout))
        .route("/api/users", get(super::routes::list_users))
        .route("/api/users/{id}", patch(super::routes::update_user))
        .route("/api/adzan-schedules", get(super::routes::list_schedules))
        .route(
            "/api/adzan-schedules/{id}",
            patch(super::routes::update_schedule),
        )
        .route(
            "/api/custom-reminders",
            get(super::routes::list_reminders).post(super::routes::create_reminder),
        )
        .route(
            "/api/custom-reminders/{id}",
            patch(super::routes::update_reminder)
                .delete(super::routes::delete_reminder),
        )
        .route(
            "/api/notification-logs",
            get(super::routes::list_notification_logs),
        )
        .route("/api/cron-runs", get(super::routes::list_cron_runs))
        .route("/api/notifications", post(super::routes::send_notification))
        .route_layer(axum::middleware::from_fn_with_state(
            shared.clone(),
            require_session,
        ));

    // Cron triggers — session or shared secret
    let cron = Router::new()
        .route("/api/cron/run", post(super::routes::cron_run_all))
        .route("/api/cron/adzan", post(super::routes::cron_run_adzan))
        .route("/api/cron/reminders", post(super::routes::cron_run_reminders))
        .route_layer(axum::middleware::from_fn_with_state(
            shared.clone(),
            require_cron_access,
        ));

    // Public routes — no auth
    let public = Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/auth/login", post(super::routes::auth_login))
        // Mobile devices register their push token here
        .route("/api/devices", post(super::routes::register_device));

    console
        .merge(cron)
        .merge(public)
        .layer(
            CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .allow_origin(Any)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(
    config: AppConfig,
    store: Arc<Store>,
    push: Arc<dyn PushTransport>,
) -> anyhow::Result<()> {
    config.ensure_admin_ready()?;

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = AppState {
        config,
        store,
        push,
        start_time: std::time::Instant::now(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Admin gateway listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
