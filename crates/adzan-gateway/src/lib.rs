//! # Adzan Gateway
//!
//! The admin console HTTP API: session-cookie auth, CRUD over users,
//! schedules and reminders, the notification log viewer, manual
//! broadcasts, and the cron trigger routes that fire the dispatch engine.

pub mod routes;
pub mod server;
pub mod session;

#[cfg(test)]
mod tests;

pub use server::{AppState, build_router, start};
pub use session::{SESSION_COOKIE, hash_password, new_salt, verify_password};
