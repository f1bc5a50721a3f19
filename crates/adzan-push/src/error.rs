//! Push transport error type.

use thiserror::Error;

/// Errors raised by the push transport.
///
/// Per-recipient failures are recorded via `to_string()` into the log row's
/// `error_message`; they never abort a dispatch batch.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid message: {0}")]
    Message(String),
    #[error("invalid service account key: {0}")]
    Credentials(String),
    #[error("token exchange failed: {0}")]
    Auth(String),
    #[error("push request failed: {0}")]
    Http(String),
    #[error("push gateway error {status}: {body}")]
    Gateway { status: u16, body: String },
}
