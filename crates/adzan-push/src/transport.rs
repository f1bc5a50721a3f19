//! The `PushTransport` trait and the multi-recipient broadcast helper.

use async_trait::async_trait;

use crate::error::PushError;
use crate::message::PushMessage;

/// Send one message to one recipient. The dispatch engine treats this as a
/// black box: `Ok(())` or an error whose text ends up on the log row.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError>;
}

/// Per-token outcome of a broadcast.
#[derive(Debug, Clone)]
pub struct TokenResult {
    pub token: String,
    pub ok: bool,
    pub error: Option<String>,
}

/// Aggregate outcome of a broadcast.
#[derive(Debug, Clone, Default)]
pub struct BroadcastOutcome {
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<TokenResult>,
}

/// Send one message to many recipients, one at a time in list order.
/// Tokens are deduplicated and empties skipped; an empty recipient list is
/// a zero-count success, not an error. A failing token never aborts the
/// rest of the batch.
pub async fn broadcast(
    transport: &dyn PushTransport,
    tokens: &[String],
    message: &PushMessage,
) -> BroadcastOutcome {
    let mut unique: Vec<&String> = Vec::new();
    for token in tokens {
        if !token.is_empty() && !unique.iter().any(|t| *t == token) {
            unique.push(token);
        }
    }

    let mut outcome = BroadcastOutcome::default();
    for token in unique {
        match transport.send(token, message).await {
            Ok(()) => {
                outcome.sent += 1;
                outcome.results.push(TokenResult {
                    token: token.clone(),
                    ok: true,
                    error: None,
                });
            }
            Err(e) => {
                outcome.failed += 1;
                outcome.results.push(TokenResult {
                    token: token.clone(),
                    ok: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }
    outcome
}
