//! Store error type.

use thiserror::Error;

/// Errors raised by datastore operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("store lock poisoned")]
    Lock,
}
