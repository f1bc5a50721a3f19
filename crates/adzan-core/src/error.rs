//! Configuration error type.

use thiserror::Error;

/// Errors raised while loading or validating the application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("missing required settings: {0}")]
    Missing(String),
    #[error("invalid time zone: {0}")]
    TimeZone(String),
}
