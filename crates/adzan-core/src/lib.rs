//! # Adzan Core
//!
//! Shared foundation for the adzan admin console: the application
//! configuration (loaded once at startup, passed by reference everywhere),
//! the configuration error type, and the small value types the whole
//! workspace agrees on (prayer occasions, HH:MM times of day).

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::ConfigError;
pub use types::{Occasion, is_adzan_prayer_name, valid_hhmm};
