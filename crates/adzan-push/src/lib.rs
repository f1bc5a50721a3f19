//! # Adzan Push
//!
//! The push-delivery boundary: one message to one recipient, success or
//! failure. The dispatch engine only sees the [`PushTransport`] trait and
//! the typed [`PushMessage`]; the FCM HTTP v1 client behind it handles the
//! service-account OAuth dance.

pub mod error;
pub mod fcm;
pub mod message;
pub mod transport;

pub use error::PushError;
pub use fcm::FcmClient;
pub use message::{PushMessage, PushMessageBuilder};
pub use transport::{BroadcastOutcome, PushTransport, TokenResult, broadcast};
