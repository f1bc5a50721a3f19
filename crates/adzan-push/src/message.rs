//! Typed push message with named optional platform hints.
//!
//! Replaces ad hoc payload merging: the builder validates once at
//! `build()`, and the FCM client only serializes what is actually set.

use std::collections::BTreeMap;

use crate::error::PushError;

/// One validated push message, independent of the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Key/value payload delivered alongside the notification.
    pub data: BTreeMap<String, String>,
    /// Android notification channel (adzan sends only).
    pub android_channel_id: Option<String>,
    /// Android notification sound (adzan sends only).
    pub android_sound: Option<String>,
    /// APNs sound file (adzan sends only).
    pub apns_sound: Option<String>,
}

impl PushMessage {
    /// Start building a message.
    pub fn builder(title: impl Into<String>, body: impl Into<String>) -> PushMessageBuilder {
        PushMessageBuilder {
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
            android_channel_id: None,
            android_sound: None,
            apns_sound: None,
        }
    }

    /// Whether any android notification hint is set.
    pub fn has_android_hints(&self) -> bool {
        self.android_channel_id.is_some() || self.android_sound.is_some()
    }
}

/// Builder for [`PushMessage`].
#[derive(Debug, Clone)]
pub struct PushMessageBuilder {
    title: String,
    body: String,
    data: BTreeMap<String, String>,
    android_channel_id: Option<String>,
    android_sound: Option<String>,
    apns_sound: Option<String>,
}

impl PushMessageBuilder {
    /// Add one data payload entry.
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Add several data payload entries.
    pub fn data_map(mut self, entries: BTreeMap<String, String>) -> Self {
        self.data.extend(entries);
        self
    }

    /// Set the android channel id hint.
    pub fn android_channel_id(mut self, value: impl Into<String>) -> Self {
        self.android_channel_id = Some(value.into());
        self
    }

    /// Set the android sound hint.
    pub fn android_sound(mut self, value: impl Into<String>) -> Self {
        self.android_sound = Some(value.into());
        self
    }

    /// Set the APNs sound hint.
    pub fn apns_sound(mut self, value: impl Into<String>) -> Self {
        self.apns_sound = Some(value.into());
        self
    }

    /// Validate and build the message.
    pub fn build(self) -> Result<PushMessage, PushError> {
        if self.title.trim().is_empty() {
            return Err(PushError::Message("title must not be empty".into()));
        }
        if self.body.trim().is_empty() {
            return Err(PushError::Message("body must not be empty".into()));
        }
        Ok(PushMessage {
            title: self.title,
            body: self.body,
            data: self.data,
            android_channel_id: self.android_channel_id,
            android_sound: self.android_sound,
            apns_sound: self.apns_sound,
        })
    }
}
