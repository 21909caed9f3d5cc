// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Canonical message representation.
//!
//! A [`Message`] is a flat, key-ordered map of strings. Two keys are reserved:
//!
//! * `_type` - reverse-domain identifier with at least three segments, used to
//!   pick the handler (e.g. `io.example.outputs.log`)
//! * `_date` - RFC 3339 creation timestamp
//!
//! Everything else is payload owned by whoever produced the message.
//!
//! # Examples
//!
//! ```
//! use event_relay::message::Message;
//!
//! let mut message = Message::create("io.example.outputs.log");
//! message.set("msg", "hello");
//!
//! assert!(message.validate().is_ok());
//!
//! let body = message.encode().unwrap();
//! assert_eq!(Message::decode(&body).unwrap(), message);
//! ```

mod codec;

pub use codec::{decode, encode};

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::consts::{DATE_KEY, MAX_BODY_SIZE, MIN_TYPE_SEGMENTS, TYPE_KEY};
use crate::errors::{DecodeError, EncodeError, ValidationError};

/// An ordered string-to-string map travelling through the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(BTreeMap<String, String>);

impl Message {
    /// Create a message carrying only its type and the current time.
    pub fn create(message_type: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(TYPE_KEY.to_string(), message_type.to_string());
        fields.insert(
            DATE_KEY.to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        Self(fields)
    }

    /// The `_type` value, if present.
    pub fn message_type(&self) -> Option<&str> {
        self.get(TYPE_KEY)
    }

    /// The parsed `_date`, if present and well-formed.
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.get(DATE_KEY)
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a field, overwriting any previous value (reserved keys included).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// All entries in key order, reserved keys included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Payload entries only, reserved keys skipped.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(k, _)| *k != TYPE_KEY && *k != DATE_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the type, date, and encoded size rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validated_body().map(|_| ())
    }

    /// Validate and return the encoded body that passed the size check.
    ///
    /// Validation and encoding share this path so the size that was checked is
    /// the size that gets sent.
    pub fn validated_body(&self) -> Result<String, ValidationError> {
        let message_type = self.message_type().ok_or(ValidationError::MissingType)?;
        if message_type.split('.').count() < MIN_TYPE_SEGMENTS {
            return Err(ValidationError::InvalidType {
                value: message_type.to_string(),
                min_segments: MIN_TYPE_SEGMENTS,
            });
        }

        let date = self.get(DATE_KEY).ok_or(ValidationError::MissingDate)?;
        if DateTime::parse_from_rfc3339(date).is_err() {
            return Err(ValidationError::InvalidDate {
                value: date.to_string(),
            });
        }

        let body = self.encode()?;
        if body.len() > MAX_BODY_SIZE {
            return Err(ValidationError::TooLarge {
                size: body.len(),
                limit: MAX_BODY_SIZE,
            });
        }

        Ok(body)
    }

    pub fn encode(&self) -> Result<String, EncodeError> {
        codec::encode(self)
    }

    pub fn decode(body: &str) -> Result<Self, DecodeError> {
        codec::decode(body)
    }
}

impl From<BTreeMap<String, String>> for Message {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self(fields)
    }
}

impl From<Message> for BTreeMap<String, String> {
    fn from(message: Message) -> Self {
        message.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Message {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
