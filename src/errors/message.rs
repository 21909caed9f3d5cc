// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for message validation and wire encoding.

use thiserror::Error;

/// A message failed the shape or size rules and must not be enqueued.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The `_type` key is absent.
    #[error("Message contains invalid or missing type")]
    MissingType,

    /// The `_type` value has fewer than the required dot-separated segments.
    #[error("Message type '{value}' must be in reverse domain format with at least {min_segments} segments")]
    InvalidType { value: String, min_segments: usize },

    /// The `_date` key is absent.
    #[error("Message contains invalid or missing date")]
    MissingDate,

    /// The `_date` value does not parse as RFC 3339.
    #[error("Message date '{value}' is not a valid RFC 3339 timestamp")]
    InvalidDate { value: String },

    /// The encoded body is larger than the queue accepts.
    #[error("Encoded message is {size} bytes, exceeding the maximum body size of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Encoding failed while measuring the message size.
    #[error("Message encoding failed: {0}")]
    Encoding(#[from] EncodeError),
}

/// Failure turning a message into its wire body.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Unable to serialize message: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Unable to compress message: {0}")]
    Compress(#[source] std::io::Error),
}

/// Failure turning a wire body back into a message.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Message body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Message body is not a valid gzip stream: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Message payload is not a string map: {0}")]
    Deserialize(#[source] serde_json::Error),
}
