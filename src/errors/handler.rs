// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A message handler could not process a message.
///
/// The consumer logs these and leaves the message on the queue so the backend
/// redelivers it once the lease expires.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The message lacks a field the handler needs.
    #[error("Message needs to contain '{field}' attribute for {message_type}")]
    MissingField {
        message_type: String,
        field: &'static str,
    },

    /// An outbound request failed before a response arrived.
    #[error("Unable to execute HTTP request: {0}")]
    Request(String),

    /// The remote side answered with a status we do not accept.
    #[error("Received unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// Anything else a handler wants to report.
    #[error("{0}")]
    Failed(String),
}

impl From<reqwest::Error> for HandlerError {
    fn from(err: reqwest::Error) -> Self {
        HandlerError::Request(err.to_string())
    }
}
