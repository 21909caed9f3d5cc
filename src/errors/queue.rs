// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by queue backends and by the enqueue path.

use thiserror::Error;

use crate::errors::{EncodeError, ValidationError};

/// Failure talking to a queue backend.
#[derive(Error, Debug)]
pub enum QueueError {
    /// The request never produced a usable response (connect, timeout, body read).
    #[error("Queue transport error: {0}")]
    Transport(String),

    /// The backend answered with an error.
    #[error("Queue service error {code}: {message}")]
    Service { code: String, message: String },

    /// The backend answered with something we could not parse.
    #[error("Unexpected queue response: {0}")]
    InvalidResponse(String),

    /// The receipt handle is unknown or its lease has already expired.
    #[error("Receipt handle '{0}' is not valid")]
    InvalidReceipt(String),
}

impl From<reqwest::Error> for QueueError {
    fn from(err: reqwest::Error) -> Self {
        QueueError::Transport(err.to_string())
    }
}

/// Failure on the produce side: validate, encode, send.
#[derive(Error, Debug)]
pub enum EnqueueError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encoding(#[from] EncodeError),

    #[error("Unable to send message to queue: {0}")]
    Queue(#[from] QueueError),
}

impl EnqueueError {
    /// True when the producer sent something we refuse, as opposed to a backend outage.
    pub fn is_rejection(&self) -> bool {
        matches!(self, EnqueueError::Validation(_) | EnqueueError::Encoding(_))
    }
}
