// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Which of the two registry tables a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationKind {
    InputPrefix,
    MessageType,
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationKind::InputPrefix => write!(f, "prefix"),
            RegistrationKind::MessageType => write!(f, "message type"),
        }
    }
}

/// A second handler was registered under a key that is already taken.
///
/// This is a startup configuration conflict; the process must not serve with it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Duplicate handler for {kind} '{key}'")]
pub struct DuplicateRegistrationError {
    pub kind: RegistrationKind,
    pub key: String,
}
