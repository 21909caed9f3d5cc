// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for handler registration.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::errors::RegistrationKind;
use crate::observability::messages::StructuredLog;

/// A handler was bound to a prefix or message type.
///
/// # Log Level
/// `info!` - Startup configuration event
pub struct HandlerRegistered<'a> {
    pub kind: RegistrationKind,
    pub key: &'a str,
    pub handler: &'a str,
}

impl Display for HandlerRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered handler {} for {} '{}'",
            self.handler, self.kind, self.key
        )
    }
}

impl StructuredLog for HandlerRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            kind = %self.kind,
            key = self.key,
            handler = self.handler,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("handler_registered", span_name = name, key = self.key)
    }
}
