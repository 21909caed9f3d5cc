// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::HandlerError;
use crate::message::Message;
use crate::traits::{Handling, HandlerRegistry};

/// Outcome of routing one message to its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The registered handler ran and made this decision.
    Handled(Handling),
    /// No handler is registered for the message type (or the message has none).
    NoHandler,
}

/// Routes decoded messages to the handler registered for their type.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub async fn dispatch(&self, message: &Message) -> Result<Dispatched, HandlerError> {
        let handler = match message
            .message_type()
            .and_then(|message_type| self.registry.lookup_message_handler(message_type))
        {
            Some(handler) => handler,
            None => return Ok(Dispatched::NoHandler),
        };

        tracing::debug!(
            handler = handler.name(),
            message_type = message.message_type().unwrap_or_default(),
            "Dispatching message"
        );
        handler.handle(message).await.map(Dispatched::Handled)
    }
}
