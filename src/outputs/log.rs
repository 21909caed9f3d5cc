// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::HandlerError;
use crate::message::Message;
use crate::traits::{Handling, MessageHandler};

/// Writes the whole message to the log and consumes it.
pub struct LogHandler;

#[async_trait]
impl MessageHandler for LogHandler {
    async fn handle(&self, message: &Message) -> Result<Handling, HandlerError> {
        let fields: Vec<String> = message
            .fields()
            .map(|(key, value)| format!("{key}={value:?}"))
            .collect();

        tracing::info!(
            message_type = message.message_type().unwrap_or_default(),
            date = message.get(crate::config::consts::DATE_KEY).unwrap_or_default(),
            fields = %fields.join(" "),
            "Message received: {:?}",
            message
        );
        Ok(Handling::Stop)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
