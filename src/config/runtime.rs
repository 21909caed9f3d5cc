// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::{InMemoryQueue, SqsQueue};
use crate::config::{HandlerRegistry, QueueSettings, RegistryBuilder, Settings};
use crate::errors::{ConfigError, DuplicateRegistrationError};
use crate::ingest::GenericInput;
use crate::outputs::{LogHandler, PushoverHandler, LOG_OUTPUT_TYPE, PUSHOVER_OUTPUT_TYPE};
use crate::traits::QueueClient;

/// Runtime builder - wires the queue client and the built-in handlers from settings.
///
/// All registration happens here, before anything reads the registry. The
/// returned [`HandlerRegistry`] is frozen and meant to be shared via `Arc`.
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Register the built-in input and output handlers.
    ///
    /// * `generic` - form posts to `/generic/{type}`
    /// * `io.luzifer.outputs.log` - log the message
    /// * `io.luzifer.outputs.pushover` - push notification; only when a token is set
    pub fn registry(settings: &Settings) -> Result<HandlerRegistry, DuplicateRegistrationError> {
        let mut builder = RegistryBuilder::new();

        builder.register_input_handler("generic", Arc::new(GenericInput))?;
        builder.register_message_handler(LOG_OUTPUT_TYPE, Arc::new(LogHandler))?;

        match &settings.pushover.token {
            Some(token) => builder.register_message_handler(
                PUSHOVER_OUTPUT_TYPE,
                Arc::new(PushoverHandler::new(
                    token.clone(),
                    settings.pushover.api_url.clone(),
                )),
            )?,
            None => tracing::info!(
                message_type = PUSHOVER_OUTPUT_TYPE,
                "No pushover token configured, output not registered"
            ),
        }

        Ok(builder.build())
    }

    /// SQS when a queue URL is configured, otherwise a process-local queue.
    pub fn queue_client(settings: &QueueSettings) -> Result<Arc<dyn QueueClient>, ConfigError> {
        match &settings.url {
            Some(url) => Ok(Arc::new(SqsQueue::from_settings(url, settings)?)),
            None => {
                tracing::warn!(
                    "No queue URL configured, using in-memory queue: messages do not survive a restart"
                );
                Ok(Arc::new(InMemoryQueue::new()))
            }
        }
    }
}
