// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::HandlerError;
use crate::message::Message;
use crate::outputs::PUSHOVER_OUTPUT_TYPE;
use crate::traits::{Handling, MessageHandler};

/// Message fields passed through to the API when present.
const FORWARDED_FIELDS: [&str; 6] = ["user", "message", "title", "url", "url_title", "priority"];
const REQUIRED_FIELDS: [&str; 2] = ["message", "user"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends the message as a push notification through the Pushover API.
///
/// Requires `message` and `user` fields. `title`, `url`, `url_title` and
/// `priority` are forwarded when set; the message date becomes the
/// notification timestamp.
pub struct PushoverHandler {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

impl PushoverHandler {
    pub fn new(token: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            api_url,
        }
    }

    fn form(&self, message: &Message) -> Result<Vec<(&'static str, String)>, HandlerError> {
        if let Some(field) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| !message.contains_key(field))
        {
            return Err(HandlerError::MissingField {
                message_type: PUSHOVER_OUTPUT_TYPE.to_string(),
                field,
            });
        }

        let mut form = vec![("token", self.token.clone())];
        form.extend(
            FORWARDED_FIELDS
                .into_iter()
                .filter_map(|field| message.get(field).map(|value| (field, value.to_string()))),
        );
        if let Some(date) = message.date() {
            form.push(("timestamp", date.timestamp().to_string()));
        }
        Ok(form)
    }
}

#[async_trait]
impl MessageHandler for PushoverHandler {
    async fn handle(&self, message: &Message) -> Result<Handling, HandlerError> {
        let form = self.form(message)?;

        let response = self
            .client
            .post(&self.api_url)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(HandlerError::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(Handling::Stop)
    }

    fn name(&self) -> &'static str {
        "pushover"
    }
}
