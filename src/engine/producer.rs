// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::EnqueueError;
use crate::message::Message;
use crate::observability::messages::ingest::MessageEnqueued;
use crate::observability::messages::StructuredLog;
use crate::traits::{MessageId, QueueClient};

/// Validate, encode and send a message.
///
/// A message that fails validation never reaches the queue.
pub async fn enqueue(queue: &dyn QueueClient, message: &Message) -> Result<MessageId, EnqueueError> {
    let body = message.validated_body()?;
    let body_size = body.len();

    let id = queue.send(body).await?;

    MessageEnqueued {
        message_id: &id.0,
        message_type: message.message_type().unwrap_or_default(),
        body_size,
    }
    .log();
    Ok(id)
}
