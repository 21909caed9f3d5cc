// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::errors::QueueError;

/// Backend-assigned message identifier, used for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque token for one delivery of a message; renews or deletes that delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(pub String);

impl ReceiptHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One delivery handed out by [`QueueClient::receive`].
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub id: MessageId,
    pub body: String,
    pub receipt: ReceiptHandle,
}

/// Primitives against a managed at-least-once queue.
///
/// Implementations must be safe to share across all in-flight message tasks
/// without extra locking.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Long-poll for up to `max_messages`, waiting at most `wait`. Each returned
    /// message is invisible to other consumers for `lease`.
    async fn receive(
        &self,
        max_messages: usize,
        wait: Duration,
        lease: Duration,
    ) -> Result<Vec<ReceivedMessage>, QueueError>;

    /// Reset the delivery's lease to `lease` from now.
    async fn renew_lease(&self, receipt: &ReceiptHandle, lease: Duration) -> Result<(), QueueError>;

    /// Acknowledge the delivery; the message will not be redelivered.
    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError>;

    async fn send(&self, body: String) -> Result<MessageId, QueueError>;

    fn name(&self) -> &'static str;
}
