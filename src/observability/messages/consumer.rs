// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the queue consumer.
//!
//! This module contains message types for logging events related to:
//! * Poll loop lifecycle (start, stop, receive failures)
//! * Per-message delivery (receive, decode, dispatch, acknowledge)
//! * Lease renewal

use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Consumer loop started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConsumerStarted<'a> {
    pub queue: &'a str,
    pub wait: Duration,
    pub lease: Duration,
    pub renew_interval: Duration,
    pub max_in_flight: Option<usize>,
}

impl Display for ConsumerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Consuming from {} queue: wait={:?}, lease={:?}, renew_interval={:?}, max_in_flight={}",
            self.queue,
            self.wait,
            self.lease,
            self.renew_interval,
            self.max_in_flight
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string())
        )
    }
}

impl StructuredLog for ConsumerStarted<'_> {
    fn log(&self) {
        tracing::info!(
            queue = self.queue,
            wait_secs = self.wait.as_secs(),
            lease_secs = self.lease.as_secs(),
            renew_interval_secs = self.renew_interval.as_secs(),
            max_in_flight = ?self.max_in_flight,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("consumer", span_name = name, queue = self.queue)
    }
}

/// Consumer loop stopped and in-flight messages drained.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConsumerStopped<'a> {
    pub queue: &'a str,
    pub reason: &'a str,
}

impl Display for ConsumerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stopped consuming from {} queue: {}", self.queue, self.reason)
    }
}

impl StructuredLog for ConsumerStopped<'_> {
    fn log(&self) {
        tracing::info!(queue = self.queue, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("consumer_stopped", span_name = name, queue = self.queue)
    }
}

/// A receive call failed.
///
/// # Log Level
/// `warn!` when the loop will retry, `error!` when it gives up
pub struct ReceiveFailed<'a> {
    pub queue: &'a str,
    pub attempts: u32,
    pub retry_in: Option<Duration>,
    pub error: &'a dyn std::error::Error,
}

impl Display for ReceiveFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.retry_in {
            Some(delay) => write!(
                f,
                "Unable to receive messages (attempt {}), retrying in {:?}: {}",
                self.attempts, delay, self.error
            ),
            None => write!(
                f,
                "Unable to receive messages (attempt {}), giving up: {}",
                self.attempts, self.error
            ),
        }
    }
}

impl StructuredLog for ReceiveFailed<'_> {
    fn log(&self) {
        match self.retry_in {
            Some(delay) => tracing::warn!(
                queue = self.queue,
                attempts = self.attempts,
                retry_in_ms = delay.as_millis() as u64,
                error = %self.error,
                "{}", self
            ),
            None => tracing::error!(
                queue = self.queue,
                attempts = self.attempts,
                error = %self.error,
                "{}", self
            ),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("receive_failed", span_name = name, queue = self.queue)
    }
}

/// A message was received and its processing task is starting.
///
/// # Log Level
/// `debug!` - High-volume delivery event
///
/// The span built from this message scopes every other event of the delivery.
pub struct MessageReceived<'a> {
    pub message_id: &'a str,
    pub body_size: usize,
}

impl Display for MessageReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Received message {} ({} bytes)",
            self.message_id, self.body_size
        )
    }
}

impl StructuredLog for MessageReceived<'_> {
    fn log(&self) {
        tracing::debug!(
            message_id = self.message_id,
            body_size = self.body_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("delivery", span_name = name, message_id = self.message_id)
    }
}

/// A message body could not be decoded; it is abandoned on the queue.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DecodeFailed<'a> {
    pub message_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DecodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Wasn't able to decode message {}: {}",
            self.message_id, self.error
        )
    }
}

impl StructuredLog for DecodeFailed<'_> {
    fn log(&self) {
        tracing::error!(message_id = self.message_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("decode_failed", span_name = name, message_id = self.message_id)
    }
}

/// A handler returned an error; the message stays on the queue for redelivery.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct HandlerFailed<'a> {
    pub message_id: &'a str,
    pub message_type: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for HandlerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Wasn't able to process message {} of type {}: {}",
            self.message_id, self.message_type, self.error
        )
    }
}

impl StructuredLog for HandlerFailed<'_> {
    fn log(&self) {
        tracing::error!(
            message_id = self.message_id,
            message_type = self.message_type,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "handler_failed",
            span_name = name,
            message_id = self.message_id,
            message_type = self.message_type,
        )
    }
}

/// A message was handled and deleted from the queue.
///
/// # Log Level
/// `info!` - Important operational event
pub struct MessageAcknowledged<'a> {
    pub message_id: &'a str,
    pub message_type: &'a str,
    pub duration: Duration,
}

impl Display for MessageAcknowledged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Message {} of type {} handled and acknowledged in {:?}",
            self.message_id, self.message_type, self.duration
        )
    }
}

impl StructuredLog for MessageAcknowledged<'_> {
    fn log(&self) {
        tracing::info!(
            message_id = self.message_id,
            message_type = self.message_type,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "acknowledged",
            span_name = name,
            message_id = self.message_id,
            message_type = self.message_type,
        )
    }
}

/// The handler finished but deleting the message failed; it will be redelivered.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct AcknowledgeFailed<'a> {
    pub message_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for AcknowledgeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Unable to delete message {}: {}",
            self.message_id, self.error
        )
    }
}

impl StructuredLog for AcknowledgeFailed<'_> {
    fn log(&self) {
        tracing::error!(message_id = self.message_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("acknowledge_failed", span_name = name, message_id = self.message_id)
    }
}

/// Nothing consumed the message; it is left on the queue.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct MessageUnhandled<'a> {
    pub message_id: &'a str,
    pub message_type: &'a str,
    pub reason: &'a str,
}

impl Display for MessageUnhandled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Message {} of type {} left on queue: {}",
            self.message_id, self.message_type, self.reason
        )
    }
}

impl StructuredLog for MessageUnhandled<'_> {
    fn log(&self) {
        tracing::warn!(
            message_id = self.message_id,
            message_type = self.message_type,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "unhandled",
            span_name = name,
            message_id = self.message_id,
            message_type = self.message_type,
        )
    }
}

/// A lease renewal failed. Renewal is best effort, so processing continues.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct LeaseRenewalFailed<'a> {
    pub receipt: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for LeaseRenewalFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unable to renew message lease: {}", self.error)
    }
}

impl StructuredLog for LeaseRenewalFailed<'_> {
    fn log(&self) {
        tracing::warn!(receipt = self.receipt, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("lease_renewal_failed", span_name = name)
    }
}
