// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for HTTP ingestion.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// The ingestion server is listening.
///
/// # Log Level
/// `info!` - Important operational event
pub struct IngestServerStarted<'a> {
    pub addr: &'a str,
    pub prefixes: &'a [&'a str],
}

impl Display for IngestServerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "HTTP ingestion listening on {} (inputs: {})",
            self.addr,
            self.prefixes.join(", ")
        )
    }
}

impl StructuredLog for IngestServerStarted<'_> {
    fn log(&self) {
        tracing::info!(addr = self.addr, prefixes = ?self.prefixes, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("ingest_server", span_name = name, addr = self.addr)
    }
}

/// A message was accepted and sent to the queue.
///
/// # Log Level
/// `info!` - Important operational event
pub struct MessageEnqueued<'a> {
    pub message_id: &'a str,
    pub message_type: &'a str,
    pub body_size: usize,
}

impl Display for MessageEnqueued<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Enqueued message {} of type {} ({} bytes)",
            self.message_id, self.message_type, self.body_size
        )
    }
}

impl StructuredLog for MessageEnqueued<'_> {
    fn log(&self) {
        tracing::info!(
            message_id = self.message_id,
            message_type = self.message_type,
            body_size = self.body_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "enqueued",
            span_name = name,
            message_id = self.message_id,
            message_type = self.message_type,
        )
    }
}

/// A submission was refused before or during enqueue.
///
/// # Log Level
/// `warn!` for client rejections, `error!` for queue failures
pub struct EnqueueRejected<'a> {
    pub input: &'a str,
    pub rejected_by_client: bool,
    pub error: &'a dyn std::error::Error,
}

impl Display for EnqueueRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.rejected_by_client {
            write!(f, "Rejected submission on {}: {}", self.input, self.error)
        } else {
            write!(f, "Unable to enqueue submission on {}: {}", self.input, self.error)
        }
    }
}

impl StructuredLog for EnqueueRejected<'_> {
    fn log(&self) {
        if self.rejected_by_client {
            tracing::warn!(input = self.input, error = %self.error, "{}", self);
        } else {
            tracing::error!(input = self.input, error = %self.error, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("enqueue_rejected", span_name = name, input = self.input)
    }
}
