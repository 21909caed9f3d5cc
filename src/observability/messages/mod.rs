// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the event at its level with structured fields.
//!
//! # Organization
//!
//! * `consumer` - poll loop and per-message delivery events
//! * `ingest` - HTTP ingestion and enqueue events
//! * `registry` - handler registration at startup
//!
//! # Usage Pattern
//!
//! ```rust
//! use event_relay::observability::messages::StructuredLog;
//! use event_relay::observability::messages::consumer::MessageReceived;
//!
//! let msg = MessageReceived {
//!     message_id: "9f1c",
//!     body_size: 128,
//! };
//!
//! let span = msg.span("delivery");
//! let _guard = span.enter();
//! msg.log();
//! ```

use tracing::Span;

pub mod consumer;
pub mod ingest;
pub mod registry;

/// A log event that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the event.
    fn log(&self);

    /// Build a span carrying the same fields, for scoping follow-up events.
    fn span(&self, name: &str) -> Span;
}
