// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for diagnostic and operational
//! logging across the relay. Message types follow a struct-based pattern with a
//! `Display` implementation so log text lives in one place instead of as format
//! strings scattered through the consumer and ingestion code.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::consumer` - queue polling, delivery and lease renewal events
//! * `messages::ingest` - HTTP ingestion and enqueue events
//! * `messages::registry` - handler registration events
//!
//! # Usage
//!
//! ```rust
//! use event_relay::observability::messages::consumer::DecodeFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = DecodeFailed {
//!     message_id: "9f1c",
//!     error: &error,
//! };
//!
//! tracing::error!("{}", msg);
//! ```

pub mod messages;
