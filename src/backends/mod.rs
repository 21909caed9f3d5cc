// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Queue backends for the relay.
//!
//! Each backend implements [`QueueClient`](crate::traits::QueueClient) and is
//! selected at startup by [`RuntimeBuilder::queue_client`](crate::config::RuntimeBuilder::queue_client).
//!
//! # Available Backends
//!
//! ## SQS Backend
//! Amazon SQS over the JSON protocol:
//! - **Leases**: visibility timeout set on receive, extended with `ChangeMessageVisibility`
//! - **Auth**: SigV4 request signing when credentials are configured
//! - **Use Case**: Production deployments
//!
//! ## Memory Backend
//! Process-local queue with the same lease and redelivery behavior:
//! - **Durability**: none, messages are lost on restart
//! - **Use Case**: Local runs without AWS, tests
//!
//! ## Stub Backend (Test-Only)
//! Testing utilities for consumer and ingestion development (only available in test builds):
//! - **StaticHandler / FailingHandler / RecordingHandler / SlowHandler**: message handlers with fixed behavior
//! - **StubInput**: route-less input handler for registry tests
//! - **RecordingQueue**: in-memory queue with call counters and failure injection
//! - **Note**: NOT available in production builds

mod memory;
mod sqs;
#[cfg(test)]
pub mod stub;

pub use memory::InMemoryQueue;
pub use sqs::SqsQueue;
