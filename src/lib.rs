// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // queue backends
pub mod config;     // config stores, settings, registry
pub mod engine;     // consumer loop, dispatch, leases
pub mod errors;     // error handling
pub mod ingest;     // HTTP ingestion
pub mod message;    // message model + wire codec
pub mod observability;
pub mod outputs;    // built-in message handlers
pub mod traits;     // unified abstractions
