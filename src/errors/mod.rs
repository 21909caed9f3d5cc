// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod consumer;
mod handler;
mod message;
mod queue;
mod registry;

pub use config::ConfigError;
pub use consumer::ConsumerError;
pub use handler::HandlerError;
pub use message::{DecodeError, EncodeError, ValidationError};
pub use queue::{EnqueueError, QueueError};
pub use registry::{DuplicateRegistrationError, RegistrationKind};
