// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod handler;
pub mod queue;

pub use crate::config::HandlerRegistry;
pub use handler::{Handling, InputHandler, InputHandlerHelp, MessageHandler};
pub use queue::{MessageId, QueueClient, ReceiptHandle, ReceivedMessage};
