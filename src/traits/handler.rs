// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::HandlerError;
use crate::ingest::IngestState;
use crate::message::Message;

/// What a message handler decided about further handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// Consumption is complete; the message gets acknowledged.
    Stop,
    /// Hand the message on to later handlers. Nothing consumes this yet, so the
    /// message stays on the queue.
    Continue,
}

/// Output side of the relay: reacts to one message type.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &Message) -> Result<Handling, HandlerError>;

    fn name(&self) -> &'static str;
}

/// Help entry describing an ingestion route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputHandlerHelp {
    pub path: String,
    pub description: String,
}

/// Input side of the relay: turns producer requests into enqueued messages.
///
/// Routes returned here are nested under `/{prefix}` where `prefix` is the key
/// the handler was registered with.
pub trait InputHandler: Send + Sync {
    fn routes(&self) -> axum::Router<IngestState>;

    fn help(&self) -> InputHandlerHelp;
}
