// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! HTTP ingestion: producers submit messages here and they land on the queue.
//!
//! Every registered input handler contributes its routes under `/{prefix}`.
//! `GET /` lists what is mounted.

mod generic;

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum::http::StatusCode;

use crate::errors::EnqueueError;
use crate::observability::messages::ingest::EnqueueRejected;
use crate::observability::messages::StructuredLog;
use crate::traits::{HandlerRegistry, QueueClient};

pub use generic::GenericInput;

/// Shared state for every ingestion route.
#[derive(Clone)]
pub struct IngestState {
    pub queue: Arc<dyn QueueClient>,
}

impl IngestState {
    pub fn new(queue: Arc<dyn QueueClient>) -> Self {
        Self { queue }
    }
}

/// Mount every registered input handler and the help index.
pub fn router(registry: &HandlerRegistry, state: IngestState) -> Router {
    let mut router = Router::new();
    let mut help = Vec::new();

    for (prefix, handler) in registry.input_handlers() {
        router = router.nest(&format!("/{prefix}"), handler.routes());
        help.push(handler.help());
    }

    let help = Arc::new(help);
    router
        .route(
            "/",
            get(move || {
                let help = Arc::clone(&help);
                async move { Json(help.as_ref().clone()) }
            }),
        )
        .with_state(state)
}

/// Map an enqueue failure to the HTTP answer for the producer.
///
/// Rejected submissions are the producer's fault (400); a queue outage is ours
/// (502).
pub(crate) fn enqueue_error_response(input: &str, error: &EnqueueError) -> Response {
    let rejected_by_client = error.is_rejection();
    EnqueueRejected {
        input,
        rejected_by_client,
        error,
    }
    .log();

    let status = if rejected_by_client {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, error.to_string()).into_response()
}
