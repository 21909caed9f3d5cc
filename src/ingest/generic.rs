// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;

use crate::engine::enqueue;
use crate::ingest::{enqueue_error_response, IngestState};
use crate::message::Message;
use crate::traits::{InputHandler, InputHandlerHelp};

const NAME: &str = "generic";
const MULTI_VALUE_ERROR: &str = "Multi-value keys are not supported.";

type Pairs = Vec<(String, String)>;

/// Form post to `/generic/{type}`; every key-value pair becomes a message field.
pub struct GenericInput;

impl InputHandler for GenericInput {
    fn routes(&self) -> Router<IngestState> {
        Router::new().route("/{message_type}", post(submit))
    }

    fn help(&self) -> InputHandlerHelp {
        InputHandlerHelp {
            path: "/generic/<type>".to_string(),
            description: "POST with key-value pairs as application/x-www-form-urlencoded".to_string(),
        }
    }
}

async fn submit(
    State(state): State<IngestState>,
    Path(message_type): Path<String>,
    Query(query): Query<Pairs>,
    form: Result<Form<Pairs>, FormRejection>,
) -> Response {
    let body = match form {
        Ok(Form(pairs)) => pairs,
        // No form body at all; query parameters may still carry the fields
        Err(FormRejection::InvalidFormContentType(_)) => Vec::new(),
        Err(rejection) => return rejection.into_response(),
    };

    let fields = match single_values(query.into_iter().chain(body)) {
        Some(fields) => fields,
        None => return (StatusCode::BAD_REQUEST, MULTI_VALUE_ERROR).into_response(),
    };

    let mut message = Message::create(&message_type);
    for (key, value) in fields {
        message.set(key, value);
    }

    match enqueue(state.queue.as_ref(), &message).await {
        Ok(_) => StatusCode::CREATED.into_response(),
        Err(error) => enqueue_error_response(NAME, &error),
    }
}

/// `None` when any key appears more than once.
fn single_values(pairs: impl IntoIterator<Item = (String, String)>) -> Option<BTreeMap<String, String>> {
    let mut fields = BTreeMap::new();
    for (key, value) in pairs {
        if fields.insert(key, value).is_some() {
            return None;
        }
    }
    Some(fields)
}
