// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wire encoding for queue message bodies.
//!
//! A body is `base64(gzip(json(map)))`. Compression keeps moderately sized
//! payloads under the queue's body limit, and base64 keeps the body printable
//! for backends that only accept text.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::errors::{DecodeError, EncodeError};
use crate::message::Message;

/// Encode a message into its printable wire body.
pub fn encode(message: &Message) -> Result<String, EncodeError> {
    let json = serde_json::to_vec(message).map_err(EncodeError::Serialize)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json).map_err(EncodeError::Compress)?;
    let compressed = encoder.finish().map_err(EncodeError::Compress)?;

    Ok(STANDARD.encode(compressed))
}

/// Decode a wire body back into a message.
///
/// Every failure here is permanent for the body in question, so callers must
/// not retry it.
pub fn decode(body: &str) -> Result<Message, DecodeError> {
    let compressed = STANDARD.decode(body.trim())?;

    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(DecodeError::Decompress)?;

    let fields: BTreeMap<String, String> =
        serde_json::from_slice(&json).map_err(DecodeError::Deserialize)?;

    Ok(Message::from(fields))
}
