// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::QueueError;

/// Terminal failure of the consumer poll loop.
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// Receiving from the queue failed and the receive policy gave up.
    #[error("Unable to receive messages after {attempts} attempt(s): {source}")]
    Receive {
        attempts: u32,
        #[source]
        source: QueueError,
    },
}
