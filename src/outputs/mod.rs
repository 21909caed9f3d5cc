// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in message handlers.

mod log;
mod pushover;

pub use log::LogHandler;
pub use pushover::PushoverHandler;

pub const LOG_OUTPUT_TYPE: &str = "io.luzifer.outputs.log";
pub const PUSHOVER_OUTPUT_TYPE: &str = "io.luzifer.outputs.pushover";
