// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for configuration lookup and settings assembly.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// No value is stored under the path.
    #[error("Config value '{path}' is not set")]
    Missing { path: String },

    /// A value exists but is not an integer.
    #[error("Config value '{path}' is not an integer: '{value}'")]
    InvalidInteger { path: String, value: String },

    /// A value parsed but is outside what the setting accepts.
    #[error("Config value '{path}' is invalid: {reason}")]
    InvalidValue { path: String, reason: String },

    /// The config file could not be read.
    #[error("Unable to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML.
    #[error("Unable to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
