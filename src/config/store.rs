// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed configuration lookup.
//!
//! Values are addressed by dot paths (`consumer.lease_seconds`). A lookup yields a
//! [`ConfigValue`], so callers match on what they got instead of guessing at
//! runtime types.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::errors::ConfigError;

/// Result of looking up a single config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Missing,
}

/// Read-only source of startup configuration.
pub trait ConfigStore: Send + Sync {
    fn get(&self, path: &str) -> ConfigValue;

    fn get_string(&self, path: &str) -> Result<String, ConfigError> {
        match self.get(path) {
            ConfigValue::String(value) => Ok(value),
            ConfigValue::Integer(value) => Ok(value.to_string()),
            ConfigValue::Missing => Err(ConfigError::Missing {
                path: path.to_string(),
            }),
        }
    }

    fn get_int(&self, path: &str) -> Result<i64, ConfigError> {
        match self.get(path) {
            ConfigValue::Integer(value) => Ok(value),
            ConfigValue::String(value) => {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidInteger {
                        path: path.to_string(),
                        value,
                    })
            }
            ConfigValue::Missing => Err(ConfigError::Missing {
                path: path.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str;
}

/// Config backed by environment variables.
///
/// `outputs.pushover.token` is read from `OUTPUTS_PUSHOVER_TOKEN`: the path is
/// upper-cased, every character outside `A-Z` becomes `_`, and runs of `_`
/// collapse into one. Empty variables count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigStore {
    vars: HashMap<String, String>,
}

impl EnvConfigStore {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn path_to_env(path: &str) -> String {
        let mut env = String::with_capacity(path.len());
        for c in path.to_uppercase().chars() {
            let c = if c.is_ascii_uppercase() { c } else { '_' };
            if c == '_' && env.ends_with('_') {
                continue;
            }
            env.push(c);
        }
        env
    }
}

impl ConfigStore for EnvConfigStore {
    fn get(&self, path: &str) -> ConfigValue {
        match self.vars.get(&Self::path_to_env(path)) {
            Some(value) if !value.is_empty() => ConfigValue::String(value.clone()),
            _ => ConfigValue::Missing,
        }
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

/// Config backed by a YAML document; dot paths walk nested mappings.
///
/// ```yaml
/// consumer:
///   lease_seconds: 60
/// outputs:
///   pushover:
///     token: abc123
/// ```
#[derive(Debug, Clone)]
pub struct YamlConfigStore {
    root: Value,
}

impl YamlConfigStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content)
            .map(|root| Self { root })
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.root, |node, segment| match node {
            Value::Mapping(map) => map.get(segment),
            _ => None,
        })
    }
}

impl ConfigStore for YamlConfigStore {
    fn get(&self, path: &str) -> ConfigValue {
        match self.lookup(path) {
            Some(Value::String(value)) => ConfigValue::String(value.clone()),
            Some(Value::Number(number)) => match number.as_i64() {
                Some(value) => ConfigValue::Integer(value),
                None => ConfigValue::String(number.to_string()),
            },
            Some(Value::Bool(value)) => ConfigValue::String(value.to_string()),
            _ => ConfigValue::Missing,
        }
    }

    fn name(&self) -> &'static str {
        "yaml"
    }
}
