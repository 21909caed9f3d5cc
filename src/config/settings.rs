// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::config::consts::{
    DEFAULT_LEASE_SECONDS, DEFAULT_LISTEN, DEFAULT_PUSHOVER_API_URL, DEFAULT_RECEIVE_BACKOFF_MILLIS,
    DEFAULT_RECEIVE_BATCH_SIZE, DEFAULT_RENEW_INTERVAL_SECONDS, DEFAULT_WAIT_SECONDS,
    MAX_RECEIVE_BACKOFF_SECONDS, MAX_RECEIVE_BATCH_SIZE, MAX_WAIT_SECONDS,
};
use crate::config::store::{ConfigStore, ConfigValue};
use crate::errors::ConfigError;

/// Everything the process needs at startup, assembled from a [`ConfigStore`].
///
/// # Keys
/// * `listen` - HTTP listen address (`:3000` binds all interfaces)
/// * `queue.url` - SQS queue URL; unset means the in-memory queue
/// * `aws.region`, `aws.access_key_id`, `aws.secret_access_key`, `aws.session_token`
/// * `consumer.wait_seconds`, `consumer.lease_seconds`, `consumer.renew_interval_seconds`
/// * `consumer.receive_batch_size`, `consumer.max_in_flight` (0 = unbounded)
/// * `consumer.receive_retries` (0 = fatal), `consumer.receive_backoff_millis`
/// * `outputs.pushover.token`, `outputs.pushover.api_url`
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub listen: Option<String>,
    pub consumer: ConsumerSettings,
    pub queue: QueueSettings,
    pub pushover: PushoverSettings,
}

/// Tuning for the queue consumer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerSettings {
    /// Long-poll wait per receive call
    pub wait: Duration,
    /// Lease granted on receive and on every renewal
    pub lease: Duration,
    /// How often an in-flight message's lease is renewed; shorter than `lease`
    pub renew_interval: Duration,
    /// Messages requested per receive call
    pub receive_batch_size: usize,
    /// Bound on concurrently processed messages; `None` is unbounded
    pub max_in_flight: Option<usize>,
    pub receive_error_policy: ReceiveErrorPolicy,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(DEFAULT_WAIT_SECONDS),
            lease: Duration::from_secs(DEFAULT_LEASE_SECONDS),
            renew_interval: Duration::from_secs(DEFAULT_RENEW_INTERVAL_SECONDS),
            receive_batch_size: DEFAULT_RECEIVE_BATCH_SIZE,
            max_in_flight: None,
            receive_error_policy: ReceiveErrorPolicy::Fatal,
        }
    }
}

/// What the poll loop does when a receive call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveErrorPolicy {
    /// Stop the loop on the first failure.
    Fatal,
    /// Retry with exponential backoff, giving up after `max_retries`
    /// consecutive failures.
    Retry {
        max_retries: u32,
        base_backoff: Duration,
    },
}

impl ReceiveErrorPolicy {
    /// Delay before retrying after `failures` consecutive failed receives, or
    /// `None` when the loop should give up.
    pub fn backoff(&self, failures: u32) -> Option<Duration> {
        match *self {
            ReceiveErrorPolicy::Fatal => None,
            ReceiveErrorPolicy::Retry {
                max_retries,
                base_backoff,
            } => {
                if failures == 0 || failures > max_retries {
                    return None;
                }
                let factor = 1u32 << (failures - 1).min(16);
                Some(
                    base_backoff
                        .saturating_mul(factor)
                        .min(Duration::from_secs(MAX_RECEIVE_BACKOFF_SECONDS)),
                )
            }
        }
    }
}

/// Where the queue lives and how to authenticate against it.
#[derive(Debug, Clone, Default)]
pub struct QueueSettings {
    pub url: Option<String>,
    pub region: Option<String>,
    pub credentials: Option<AwsCredentials>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PushoverSettings {
    /// Application token; the pushover output is only registered when set
    pub token: Option<String>,
    pub api_url: String,
}

impl Default for PushoverSettings {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_PUSHOVER_API_URL.to_string(),
        }
    }
}

impl Settings {
    /// Read and validate all settings, falling back to defaults for unset keys.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, ConfigError> {
        let defaults = ConsumerSettings::default();

        let wait = seconds(store, "consumer.wait_seconds", defaults.wait)?;
        let lease = seconds(store, "consumer.lease_seconds", defaults.lease)?;
        let renew_interval =
            seconds(store, "consumer.renew_interval_seconds", defaults.renew_interval)?;

        if wait.as_secs() > MAX_WAIT_SECONDS {
            return Err(invalid(
                "consumer.wait_seconds",
                &format!("must be at most {}", MAX_WAIT_SECONDS),
            ));
        }
        if lease.is_zero() {
            return Err(invalid("consumer.lease_seconds", "must be greater than zero"));
        }
        if renew_interval.is_zero() || renew_interval >= lease {
            return Err(invalid(
                "consumer.renew_interval_seconds",
                &format!("must be between 1 and {} (the lease) exclusive", lease.as_secs()),
            ));
        }

        let receive_batch_size = match optional_int(store, "consumer.receive_batch_size")? {
            None => defaults.receive_batch_size,
            Some(n) if (1..=MAX_RECEIVE_BATCH_SIZE as i64).contains(&n) => n as usize,
            Some(_) => {
                return Err(invalid(
                    "consumer.receive_batch_size",
                    &format!("must be between 1 and {}", MAX_RECEIVE_BATCH_SIZE),
                ))
            }
        };

        let max_in_flight = match optional_int(store, "consumer.max_in_flight")? {
            None | Some(0) => None,
            Some(n) if n > 0 => Some(n as usize),
            Some(_) => return Err(invalid("consumer.max_in_flight", "must not be negative")),
        };

        let receive_error_policy = match optional_int(store, "consumer.receive_retries")? {
            None | Some(0) => ReceiveErrorPolicy::Fatal,
            Some(n) if n > 0 => ReceiveErrorPolicy::Retry {
                max_retries: u32::try_from(n)
                    .map_err(|_| invalid("consumer.receive_retries", "is too large"))?,
                base_backoff: match optional_int(store, "consumer.receive_backoff_millis")? {
                    None => Duration::from_millis(DEFAULT_RECEIVE_BACKOFF_MILLIS),
                    Some(ms) if ms > 0 => Duration::from_millis(ms as u64),
                    Some(_) => {
                        return Err(invalid(
                            "consumer.receive_backoff_millis",
                            "must be greater than zero",
                        ))
                    }
                },
            },
            Some(_) => return Err(invalid("consumer.receive_retries", "must not be negative")),
        };

        let credentials = match (
            optional_string(store, "aws.access_key_id"),
            optional_string(store, "aws.secret_access_key"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token: optional_string(store, "aws.session_token"),
            }),
            _ => None,
        };

        Ok(Self {
            listen: optional_string(store, "listen"),
            consumer: ConsumerSettings {
                wait,
                lease,
                renew_interval,
                receive_batch_size,
                max_in_flight,
                receive_error_policy,
            },
            queue: QueueSettings {
                url: optional_string(store, "queue.url"),
                region: optional_string(store, "aws.region"),
                credentials,
            },
            pushover: PushoverSettings {
                token: optional_string(store, "outputs.pushover.token"),
                api_url: optional_string(store, "outputs.pushover.api_url")
                    .unwrap_or_else(|| DEFAULT_PUSHOVER_API_URL.to_string()),
            },
        })
    }

    /// Listen address with the `:port` shorthand expanded to all interfaces.
    pub fn listen_addr(&self) -> String {
        let listen = self.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
        match listen.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{}", port),
            None => listen.to_string(),
        }
    }
}

fn invalid(path: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn optional_string(store: &dyn ConfigStore, path: &str) -> Option<String> {
    store.get_string(path).ok()
}

fn optional_int(store: &dyn ConfigStore, path: &str) -> Result<Option<i64>, ConfigError> {
    match store.get(path) {
        ConfigValue::Missing => Ok(None),
        _ => store.get_int(path).map(Some),
    }
}

fn seconds(store: &dyn ConfigStore, path: &str, default: Duration) -> Result<Duration, ConfigError> {
    match optional_int(store, path)? {
        None => Ok(default),
        Some(n) if n >= 0 => Ok(Duration::from_secs(n as u64)),
        Some(_) => Err(invalid(path, "must not be negative")),
    }
}
