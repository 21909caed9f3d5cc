/// Reserved key holding the reverse-domain message type
pub const TYPE_KEY: &str = "_type";
/// Reserved key holding the RFC 3339 creation timestamp
pub const DATE_KEY: &str = "_date";
/// Minimum number of dot-separated segments in a message type
pub const MIN_TYPE_SEGMENTS: usize = 3;
/// Maximum encoded message body size (256 KiB) - the managed queue's body limit
pub const MAX_BODY_SIZE: usize = 256 * 1024;

/// Default long-poll wait for a receive call (seconds)
pub const DEFAULT_WAIT_SECONDS: u64 = 20;
/// Longest long-poll wait a receive call may request (SQS limit)
pub const MAX_WAIT_SECONDS: u64 = 20;
/// Default processing lease granted on receive (seconds)
pub const DEFAULT_LEASE_SECONDS: u64 = 30;
/// Default lease renewal interval, shorter than the lease (seconds)
pub const DEFAULT_RENEW_INTERVAL_SECONDS: u64 = 25;
/// Default number of messages requested per receive call
pub const DEFAULT_RECEIVE_BATCH_SIZE: usize = 1;
/// Upper bound on messages per receive call (SQS limit)
pub const MAX_RECEIVE_BATCH_SIZE: usize = 10;
/// Default base backoff between receive retries (milliseconds)
pub const DEFAULT_RECEIVE_BACKOFF_MILLIS: u64 = 1_000;
/// Ceiling for exponential receive backoff (seconds)
pub const MAX_RECEIVE_BACKOFF_SECONDS: u64 = 60;

/// Default HTTP listen address
pub const DEFAULT_LISTEN: &str = ":3000";
/// Pushover message API endpoint
pub const DEFAULT_PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";
