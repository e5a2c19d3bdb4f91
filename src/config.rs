//! Process Configuration
//!
//! Addresses come from the command line; tunables come from `GOL_*` environment
//! variables and fall back to the defaults below.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(150);
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_millis(1200);
pub const DEFAULT_INBOX_CAPACITY: usize = 16;
/// Request body cap for boards and bands. A dense 1024x1024 board is about 4 MiB of JSON.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub bind: SocketAddr,
    /// Consecutive failed attempts tolerated for a single turn.
    pub max_attempts: u32,
    /// Upper bound on one compute call.
    pub call_timeout: Duration,
    /// Upper bound on the health probe used to establish a connection.
    pub connect_timeout: Duration,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// Capacity of the per-run control inbox.
    pub inbox_capacity: usize,
    /// Largest accepted `/run` request body.
    pub max_body_bytes: usize,
}

impl BrokerConfig {
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            retry_max_delay: DEFAULT_RETRY_MAX_DELAY,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Applies `GOL_*` overrides on top of the defaults.
    pub fn from_env(bind: SocketAddr) -> Self {
        let mut config = Self::new(bind);
        config.max_attempts = env_or("GOL_MAX_ATTEMPTS", config.max_attempts).max(1);
        config.call_timeout = env_millis("GOL_CALL_TIMEOUT_MS", config.call_timeout);
        config.connect_timeout = env_millis("GOL_CONNECT_TIMEOUT_MS", config.connect_timeout);
        config.retry_base_delay = env_millis("GOL_RETRY_BASE_MS", config.retry_base_delay);
        config.retry_max_delay = env_millis("GOL_RETRY_MAX_MS", config.retry_max_delay);
        config.inbox_capacity = env_or("GOL_INBOX_CAPACITY", config.inbox_capacity).max(1);
        config.max_body_bytes = env_or("GOL_MAX_BODY_BYTES", config.max_body_bytes);
        config
    }

    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_base_delay
            .saturating_mul(factor)
            .min(self.retry_max_delay)
    }
}

/// Settings for a compute worker process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub bind: SocketAddr,
    /// Broker to register with on startup.
    pub broker: SocketAddr,
    /// Address the broker should dial. Defaults to `bind`.
    pub advertise: SocketAddr,
    /// Largest accepted `/compute` request body.
    pub max_body_bytes: usize,
}

impl WorkerConfig {
    /// Applies the `GOL_MAX_BODY_BYTES` override.
    pub fn from_env(bind: SocketAddr, broker: SocketAddr, advertise: SocketAddr) -> Self {
        Self {
            bind,
            broker,
            advertise,
            max_body_bytes: env_or("GOL_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparsable {}={}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_millis(key: &str, default: Duration) -> Duration {
    Duration::from_millis(env_or(key, default.as_millis() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = BrokerConfig::new("127.0.0.1:0".parse().unwrap());

        assert_eq!(config.backoff(1), Duration::from_millis(150));
        assert_eq!(config.backoff(2), Duration::from_millis(300));
        assert_eq!(config.backoff(3), Duration::from_millis(600));
        assert_eq!(config.backoff(4), Duration::from_millis(1200));
        assert_eq!(config.backoff(10), Duration::from_millis(1200));
    }

    #[test]
    fn test_defaults() {
        let config = BrokerConfig::new("127.0.0.1:8040".parse().unwrap());

        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.inbox_capacity, DEFAULT_INBOX_CAPACITY);
        assert!(config.max_body_bytes >= 8 * 1024 * 1024, "Room for a dense 1024x1024 board");
        assert_eq!(config.bind.port(), 8040);
    }
}
