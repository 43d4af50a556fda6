//! Client configuration structures
//!
//! Every field has a default, so an empty TOML or JSON document is a valid
//! configuration. Durations are stored as milliseconds to keep the file
//! format flat; use the accessor methods to get a [`Duration`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    API_VERSION, DEFAULT_BASE_URL, DEFAULT_HEARTBEAT_INTERVAL_MS, DEFAULT_INITIAL_RETRY_DELAY_MS,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_MISSED_HEARTBEATS, DEFAULT_MAX_RETRY_DELAY_MS,
    DEFAULT_QUEUE_RETRY_DELAY_MS, DEFAULT_REALTIME_URL, DEFAULT_REQUEST_TIMEOUT_MS,
};
use crate::errors::{SyncError, SyncResult};

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    /// Push channel; disable for hosts that poll instead.
    pub realtime: RealtimeConfig,
    /// Fixed retry delay shared by the three queues.
    pub queue: QueueConfig,
    pub logging: LoggingConfig,
    /// Stable per-installation identifier. Generated once when absent; the
    /// host is expected to persist it.
    pub client_identifier: Option<Uuid>,
}

impl ClientConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(SyncError::Config("api.base_url must not be empty".into()));
        }
        if self.api.max_concurrency == 0 {
            return Err(SyncError::Config("api.max_concurrency must be greater than 0".into()));
        }
        if self.api.timeout_ms == 0 {
            return Err(SyncError::Config("api.timeout_ms must be greater than 0".into()));
        }
        if self.realtime.heartbeat_interval_ms == 0 {
            return Err(SyncError::Config(
                "realtime.heartbeat_interval_ms must be greater than 0".into(),
            ));
        }
        if self.realtime.max_missed_heartbeats == 0 {
            return Err(SyncError::Config(
                "realtime.max_missed_heartbeats must be greater than 0".into(),
            ));
        }
        if self.realtime.initial_retry_delay_ms == 0 {
            return Err(SyncError::Config(
                "realtime.initial_retry_delay_ms must be greater than 0".into(),
            ));
        }
        if self.realtime.initial_retry_delay_ms > self.realtime.max_retry_delay_ms {
            return Err(SyncError::Config(format!(
                "realtime.initial_retry_delay_ms ({}) exceeds realtime.max_retry_delay_ms ({})",
                self.realtime.initial_retry_delay_ms, self.realtime.max_retry_delay_ms
            )));
        }
        if self.queue.retry_delay_ms == 0 {
            return Err(SyncError::Config("queue.retry_delay_ms must be greater than 0".into()));
        }
        Ok(())
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme and host every endpoint is joined onto.
    pub base_url: String,
    /// Sent as `X-API-Version` on every request.
    pub api_version: String,
    /// Whole-request timeout. A timed-out request is a transient failure
    /// and its batch is retried by the queue.
    pub timeout_ms: u64,
    /// Requests allowed in flight at once across all queues.
    pub max_concurrency: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: API_VERSION.to_string(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl ApiConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Push channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// When off the client never opens a socket.
    pub enabled: bool,
    /// `ws://` or `wss://` listener endpoint, without the token query.
    pub url: String,
    pub heartbeat_interval_ms: u64,
    /// Silent intervals tolerated before the channel is force-closed.
    pub max_missed_heartbeats: u32,
    /// Reconnect delay floor; also the value restored on a successful open.
    pub initial_retry_delay_ms: u64,
    /// Reconnect delay ceiling.
    pub max_retry_delay_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_REALTIME_URL.to_string(),
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            max_missed_heartbeats: DEFAULT_MAX_MISSED_HEARTBEATS,
            initial_retry_delay_ms: DEFAULT_INITIAL_RETRY_DELAY_MS,
            max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
        }
    }
}

impl RealtimeConfig {
    pub const fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub const fn initial_retry_delay(&self) -> Duration {
        Duration::from_millis(self.initial_retry_delay_ms)
    }

    pub const fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }
}

/// Operation queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Fixed delay before re-syncing while operations remain pending.
    pub retry_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { retry_delay_ms: DEFAULT_QUEUE_RETRY_DELAY_MS }
    }
}

impl QueueConfig {
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// One JSON object per line instead of the human format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_yield_defaults() {
        let from_json: ClientConfig = serde_json::from_str("{}").unwrap();
        let from_toml: ClientConfig = toml::from_str("").unwrap();

        assert_eq!(from_json, ClientConfig::default());
        assert_eq!(from_toml, ClientConfig::default());
        assert_eq!(from_json.api.max_concurrency, 5);
        assert_eq!(from_json.realtime.initial_retry_delay(), Duration::from_millis(500));
        assert_eq!(from_json.realtime.max_retry_delay(), Duration::from_secs(120));
        assert_eq!(from_json.queue.retry_delay(), Duration::from_secs(1));
        assert!(from_json.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
client_identifier = "4f7c2a8e-1b3d-4c5e-9f60-7a8b9c0d1e2f"

[api]
base_url = "http://localhost:8080"

[realtime]
heartbeat_interval_ms = 1000
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.api_version, "3");
        assert_eq!(config.realtime.heartbeat_interval(), Duration::from_secs(1));
        assert_eq!(config.realtime.max_missed_heartbeats, 3);
        assert!(config.client_identifier.is_some());
    }

    #[test]
    fn validate_rejects_inverted_retry_bounds() {
        let mut config = ClientConfig::default();
        config.realtime.initial_retry_delay_ms = 10_000;
        config.realtime.max_retry_delay_ms = 1_000;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, SyncError::Config(ref msg) if msg.contains("exceeds")));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = ClientConfig::default();
        config.api.max_concurrency = 0;
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }
}
