//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Select+connect cycles allowed per accepted client connection.
pub const DEFAULT_MAX_CONNECT_ATTEMPTS: u32 = 3;

/// Times the registry cursor may wrap back to zero within a single selection.
pub const DEFAULT_MAX_REGISTRY_WRAPS: u32 = 2;

/// Root configuration for the dynamic proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Front-facing listener settings.
    pub listener: ListenerConfig,

    /// Service discovery settings.
    pub discovery: DiscoveryConfig,

    /// Backend connection policy.
    pub backend: BackendConfig,

    /// Byte relay settings.
    pub relay: RelayConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Grace period for active relays once shutdown begins, in milliseconds.
    pub drain_timeout_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_connections: 10_000,
            drain_timeout_ms: 30_000,
        }
    }
}

impl ListenerConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

/// Discovery configuration. Immutable once the service is built.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Address of the name-resolution service.
    pub resolver: String,

    /// Service name whose records list the backends.
    pub service: String,

    /// Interval between scheduled refreshes, in milliseconds.
    pub refresh_interval_ms: u64,

    /// Deadline for a single resolution query, in milliseconds.
    pub query_timeout_ms: u64,

    /// Zero-based whitespace field of a matching record that holds the host.
    pub host_field: usize,

    /// Lookup program invoked as `<command> @<resolver> <service>`.
    pub command: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            resolver: "172.17.42.1".to_string(),
            service: "whoami.dev.docker".to_string(),
            refresh_interval_ms: 4_000,
            query_timeout_ms: 400,
            host_field: 4,
            command: "dig".to_string(),
        }
    }
}

impl DiscoveryConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Backend connection policy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Port every discovered backend listens on.
    pub port: u16,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Select+connect cycles per client connection before giving up.
    pub max_connect_attempts: u32,

    /// Cursor wrap-arounds allowed per registry selection.
    pub max_registry_wraps: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            connect_timeout_ms: 400,
            max_connect_attempts: DEFAULT_MAX_CONNECT_ATTEMPTS,
            max_registry_wraps: DEFAULT_MAX_REGISTRY_WRAPS,
        }
    }
}

impl BackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    /// A relay direction ends after this long without readable data, in milliseconds.
    pub idle_timeout_ms: u64,

    /// Read buffer size per direction in bytes.
    pub buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 1_000,
            buffer_size: 16 * 1024,
        }
    }
}

impl RelayConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_launcher_flags() {
        let config = ProxyConfig::default();
        assert_eq!(config.discovery.resolver, "172.17.42.1");
        assert_eq!(config.discovery.service, "whoami.dev.docker");
        assert_eq!(config.discovery.refresh_interval(), Duration::from_secs(4));
        assert_eq!(config.discovery.query_timeout(), Duration::from_millis(400));
        assert_eq!(config.backend.port, 8000);
        assert_eq!(config.backend.max_connect_attempts, 3);
        assert_eq!(config.backend.max_registry_wraps, 2);
        assert_eq!(config.relay.idle_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [discovery]
            service = "api.prod.docker"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.discovery.service, "api.prod.docker");
        assert_eq!(config.discovery.host_field, 4);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener, ListenerConfig::default());
    }
}
