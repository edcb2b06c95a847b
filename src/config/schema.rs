//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream target the proxy forwards every request to.
    pub target: TargetConfig,

    /// Timeout configuration for the upstream client.
    pub timeouts: TimeoutConfig,

    /// Body size limits in both directions.
    pub limits: LimitConfig,

    /// Outbound client pool settings.
    pub client: ClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream target configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    /// Upstream base URL (e.g., "https://api.example.com").
    /// Overridden by the `TARGET_BASE` environment variable.
    pub base_url: Option<String>,
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Total time for one upstream exchange (body included) in milliseconds.
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            request_ms: 30_000,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitConfig {
    /// Largest inbound request body accepted, in bytes.
    pub max_request_body_bytes: usize,

    /// Largest upstream response body buffered, in bytes.
    pub max_response_body_bytes: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_request_body_bytes: 10 * 1024 * 1024,  // 10MB
            max_response_body_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum idle pooled connections kept per upstream host.
    pub pool_max_idle_per_host: usize,

    /// How long an idle pooled connection is kept, in seconds.
    pub pool_idle_timeout_secs: u64,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_env_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 32,
            pool_idle_timeout_secs: 90,
            use_env_proxy: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.target.base_url.is_none());
        assert_eq!(config.timeouts.request_ms, 30_000);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [target]
            base_url = "http://up.test/api"

            [timeouts]
            request_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.target.base_url.as_deref(), Some("http://up.test/api"));
        assert_eq!(config.timeouts.request_ms, 1500);
        assert_eq!(config.timeouts.connect_ms, 5_000);
        assert_eq!(config.limits, LimitConfig::default());
    }
}
