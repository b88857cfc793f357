//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream target and request header policy.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
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

/// Where requests are forwarded and what gets stripped on the way.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream service (e.g., "https://api.example.com").
    ///
    /// Left unset, the proxy still starts but answers every request with a
    /// configuration error.
    pub target_domain: Option<String>,

    /// Request header names to strip before forwarding (case-insensitive).
    pub remove_headers: Vec<String>,

    /// Outbound connection pool tuning.
    pub client: ClientConfig,
}

/// Outbound HTTP client tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Idle connections kept per upstream host.
    pub pool_max_idle_per_host: usize,

    /// Seconds before an idle pooled connection is closed.
    pub pool_idle_timeout_secs: u64,

    /// Disable Nagle on upstream sockets.
    pub tcp_nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 32,
            pool_idle_timeout_secs: 90,
            tcp_nodelay: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
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
    fn empty_document_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.upstream.target_domain.is_none());
        assert!(config.upstream.remove_headers.is_empty());
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn parses_full_document() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [upstream]
            target_domain = "https://api.example.com"
            remove_headers = ["Authorization", "x-api-key"]

            [upstream.client]
            pool_max_idle_per_host = 4

            [observability]
            log_format = "json"
            metrics_enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(
            config.upstream.target_domain.as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(config.upstream.remove_headers, vec!["Authorization", "x-api-key"]);
        assert_eq!(config.upstream.client.pool_max_idle_per_host, 4);
        assert_eq!(config.upstream.client.pool_idle_timeout_secs, 90);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.observability.metrics_enabled);
    }
}
