//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forward proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// CONNECT tunnel settings.
    pub tunnel: TunnelConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum concurrent client connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_connections: 10_000,
        }
    }
}

/// CONNECT tunnel settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// Set TCP_NODELAY on destination sockets.
    pub tcp_nodelay: bool,

    /// Optional `Proxy-Agent` header value added to the synthetic 200
    /// response when a tunnel is established.
    pub proxy_agent: Option<String>,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            tcp_nodelay: true,
            proxy_agent: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert!(config.listener.max_connections > 0);
        assert!(config.tunnel.tcp_nodelay);
        assert!(config.tunnel.proxy_agent.is_none());
    }

    #[test]
    fn minimal_toml_deserializes_with_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn partial_toml_overrides() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:8100"

            [tunnel]
            proxy_agent = "forward-proxy/0.1"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8100");
        assert_eq!(config.listener.max_connections, 10_000);
        assert_eq!(config.tunnel.proxy_agent.as_deref(), Some("forward-proxy/0.1"));
    }
}
