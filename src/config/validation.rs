//! Semantic configuration checks, run after deserialization.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic validation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    MaxConnections,

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    MetricsAddress(String),

    #[error("tunnel.proxy_agent must not be empty when set")]
    EmptyProxyAgent,
}

/// Validate a deserialized configuration. Collects every failure rather than
/// stopping at the first.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if matches!(&config.tunnel.proxy_agent, Some(agent) if agent.is_empty()) {
        errors.push(ValidationError::EmptyProxyAgent);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
