//! Forward proxy binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 FORWARD PROXY                 │
//!                     │                                               │
//!   Client Request    │  ┌─────────┐   ┌─────────┐   ┌────────────┐  │
//!   ──────────────────┼─▶│   net   │──▶│  proxy  │──▶│   target   │  │
//!                     │  │listener │   │ router  │   │  resolver  │  │
//!                     │  └─────────┘   └────┬────┘   └────────────┘  │
//!                     │                     │                         │
//!                     │       method == CONNECT?                     │
//!                     │        │no                │yes               │
//!                     │        ▼                  ▼                  │
//!                     │  ┌────────────┐    ┌────────────┐           │
//!   Client Response   │  │   HTTP     │    │   tunnel   │           │
//!   ◀─────────────────┼──│ forwarder  │    │   relay    │◀──────────┼──── Destination
//!                     │  └────────────┘    └────────────┘           │     (raw TCP)
//!                     │                                               │
//!                     │  ┌─────────────────────────────────────────┐ │
//!                     │  │  config  │  observability  │  lifecycle │ │
//!                     │  └─────────────────────────────────────────┘ │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use forward_proxy::config::loader::load_config;
use forward_proxy::config::ProxyConfig;
use forward_proxy::lifecycle::Shutdown;
use forward_proxy::net::Listener;
use forward_proxy::observability;
use forward_proxy::proxy::ProxyServer;

/// HTTP forward proxy with CONNECT tunneling.
#[derive(Debug, Parser)]
#[command(name = "forward-proxy", version)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen port from the config.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(port) = args.port {
        config.listener.bind_address = format!("0.0.0.0:{port}");
    }

    observability::logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        "forward-proxy v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    let server = ProxyServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
