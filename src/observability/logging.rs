//! Structured logging.
//!
//! Uses the tracing crate; the level comes from `RUST_LOG` when set, falling
//! back to the configured level for this crate.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber. Call once at startup.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("forward_proxy={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
