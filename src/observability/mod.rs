//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
