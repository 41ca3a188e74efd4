//! Process lifecycle coordination.
//!
//! # Data Flow
//! ```text
//! SIGINT / programmatic trigger
//!     → shutdown.rs (broadcast to subscribers)
//!     → accept loop stops, in-flight work drains
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
