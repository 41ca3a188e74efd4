//! Network foundation.
//!
//! # Data Flow
//! ```text
//! OS socket
//!     → listener.rs (bounded accept, connection permits)
//!     → proxy::server (HTTP/1.1 framing, per-connection task)
//! ```

pub mod listener;

pub use listener::{ConnectionPermit, Listener, ListenerError};
