//! Proxy core.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (HTTP/1.1 framing, request router)
//!     → target.rs (resolve URI / CONNECT authority)
//!     → method == CONNECT?
//!          no  → forward.rs (headers.rs filters, body streamed both ways)
//!          yes → tunnel.rs (connect, upgrade, bidirectional byte relay)
//! ```
//!
//! # Design Decisions
//! - Exactly one of forwarder/relay handles a request, picked once by method
//! - Resolution happens in the router so every malformed target maps to 400
//!   at a single boundary
//! - The destination connection is confirmed before anything is promised to
//!   the client (no 200 before a successful connect)

pub mod forward;
pub mod headers;
pub mod response;
pub mod server;
pub mod target;
pub mod tunnel;

pub use server::{ProxyServer, ProxyState};
pub use target::{ResolveError, Target};
pub use tunnel::TunnelBridge;
