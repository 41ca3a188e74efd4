//! Forward Proxy Library
//!
//! An HTTP/1.1 forward proxy: plain requests are forwarded to their
//! destination and the response relayed back; `CONNECT` requests open a raw
//! TCP tunnel and bytes are bridged in both directions without
//! interpretation.

pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;

pub use config::schema::ProxyConfig;
pub use lifecycle::Shutdown;
pub use net::Listener;
pub use proxy::ProxyServer;
