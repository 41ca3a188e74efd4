//! Proxy server and request router.
//!
//! # Responsibilities
//! - Serve HTTP/1.1 on accepted connections (with upgrade support, so
//!   CONNECT can downgrade to a raw socket)
//! - Route each request by method: CONNECT → tunnel relay, rest → forwarder
//! - Resolve targets at the routing boundary and map failures to 400
//! - Hold the shared outbound HTTP client handle

use std::convert::Infallible;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::sync::broadcast;

use crate::config::{ProxyConfig, TunnelConfig};
use crate::net::Listener;
use crate::proxy::response::{self, ProxyBody};
use crate::proxy::target::Target;
use crate::proxy::{forward, tunnel};

/// Per-request state shared across all in-flight requests.
///
/// The outbound client handle is constructed exactly once, in
/// [`ProxyServer::new`], and cloned here; it can never be observed
/// uninitialized. Clones share the underlying connection pool and are safe
/// for concurrent use.
#[derive(Clone)]
pub struct ProxyState {
    /// Shared outbound HTTP client handle.
    pub client: Client<HttpConnector, ProxyBody>,
    /// Tunnel settings (TCP_NODELAY, Proxy-Agent).
    pub tunnel: TunnelConfig,
}

/// The forward proxy server.
pub struct ProxyServer {
    state: ProxyState,
}

impl ProxyServer {
    /// Create a new proxy server. The outbound HTTP client handle is built
    /// here, before the first request can arrive.
    pub fn new(config: ProxyConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            state: ProxyState {
                client,
                tunnel: config.tunnel,
            },
        }
    }

    /// Accept connections until the shutdown signal fires.
    ///
    /// Each connection gets its own task; a failing request never affects
    /// other connections or the accept loop itself.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Proxy server starting");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer_addr, permit) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            tracing::warn!(error = %err, "Accept failed");
                            continue;
                        }
                    };

                    let state = self.state.clone();
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let service = service_fn(move |req| route(state.clone(), req));

                        // with_upgrades is what lets CONNECT turn this
                        // connection into a raw byte socket.
                        if let Err(err) = http1::Builder::new()
                            .preserve_header_case(true)
                            .serve_connection(io, service)
                            .with_upgrades()
                            .await
                        {
                            tracing::debug!(peer_addr = %peer_addr, error = %err, "Connection ended with error");
                        }
                        drop(permit);
                    });
                }
                _ = shutdown.recv() => {
                    tracing::info!("Proxy server stopping");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Single routing decision point.
///
/// CONNECT goes to the tunnel relay, everything else to the HTTP forwarder;
/// the choice is made once, from the method, and never revisited. Resolution
/// failures are answered 400 here — this boundary is the last line of defense
/// before the connection loop, so the service is infallible.
pub(crate) async fn route(
    state: ProxyState,
    req: Request<Incoming>,
) -> Result<Response<ProxyBody>, Infallible> {
    let raw_target = req.uri().to_string();

    // Method comparison is case-insensitive; clients sending "connect" get
    // tunneled like any other.
    let resp = if req.method().as_str().eq_ignore_ascii_case(Method::CONNECT.as_str()) {
        tracing::debug!(dest = %raw_target, "CONNECT request");
        match Target::from_connect_authority(&raw_target) {
            Ok(target) => tunnel::establish(&state, req, target).await,
            Err(err) => {
                tracing::warn!(dest = %raw_target, error = %err, "Bad CONNECT authority");
                response::bad_request("Bad CONNECT authority\n")
            }
        }
    } else {
        tracing::debug!(method = %req.method(), dest = %raw_target, "HTTP request");
        match Target::from_forward_uri(&raw_target) {
            Ok(target) => forward::forward(&state, req, target).await,
            Err(err) => {
                tracing::warn!(dest = %raw_target, error = %err, "Bad request URI");
                response::bad_request("Bad request URI\n")
            }
        }
    };

    Ok(resp)
}
