//! CONNECT tunneling.
//!
//! After a successful CONNECT the proxy stops interpreting HTTP: it opens a
//! TCP connection to the target, downgrades the client connection to a raw
//! socket, and relays bytes in both directions until either side closes.
//!
//! Per-tunnel lifecycle: Connecting → Established → Relaying → Closed, with
//! failures in Connecting answered as framed 502 (the HTTP response path is
//! still available there) and later failures tearing down both sockets.

use hyper::body::Incoming;
use hyper::header::HeaderName;
use hyper::Request;
use hyper::Response;
use hyper_util::rt::TokioIo;
use tokio::io::{copy_bidirectional, AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::observability::metrics;
use crate::proxy::response::{self, ProxyBody};
use crate::proxy::server::ProxyState;
use crate::proxy::target::Target;

static PROXY_AGENT: HeaderName = HeaderName::from_static("proxy-agent");

/// A paired client/server socket bridge.
///
/// Owns both ends for the lifetime of the tunnel: when `run` returns, for
/// whatever reason, both sockets are dropped together. A tunnel can never be
/// left with exactly one side open.
pub struct TunnelBridge<C, S> {
    client: C,
    server: S,
}

impl<C, S> TunnelBridge<C, S>
where
    C: AsyncRead + AsyncWrite + Unpin,
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(client: C, server: S) -> Self {
        Self { client, server }
    }

    /// Relay bytes symmetrically until either side reaches EOF or errors.
    ///
    /// Returns the number of bytes copied client→server and server→client.
    /// EOF on one side shuts down the write half of the other; an error ends
    /// the relay outright. Either way both sockets close when this returns.
    pub async fn run(mut self) -> std::io::Result<(u64, u64)> {
        copy_bidirectional(&mut self.client, &mut self.server).await
    }
}

/// Establish a tunnel for a CONNECT request.
///
/// Connects to the target first; only once the destination connection is
/// confirmed does the client get its 200 and the socket downgrade. The
/// upgrade itself completes after this response is written, in a spawned
/// task.
pub async fn establish(
    state: &ProxyState,
    req: Request<Incoming>,
    target: Target,
) -> Response<ProxyBody> {
    let addr = target.authority();

    // Connecting: failure here still has the framed response path.
    let server_stream = match TcpStream::connect(&addr).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(dest = %addr, error = %err, "Failed to connect to destination");
            metrics::tunnel_failed("connect_error");
            return response::bad_gateway("Bad Gateway\n");
        }
    };
    if state.tunnel.tcp_nodelay {
        if let Err(err) = server_stream.set_nodelay(true) {
            tracing::debug!(dest = %addr, error = %err, "Failed to set TCP_NODELAY");
        }
    }

    metrics::tunnel_opened();

    tokio::spawn(async move {
        // Established: downgrade the client connection to a raw socket. The
        // upgrade resolves once hyper has written the 200 below.
        match hyper::upgrade::on(req).await {
            Ok(upgraded) => {
                let bridge = TunnelBridge::new(TokioIo::new(upgraded), server_stream);
                match bridge.run().await {
                    Ok((up, down)) => {
                        tracing::debug!(
                            dest = %addr,
                            bytes_up = up,
                            bytes_down = down,
                            "Tunnel closed"
                        );
                        metrics::tunnel_closed(up, down);
                    }
                    Err(err) => {
                        tracing::debug!(dest = %addr, error = %err, "Tunnel closed with error");
                        metrics::tunnel_closed(0, 0);
                    }
                }
            }
            Err(err) => {
                // Downgrade failed: the destination socket goes down with it.
                tracing::error!(dest = %addr, error = %err, "Client upgrade failed");
                drop(server_stream);
                metrics::tunnel_closed(0, 0);
            }
        }
    });

    // Synthetic 200; hyper writes it exactly once and then performs the
    // upgrade, so no explicit "Connection Established" line is emitted here.
    let mut resp = Response::new(response::empty());
    if let Some(agent) = &state.tunnel.proxy_agent {
        if let Ok(value) = agent.parse() {
            resp.headers_mut().insert(PROXY_AGENT.clone(), value);
        }
    }
    resp
}
