//! Plain-HTTP forwarding.
//!
//! # Responsibilities
//! - Build the outbound request from the resolved target
//! - Copy forwardable headers, in order
//! - Stream the request body out and the response body back, unbuffered
//! - Map upstream failures to 502

use std::time::Instant;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Request, Response};

use crate::observability::metrics;
use crate::proxy::headers::copy_forwardable;
use crate::proxy::response::{self, ProxyBody};
use crate::proxy::server::ProxyState;
use crate::proxy::target::Target;

/// Forward `req` to `target` and relay the upstream response.
///
/// The inbound body is handed to the outbound request as-is, so bytes flow
/// through without buffering and downstream slowness propagates to the
/// client. The upstream response passes through the same way: status and
/// headers are mirrored unmodified, the body is streamed as it arrives.
pub async fn forward(
    state: &ProxyState,
    req: Request<Incoming>,
    target: Target,
) -> Response<ProxyBody> {
    let start = Instant::now();
    let method = req.method().clone();

    let (parts, body) = req.into_parts();

    let outbound_uri = match target.to_outbound_uri() {
        Ok(uri) => uri,
        Err(err) => {
            tracing::warn!(dest = %target.authority(), error = %err, "Failed to build outbound URI");
            metrics::record_forward(method.as_str(), 502, start);
            return response::bad_gateway("Bad Gateway\n");
        }
    };

    let mut builder = Request::builder().method(parts.method).uri(outbound_uri);
    if let Some(headers) = builder.headers_mut() {
        copy_forwardable(&parts.headers, headers);
    }

    // Headers are attached before the body starts moving; the send cannot
    // begin until the client handle drives this request.
    let outbound = match builder.body(body.boxed()) {
        Ok(outbound) => outbound,
        Err(err) => {
            tracing::error!(dest = %target.authority(), error = %err, "Failed to prepare outbound request");
            metrics::record_forward(method.as_str(), 502, start);
            return response::bad_gateway("Bad Gateway\n");
        }
    };

    match state.client.request(outbound).await {
        Ok(upstream) => {
            let status = upstream.status();
            tracing::debug!(
                method = %method,
                dest = %target.authority(),
                status = %status,
                "Forwarded request"
            );
            metrics::record_forward(method.as_str(), status.as_u16(), start);
            // Status, headers and body mirrored as-is; hyper re-frames the
            // client-side response itself.
            upstream.map(|b| b.boxed())
        }
        Err(err) => {
            tracing::error!(
                method = %method,
                dest = %target.authority(),
                error = %err,
                "Upstream request failed"
            );
            metrics::record_forward(method.as_str(), 502, start);
            response::bad_gateway("Bad Gateway\n")
        }
    }
}
