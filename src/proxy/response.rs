//! Synthetic responses and body adapters.
//!
//! hyper 1.x services need a single body type; everything the proxy sends is
//! normalized to a boxed body so upstream bodies can be streamed through and
//! synthetic error bodies can be built locally.

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};

/// Body type produced by the proxy service.
pub type ProxyBody = BoxBody<Bytes, hyper::Error>;

/// An empty body (tunnel 200 responses).
pub fn empty() -> ProxyBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

/// A complete in-memory body (error responses).
pub fn full<T: Into<Bytes>>(chunk: T) -> ProxyBody {
    Full::new(chunk.into()).map_err(|never| match never {}).boxed()
}

/// A plaintext response with the given status.
pub fn plaintext(status: StatusCode, body: &'static str) -> Response<ProxyBody> {
    let mut resp = Response::new(full(body));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    resp
}

/// 400 for malformed targets and unexpected faults.
pub fn bad_request(body: &'static str) -> Response<ProxyBody> {
    plaintext(StatusCode::BAD_REQUEST, body)
}

/// 502 for destinations that cannot be reached or spoken to.
pub fn bad_gateway(body: &'static str) -> Response<ProxyBody> {
    plaintext(StatusCode::BAD_GATEWAY, body)
}
