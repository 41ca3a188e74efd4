//! Hop-by-hop header filtering.
//!
//! These headers govern a single connection leg; copied verbatim across the
//! proxy boundary they would corrupt the new connection's framing (a stale
//! `Transfer-Encoding`, a per-hop `Connection` token, an echoed `Upgrade`).
//! Everything else is forwarded unchanged, in order, duplicates included.

use hyper::header::HeaderMap;

/// Headers that are never forwarded to the destination.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Whether a header of this name may be copied onto the outbound request.
/// Matching is case-insensitive.
pub fn is_forwardable(name: &str) -> bool {
    !HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Copy every forwardable header from `src` to `dst`, preserving order and
/// duplicates.
pub fn copy_forwardable(src: &HeaderMap, dst: &mut HeaderMap) {
    for (name, value) in src {
        if is_forwardable(name.as_str()) {
            dst.append(name.clone(), value.clone());
        }
    }
}
