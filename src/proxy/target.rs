//! Target resolution.
//!
//! Turns a request target string into a structured destination. Two request
//! forms exist: absolute-form URIs on the plain-HTTP path and authority-form
//! (`host:port` / `[ipv6]:port`) on the CONNECT path. Resolution is pure and
//! performs no I/O.

use std::str::FromStr;

use hyper::Uri;
use thiserror::Error;

/// Failure to resolve a request target. Carries no partial target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("empty request target")]
    EmptyTarget,

    #[error("invalid request URI")]
    InvalidUri,

    #[error("request target has no host")]
    MissingHost,

    #[error("unterminated '[' in CONNECT authority")]
    UnterminatedBracket,

    #[error("invalid port {0:?} in request target")]
    InvalidPort(String),
}

/// A resolved destination: host, port, and (forward path only) the raw path
/// plus query to request from it. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub path: Option<String>,
}

impl Target {
    /// Resolve an absolute-form request URI for plain-HTTP forwarding.
    ///
    /// A missing scheme gets `http://` prepended before parsing. The port
    /// defaults to 80 and the path to `/`.
    pub fn from_forward_uri(raw: &str) -> Result<Self, ResolveError> {
        if raw.is_empty() {
            return Err(ResolveError::EmptyTarget);
        }

        let absolute;
        let candidate = if raw.contains("://") {
            raw
        } else {
            absolute = format!("http://{raw}");
            &absolute
        };

        let uri = Uri::from_str(candidate).map_err(|_| ResolveError::InvalidUri)?;
        let host = uri.host().ok_or(ResolveError::MissingHost)?;
        if host.is_empty() {
            return Err(ResolveError::MissingHost);
        }
        let port = match uri.port_u16() {
            Some(0) => return Err(ResolveError::InvalidPort("0".into())),
            Some(p) => p,
            None => 80,
        };
        let path = uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "/".to_string());

        Ok(Self {
            host: host.to_string(),
            port,
            path: Some(path),
        })
    }

    /// Resolve a CONNECT authority: `host:port` or `[ipv6]:port`, with the
    /// port defaulting to 443 when absent.
    pub fn from_connect_authority(raw: &str) -> Result<Self, ResolveError> {
        if raw.is_empty() {
            return Err(ResolveError::EmptyTarget);
        }

        let (host, port) = if let Some(rest) = raw.strip_prefix('[') {
            let close = rest.find(']').ok_or(ResolveError::UnterminatedBracket)?;
            let host = &rest[..close];
            let after = &rest[close + 1..];
            let port = match after.find(':') {
                Some(i) => parse_port(&after[i + 1..])?,
                None => 443,
            };
            (host, port)
        } else {
            match raw.rfind(':') {
                Some(i) => (&raw[..i], parse_port(&raw[i + 1..])?),
                None => (raw, 443),
            }
        };

        if host.is_empty() {
            return Err(ResolveError::MissingHost);
        }

        Ok(Self {
            host: host.to_string(),
            port,
            path: None,
        })
    }

    /// Render `host:port`, bracketing IPv6 literals so the result is usable
    /// as a connect address or URI authority.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Absolute `http://` URI for the outbound client request.
    pub(crate) fn to_outbound_uri(&self) -> Result<Uri, ResolveError> {
        Uri::builder()
            .scheme("http")
            .authority(self.authority())
            .path_and_query(self.path.as_deref().unwrap_or("/"))
            .build()
            .map_err(|_| ResolveError::InvalidUri)
    }
}

fn parse_port(s: &str) -> Result<u16, ResolveError> {
    match s.parse::<u16>() {
        Ok(0) | Err(_) => Err(ResolveError::InvalidPort(s.to_string())),
        Ok(p) => Ok(p),
    }
}
