//! Request handling and transformation.
//!
//! # Responsibilities
//! - Expose the request ID assigned by the request-id layer
//! - Rewrite a request bound for an upstream host: authority, scheme, path
//!
//! # Design Decisions
//! - `X-Forwarded-Port` only fills in a missing port, never replaces one
//! - `X-Forwarded-Proto` beats `X-Forwarded-Scheme`; default is configurable
//! - Method, body and end-to-end headers pass through untouched

use axum::http::{
    header::{self, InvalidHeaderValue},
    request::Parts,
    uri::Scheme,
    HeaderValue, Request, Uri, Version,
};
use thiserror::Error;

use crate::routing::{ForwardTarget, ForwardedHints};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID set by `SetRequestIdLayer`, or "unknown".
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Errors building the upstream request.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("unsupported forwarding scheme '{0}'")]
    Scheme(String),

    #[error("invalid upstream target: {0}")]
    Uri(#[from] axum::http::Error),

    #[error("invalid upstream host header: {0}")]
    HostHeader(#[from] InvalidHeaderValue),
}

/// Point `parts` at `target`, honouring `X-Forwarded-Port`/`-Proto`/`-Scheme`.
pub fn rewrite_request(
    parts: &mut Parts,
    target: &ForwardTarget,
    default_scheme: &Scheme,
) -> Result<(), RewriteError> {
    let hints = ForwardedHints::from_headers(&parts.headers);

    let authority = match hints.port {
        Some(port) if !target.host.contains(':') => format!("{}:{port}", target.host),
        _ => target.host.clone(),
    };

    let scheme = match hints.effective_scheme() {
        Some(s) if s.eq_ignore_ascii_case("https") => Scheme::HTTPS,
        Some(s) if s.eq_ignore_ascii_case("http") => Scheme::HTTP,
        Some(s) => return Err(RewriteError::Scheme(s.to_string())),
        None => default_scheme.clone(),
    };

    let path = if target.path.starts_with('/') {
        target.path.clone()
    } else {
        format!("/{}", target.path)
    };
    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let uri = Uri::builder()
        .scheme(scheme)
        .authority(authority.as_str())
        .path_and_query(path_and_query)
        .build()?;

    parts
        .headers
        .insert(header::HOST, HeaderValue::from_str(&authority)?);
    parts.uri = uri;
    // The pooled client upgrades to h2 itself when ALPN allows it.
    parts.version = Version::HTTP_11;

    Ok(())
}
