//! Response handling and transformation.
//!
//! # Responsibilities
//! - Grant cross-origin access on every proxied response
//!
//! # Design Decisions
//! - Rewriting is a pure function over the header map, so applying it twice
//!   changes nothing the second time
//! - A header already holding exactly the required value is left alone;
//!   any other value (or several values) is replaced

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// CORS headers forced onto proxied responses.
pub static CORS_HEADERS: [(HeaderName, &str); 4] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_METHODS,
        "POST, GET, OPTIONS, PUT, DELETE, HEAD, PATCH",
    ),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization",
    ),
    (header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"),
];

/// Return `headers` with the permissive CORS headers in place.
pub fn with_cors(mut headers: HeaderMap) -> HeaderMap {
    for (name, value) in &CORS_HEADERS {
        if !holds_exactly(&headers, name, value) {
            headers.insert(name.clone(), HeaderValue::from_static(*value));
        }
    }
    headers
}

/// In-place form of [`with_cors`].
pub fn apply_cors(headers: &mut HeaderMap) {
    *headers = with_cors(std::mem::take(headers));
}

fn holds_exactly(headers: &HeaderMap, name: &HeaderName, value: &str) -> bool {
    let mut values = headers.get_all(name).iter();
    match (values.next(), values.next()) {
        (Some(current), None) => current.as_bytes() == value.as_bytes(),
        _ => false,
    }
}
