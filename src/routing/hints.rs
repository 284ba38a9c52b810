//! Forwarding headers set by an upstream proxy.

use axum::http::HeaderMap;

pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_PORT: &str = "x-forwarded-port";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_FORWARDED_SCHEME: &str = "x-forwarded-scheme";

/// Host, port and scheme hints read from `X-Forwarded-*` headers.
///
/// Only the first value of each header is used; blank or non-UTF-8 values
/// count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedHints<'a> {
    pub host: Option<&'a str>,
    pub port: Option<&'a str>,
    pub proto: Option<&'a str>,
    pub scheme: Option<&'a str>,
}

impl<'a> ForwardedHints<'a> {
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        Self {
            host: header_str(headers, X_FORWARDED_HOST),
            port: header_str(headers, X_FORWARDED_PORT),
            proto: header_str(headers, X_FORWARDED_PROTO),
            scheme: header_str(headers, X_FORWARDED_SCHEME),
        }
    }

    /// `X-Forwarded-Proto`, falling back to `X-Forwarded-Scheme`.
    pub fn effective_scheme(&self) -> Option<&'a str> {
        self.proto.or(self.scheme)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_hints_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-Host", HeaderValue::from_static("api.example.com"));
        headers.insert("x-forwarded-port", HeaderValue::from_static(" 8443 "));
        headers.insert("X-Forwarded-Scheme", HeaderValue::from_static("http"));

        let hints = ForwardedHints::from_headers(&headers);
        assert_eq!(hints.host, Some("api.example.com"));
        assert_eq!(hints.port, Some("8443"));
        assert_eq!(hints.proto, None);
        assert_eq!(hints.effective_scheme(), Some("http"));
    }

    #[test]
    fn test_proto_wins_over_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));
        headers.insert(X_FORWARDED_SCHEME, HeaderValue::from_static("http"));
        assert_eq!(ForwardedHints::from_headers(&headers).effective_scheme(), Some("https"));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_HOST, HeaderValue::from_static("  "));
        assert_eq!(ForwardedHints::from_headers(&headers), ForwardedHints::default());
    }
}
