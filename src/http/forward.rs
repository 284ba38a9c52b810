//! Upstream forwarding.
//!
//! # Responsibilities
//! - Own the pooled HTTP/HTTPS client used for every upstream
//! - Strip hop-by-hop headers in both directions
//! - Map transport failures to gateway status codes
//!
//! # Design Decisions
//! - No retries: a failed fetch is reported to the client as 502/504
//! - Dropping the returned future (client went away) cancels the upstream call
//! - Bodies are streamed, never buffered

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Request, Response, StatusCode},
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::resolve::UpstreamResolver;

pub type HttpsClient = Client<HttpsConnector<HttpConnector<UpstreamResolver>>, Body>;

/// Connection-scoped headers that must not be forwarded.
static HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("proxy-connection"),
    HeaderName::from_static("keep-alive"),
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::TE,
    header::TRAILER,
];

/// Errors while talking to an upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to set up TLS: {0}")]
    Tls(#[from] rustls::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl ForwardError {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ForwardError::Tls(_) | ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Sends rewritten requests upstream.
#[derive(Clone)]
pub struct Forwarder {
    client: HttpsClient,
    upstream_timeout: Duration,
}

impl Forwarder {
    pub fn new(config: &ProxyConfig) -> Result<Self, ForwardError> {
        let mut http =
            HttpConnector::new_with_resolver(UpstreamResolver::new(&config.host_mappings));
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let https = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build(https);

        Ok(Self {
            client,
            upstream_timeout: Duration::from_secs(config.upstream_timeout_secs),
        })
    }

    /// Send `request` (already rewritten to an absolute URI) upstream.
    pub async fn forward(&self, mut request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        strip_hop_by_hop(request.headers_mut());

        let response = tokio::time::timeout(self.upstream_timeout, self.client.request(request))
            .await
            .map_err(|_| ForwardError::Timeout(self.upstream_timeout))??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}
