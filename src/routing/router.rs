//! Per-request routing decision.
//!
//! # Responsibilities
//! - Decide between serving a local file and forwarding upstream
//! - Apply the configured policy for `X-Forwarded-Host`
//! - Check the root directory so that existing files win over proxying
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - One metadata lookup per candidate request, no content read
//! - Any metadata error counts as "missing" and triggers forwarding

use std::path::{Path, PathBuf};

use axum::http::HeaderMap;
use percent_encoding::percent_decode_str;

use crate::config::{RoutingPolicy, ServerConfig};
use crate::observability::metrics;
use crate::routing::extract::{clean_path, extract_host};
use crate::routing::hints::ForwardedHints;

/// Where the host of a forwarded request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSource {
    /// Leading segment of the URL path.
    Path,
    /// `X-Forwarded-Host` header.
    Header,
}

/// Destination of a forwarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardTarget {
    pub host: String,
    pub path: String,
    pub source: HostSource,
}

/// Outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingOutcome {
    ServeLocal,
    Forward(ForwardTarget),
}

/// Routes requests between the root directory and upstream hosts.
#[derive(Debug, Clone)]
pub struct Router {
    root: PathBuf,
    proxy_enabled: bool,
    policy: RoutingPolicy,
}

impl Router {
    pub fn new(root: impl Into<PathBuf>, proxy_enabled: bool, policy: RoutingPolicy) -> Self {
        Self {
            root: root.into(),
            proxy_enabled,
            policy,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.files.root.clone(),
            config.proxy.enabled,
            config.proxy.policy,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decide how to handle a request for `path` carrying `headers`.
    pub async fn decide(&self, path: &str, headers: &HeaderMap) -> RoutingOutcome {
        if !self.proxy_enabled {
            return RoutingOutcome::ServeLocal;
        }

        if self.policy == RoutingPolicy::HeaderFirst {
            if let Some(host) = ForwardedHints::from_headers(headers).host {
                return RoutingOutcome::Forward(ForwardTarget {
                    host: host.to_string(),
                    path: path.to_string(),
                    source: HostSource::Header,
                });
            }
        }

        let split = extract_host(path);
        if let Some(err) = &split.rejection {
            tracing::trace!(path = %path, error = %err, "Leading segment is not a host");
            metrics::record_host_rejected(err.reason());
        }
        if split.host.is_empty() {
            return RoutingOutcome::ServeLocal;
        }

        let local = self.local_path(path);
        match tokio::fs::metadata(&local).await {
            Ok(_) => {
                tracing::trace!(path = %path, local = ?local, "Local file takes precedence");
                RoutingOutcome::ServeLocal
            }
            Err(err) => {
                tracing::trace!(path = %path, error = %err, "No local file, forwarding");
                RoutingOutcome::Forward(ForwardTarget {
                    host: split.host,
                    path: split.remainder,
                    source: HostSource::Path,
                })
            }
        }
    }

    /// Filesystem location of a request path under the root directory.
    pub fn local_path(&self, path: &str) -> PathBuf {
        resolve_under(&self.root, path)
    }
}

/// Join a request path onto `root`.
///
/// The path is percent-decoded and cleaned first, so `..` segments can
/// never leave the root.
pub fn resolve_under(root: &Path, path: &str) -> PathBuf {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let rooted = if decoded.starts_with('/') {
        clean_path(&decoded)
    } else {
        clean_path(&format!("/{decoded}"))
    };
    root.join(rooted.trim_start_matches('/'))
}
