//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::http::uri::Scheme;
use serde::{Deserialize, Serialize};

/// Root configuration for the mixed file/proxy server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Static file settings.
    pub files: FilesConfig,

    /// Transparent proxy settings.
    pub proxy: ProxyConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address, e.g. "0.0.0.0:8080". A bare ":8080" binds all interfaces.
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Parse the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        match self.bind_address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}").parse(),
            None => self.bind_address.parse(),
        }
    }
}

/// Static file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory served as the document root.
    pub root: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// How `X-Forwarded-Host` takes part in the routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingPolicy {
    /// Only the URL path decides; forwarding headers are ignored for routing.
    #[default]
    PathFirst,
    /// A present `X-Forwarded-Host` forwards immediately, without a file check.
    HeaderFirst,
}

/// Transparent proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Forward requests whose path starts with a host and has no local file.
    pub enabled: bool,

    /// Routing policy for forwarding headers.
    pub policy: RoutingPolicy,

    /// Scheme used when no `X-Forwarded-Proto`/`X-Forwarded-Scheme` is sent.
    pub default_scheme: String,

    /// Upstream connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Time allowed for upstream response headers in seconds.
    pub upstream_timeout_secs: u64,

    /// Maximum idle pooled connections per upstream host.
    pub pool_max_idle_per_host: usize,

    /// Upstream hosts resolved to a fixed address instead of DNS.
    /// The port still comes from the request.
    pub host_mappings: BTreeMap<String, IpAddr>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            policy: RoutingPolicy::PathFirst,
            default_scheme: "https".to_string(),
            connect_timeout_secs: 10,
            upstream_timeout_secs: 60,
            pool_max_idle_per_host: 16,
            host_mappings: BTreeMap::new(),
        }
    }
}

impl ProxyConfig {
    /// The fallback scheme; anything other than `http` means `https`.
    pub fn scheme(&self) -> Scheme {
        if self.default_scheme.eq_ignore_ascii_case("http") {
            Scheme::HTTP
        } else {
            Scheme::HTTPS
        }
    }
}

/// Timeout configuration for the whole request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 120 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
