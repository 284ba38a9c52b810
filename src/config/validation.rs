//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the root directory and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure apart from one metadata lookup on the root directory
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServerConfig;
use crate::routing::validate_host;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("files.root '{}' is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("proxy.default_scheme '{0}' must be 'http' or 'https'")]
    DefaultScheme(String),

    #[error("proxy.host_mappings key '{0}' is not a hostname")]
    HostMapping(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("observability.log_level '{0}' is not a valid filter directive")]
    LogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if !config.files.root.is_dir() {
        errors.push(ValidationError::RootNotDirectory(config.files.root.clone()));
    }

    let scheme = config.proxy.default_scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        errors.push(ValidationError::DefaultScheme(config.proxy.default_scheme.clone()));
    }

    for host in config.proxy.host_mappings.keys() {
        if host.contains(':') || validate_host(host).is_err() {
            errors.push(ValidationError::HostMapping(host.clone()));
        }
    }

    for (name, secs) in [
        ("proxy.connect_timeout_secs", config.proxy.connect_timeout_secs),
        ("proxy.upstream_timeout_secs", config.proxy.upstream_timeout_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
