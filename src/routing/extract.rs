//! Host extraction from URL paths.
//!
//! `/example.com/a/b` is read as "forward `/a/b` to `example.com`". Paths
//! whose first segment is not a valid host are left alone and treated as
//! local file paths.

use crate::routing::hostname::{validate_host, HostError};

/// Result of splitting a URL path into host and forwarding path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSplit {
    /// Validated host (with optional port), or empty when the path has none.
    pub host: String,
    /// Path to forward, or the whole path when `host` is empty.
    pub remainder: String,
    /// Why a non-empty leading segment was not accepted as a host.
    pub rejection: Option<HostError>,
}

/// Split the leading segment of `url_path` off as a host candidate.
pub fn extract_host(url_path: &str) -> HostSplit {
    let path = if url_path.starts_with('/') {
        url_path.to_string()
    } else {
        format!("/{url_path}")
    };

    let cleaned = clean_path(&path);
    let candidate = cleaned[1..].split('/').next().unwrap_or_default();

    if candidate.is_empty() {
        return HostSplit {
            host: String::new(),
            remainder: path,
            rejection: None,
        };
    }

    if let Err(err) = validate_host(candidate) {
        return HostSplit {
            host: String::new(),
            remainder: path,
            rejection: Some(err),
        };
    }

    // Keep the caller's spelling of the rest of the path (trailing slash,
    // repeated slashes) unless cleaning moved the host segment.
    let remainder = match path.trim_start_matches('/').strip_prefix(candidate) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.to_string(),
        _ => cleaned[1 + candidate.len()..].to_string(),
    };

    HostSplit {
        host: candidate.to_string(),
        remainder,
        rejection: None,
    }
}

/// Lexically clean a slash-separated URL path.
///
/// Collapses repeated slashes, drops `.` segments, resolves `..` against the
/// preceding segment (never climbing above the root of a rooted path) and
/// removes trailing slashes. Backslashes are ordinary characters. An empty
/// result is `.` for relative paths and `/` for rooted ones.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if !rooted => segments.push(".."),
                _ => {}
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
