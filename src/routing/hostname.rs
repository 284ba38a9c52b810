//! Hostname syntax validation.
//!
//! # Responsibilities
//! - Accept names that follow RFC 1034 §3.5 and RFC 1123 §2
//! - Accept an optional `:<port>` suffix in 0..=65535
//! - Report the first violation with enough context for a log line
//!
//! # Design Decisions
//! - Single linear pass per label, no allocation unless an error is built
//! - Empty names are valid (no host restriction)
//! - A name needs at least two labels; bare labels such as `localhost` are
//!   treated as ordinary path segments

use thiserror::Error;

/// Maximum byte length of a whole name.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum byte length of a single label.
pub const MAX_LABEL_LEN: usize = 63;

/// Reasons a host candidate is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host has invalid port '{0}', port must be between 0 and 65535")]
    InvalidPort(String),

    #[error("host name length is {0}, can't exceed 255")]
    TooLong(usize),

    #[error("host has an empty label at offset {offset}")]
    EmptyLabel { offset: usize },

    #[error("host label '{label}' has byte length {len}, can't exceed 63")]
    LabelTooLong { label: String, len: usize },

    #[error("host label '{label}' at offset {offset} begins or ends with a hyphen")]
    LabelHyphenEdge { label: String, offset: usize },

    #[error("host has invalid character {ch:?} at offset {offset}")]
    InvalidCharacter { ch: char, offset: usize },

    #[error("host has missing top level domain")]
    MissingTld,

    #[error("host's top level domain '{tld}' at offset {offset} begins with a digit")]
    TldStartsWithDigit { tld: String, offset: usize },
}

impl HostError {
    /// Short stable name, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            HostError::InvalidPort(_) => "invalid_port",
            HostError::TooLong(_) => "too_long",
            HostError::EmptyLabel { .. } => "empty_label",
            HostError::LabelTooLong { .. } => "label_too_long",
            HostError::LabelHyphenEdge { .. } => "label_hyphen_edge",
            HostError::InvalidCharacter { .. } => "invalid_character",
            HostError::MissingTld => "missing_tld",
            HostError::TldStartsWithDigit { .. } => "tld_starts_with_digit",
        }
    }
}

/// Validate `host`, which may carry a `:<port>` suffix.
pub fn validate_host(host: &str) -> Result<(), HostError> {
    let name = match host.split_once(':') {
        Some((name, port)) => {
            if port.parse::<u16>().is_err() {
                return Err(HostError::InvalidPort(port.to_string()));
            }
            name
        }
        None => host,
    };

    if name.is_empty() {
        return Ok(());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(HostError::TooLong(name.len()));
    }

    let mut offset = 0;
    for label in name.split('.') {
        check_label(label, offset)?;
        offset += label.len() + 1;
    }

    // Labels are all non-empty at this point, so the TLD is too.
    let tld_offset = match name.rfind('.') {
        Some(dot) => dot + 1,
        None => return Err(HostError::MissingTld),
    };
    let tld = &name[tld_offset..];
    if tld.as_bytes()[0].is_ascii_digit() {
        return Err(HostError::TldStartsWithDigit {
            tld: tld.to_string(),
            offset: tld_offset,
        });
    }

    Ok(())
}

fn check_label(label: &str, offset: usize) -> Result<(), HostError> {
    if label.is_empty() {
        return Err(HostError::EmptyLabel { offset });
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(HostError::LabelTooLong {
            label: label.to_string(),
            len: label.len(),
        });
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(HostError::LabelHyphenEdge {
            label: label.to_string(),
            offset,
        });
    }
    if let Some((i, ch)) = label
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(HostError::InvalidCharacter {
            ch,
            offset: offset + i,
        });
    }
    Ok(())
}
