//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, headers)
//!     → router.rs (proxy mode? header-first policy?)
//!     → extract.rs (clean path, split leading segment)
//!     → hostname.rs (RFC 1034/1123 syntax check)
//!     → router.rs (does root + path exist?)
//!     → Return: ServeLocal or Forward(host, path)
//! ```
//!
//! # Design Decisions
//! - Pure, allocation-light validation and extraction
//! - Local files always win over a path that also parses as host + path
//! - Invalid hosts degrade silently to static file handling (404 if missing)
//! - Deterministic: same path and filesystem state give the same outcome

pub mod extract;
pub mod hints;
pub mod hostname;
pub mod router;

pub use extract::{clean_path, extract_host, HostSplit};
pub use hints::ForwardedHints;
pub use hostname::{validate_host, HostError};
pub use router::{resolve_under, ForwardTarget, HostSource, Router, RoutingOutcome};
