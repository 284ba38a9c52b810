//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, access log, timeout)
//!     → routing::Router (ServeLocal or Forward)
//!     → files.rs (ServeDir over the root directory)
//!       or
//!     → request.rs (rewrite authority, scheme, path)
//!     → forward.rs (pooled client, hop-by-hop stripping)
//!       via resolve.rs (host mappings, then DNS)
//!     → response.rs (CORS headers)
//!     → Send to client
//! ```

pub mod files;
pub mod forward;
pub mod request;
pub mod resolve;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::{request_id, rewrite_request, RewriteError, X_REQUEST_ID};
pub use response::{apply_cors, with_cors, CORS_HEADERS};
pub use server::HttpServer;
