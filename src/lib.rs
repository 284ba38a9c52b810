//! Static file server with transparent path-based proxying.
//!
//! Requests are answered from a root directory. With proxy mode on, a
//! request such as `/example.com/a/b` that has no local file is forwarded
//! to `https://example.com/a/b`, and the response comes back with
//! permissive CORS headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
