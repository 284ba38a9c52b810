//! Static file serving from the root directory.
//!
//! # Responsibilities
//! - Serve files, with `index.html` standing in for directories
//! - List directories that have no `index.html`
//!
//! # Design Decisions
//! - `ServeDir` answers first; a listing is only rendered for its 404s
//! - Entries are sorted by name, directories carry a trailing `/`
//! - Links are relative (`./name`) so names with a colon never parse as a scheme

use std::convert::Infallible;
use std::io;
use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, Response, StatusCode},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::routing::resolve_under;

/// Characters escaped in listing links.
const LINK: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Serves files under a root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    inner: ServeDir,
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            inner: ServeDir::new(root).append_index_html_on_directories(true),
            root: root.to_path_buf(),
        }
    }

    /// Answer `request` from disk. Missing files yield 404.
    pub async fn serve(&self, request: Request<Body>) -> Response<Body> {
        let head_only = request.method() == Method::HEAD;
        let path = request.uri().path().to_string();

        let result: Result<_, Infallible> = self.inner.clone().oneshot(request).await;
        let response = match result {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        };
        if response.status() != StatusCode::NOT_FOUND {
            return response;
        }

        let dir = resolve_under(&self.root, &path);
        if !tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
            return response;
        }

        match render_listing(&dir).await {
            Ok(html) => {
                tracing::debug!(path = %path, dir = ?dir, "Directory listing");
                listing_response(html, head_only)
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Cannot list directory");
                response
            }
        }
    }
}

/// HTML listing of the entries in `dir`.
pub async fn render_listing(dir: &Path) -> io::Result<String> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    let mut html = String::from("<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n");
    for name in &names {
        html.push_str(&format!(
            "<a href=\"./{}\">{}</a>\n",
            utf8_percent_encode(name, LINK),
            escape_html(name)
        ));
    }
    html.push_str("</pre>\n");
    Ok(html)
}

fn listing_response(html: String, head_only: bool) -> Response<Body> {
    let length = html.len();
    let body = if head_only { Body::empty() } else { Body::from(html) };

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    response
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
