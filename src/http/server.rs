//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the mixed handler
//! - Wire up middleware (tracing, request ID, timeout)
//! - Bind server to listener, shut down gracefully
//! - Dispatch each request to the file server or the upstream forwarder

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{uri::Scheme, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::files::StaticFiles;
use crate::http::forward::{ForwardError, Forwarder};
use crate::http::request::{request_id, rewrite_request};
use crate::http::response::apply_cors;
use crate::observability::metrics::{self, OUTCOME_LOCAL, OUTCOME_PROXY};
use crate::routing::{ForwardTarget, Router as MixedRouter, RoutingOutcome};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<MixedRouter>,
    pub files: StaticFiles,
    pub forwarder: Forwarder,
    pub default_scheme: Scheme,
}

/// HTTP server for static files and transparent forwarding.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, ForwardError> {
        let state = AppState {
            router: Arc::new(MixedRouter::from_config(&config)),
            files: StaticFiles::new(&config.files.root),
            forwarder: Forwarder::new(&config.proxy)?,
            default_scheme: config.proxy.scheme(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(mixed_handler))
            .route("/", any(mixed_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            root = %self.config.files.root.display(),
            proxy = self.config.proxy.enabled,
            policy = ?self.config.proxy.policy,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Entry point for every request: local file or upstream.
async fn mixed_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let outcome = state
        .router
        .decide(request.uri().path(), request.headers())
        .await;

    match outcome {
        RoutingOutcome::ServeLocal => {
            let response = state.files.serve(request).await;
            metrics::record_request(OUTCOME_LOCAL, &method, response.status().as_u16(), start_time);
            response
        }
        RoutingOutcome::Forward(target) => {
            let response = proxy(&state, request, &target).await;
            metrics::record_request(OUTCOME_PROXY, &method, response.status().as_u16(), start_time);
            response
        }
    }
}

async fn proxy(state: &AppState, request: Request<Body>, target: &ForwardTarget) -> Response {
    let request_id = request_id(&request).to_string();
    let (mut parts, body) = request.into_parts();

    if let Err(e) = rewrite_request(&mut parts, target, &state.default_scheme) {
        tracing::warn!(request_id = %request_id, host = %target.host, error = %e, "Cannot build upstream request");
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    tracing::debug!(
        request_id = %request_id,
        upstream = %parts.uri,
        source = ?target.source,
        "Forwarding request"
    );

    match state.forwarder.forward(Request::from_parts(parts, body)).await {
        Ok(mut response) => {
            apply_cors(response.headers_mut());
            response
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, host = %target.host, error = %e, "Upstream error");
            (e.status(), "Upstream request failed").into_response()
        }
    }
}
