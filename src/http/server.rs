//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router binding the forwarder to every path
//! - Restrict methods to GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS
//! - Wire up middleware (tracing, request body limit)
//! - Bind server to listener
//!
//! # Design Decisions
//! - No health endpoint: every path, root included, is forwarded
//! - No graceful shutdown; the server runs until the process ends

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Uri, Version},
    routing::{on, MethodFilter},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::forwarder::{Forwarder, ForwarderError};
use crate::http::message::{InboundRequest, OutboundResponse};
use crate::http::target::TargetBase;

/// Methods the proxy accepts; anything else is answered with 405.
pub const FORWARDED_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::HEAD)
    .or(MethodFilter::OPTIONS);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// Error constructing the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Forwarder(#[from] ForwarderError),
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    target: TargetBase,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let forwarder = Forwarder::from_config(&config)?;
        Ok(Self::with_forwarder(config, forwarder))
    }

    /// Create a server around an already-built forwarder.
    pub fn with_forwarder(config: ProxyConfig, forwarder: Forwarder) -> Self {
        let target = forwarder.target().clone();
        let state = AppState {
            forwarder: Arc::new(forwarder),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            target,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", on(FORWARDED_METHODS, proxy_handler))
            .route("/{*path}", on(FORWARDED_METHODS, proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(DefaultBodyLimit::max(config.limits.max_request_body_bytes)),
            )
    }

    /// Router for in-process use (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            target = %self.target,
            "HTTP server starting"
        );

        axum::serve(listener, self.router).await
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn target(&self) -> &TargetBase {
        &self.target
    }
}

/// Main proxy handler: every accepted request is relayed upstream.
async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
) -> OutboundResponse {
    let inbound = InboundRequest::from_parts(method, &uri, version, &headers, body);
    state.forwarder.handle(inbound).await
}
