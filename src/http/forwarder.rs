//! Request relay to the configured upstream.
//!
//! # Responsibilities
//! - Log the inbound request before anything is sent
//! - Issue the outbound request (filtered headers, original body, query, cookies)
//! - Buffer the streamed upstream body up to a limit
//! - Log and mirror the upstream response, or answer 502 on transport failure
//!
//! # Design Decisions
//! - Redirects are never followed; 3xx responses are relayed as-is
//! - Zero retries: one upstream attempt per inbound request
//! - The upstream call yields an explicit [`UpstreamOutcome`], matched in `handle`
//! - No cross-request mutable state; the target is fixed at construction

use std::error::Error as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header, HeaderValue, Method};
use futures_util::StreamExt;
use tracing::Instrument;
use url::Url;

use crate::config::ProxyConfig;
use crate::http::headers::HeaderList;
use crate::http::message::{InboundRequest, OutboundRequest, OutboundResponse, UpstreamResponse};
use crate::http::target::{TargetBase, TargetError};
use crate::observability::dump::{ExchangeLog, StdoutDump};

/// Failure to obtain a complete upstream response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("reading body from {url} failed")]
    Body {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("body from {url} exceeds {limit} bytes")]
    BodyTooLarge { url: Url, limit: usize },
}

impl TransportError {
    /// Coarse classification for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request { source, .. } | Self::Body { source, .. } if source.is_timeout() => {
                "timeout"
            }
            Self::Request { source, .. } if source.is_connect() => "connect",
            Self::Request { .. } => "request",
            Self::Body { .. } | Self::BodyTooLarge { .. } => "body",
        }
    }

    /// Message with the full source chain, e.g. the underlying connect error.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            detail.push_str(": ");
            detail.push_str(&err.to_string());
            source = err.source();
        }
        detail
    }
}

/// Result of one upstream call.
#[derive(Debug)]
pub enum UpstreamOutcome {
    Success(UpstreamResponse),
    TransportError(TransportError),
}

/// Error building a forwarder from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("invalid target: {0}")]
    Target(#[from] TargetError),

    #[error("no target configured")]
    MissingTarget,

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Relays requests to a single upstream target.
#[derive(Clone)]
pub struct Forwarder {
    target: TargetBase,
    client: reqwest::Client,
    max_response_body_bytes: usize,
    log: Arc<dyn ExchangeLog>,
}

impl Forwarder {
    pub fn new(target: TargetBase, client: reqwest::Client, max_response_body_bytes: usize) -> Self {
        Self {
            target,
            client,
            max_response_body_bytes,
            log: Arc::new(StdoutDump),
        }
    }

    /// Build the target and upstream client from a validated config.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ForwarderError> {
        let raw = config
            .target
            .base_url
            .as_deref()
            .ok_or(ForwarderError::MissingTarget)?;
        let target = TargetBase::parse(raw)?;

        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_millis(config.timeouts.connect_ms))
            .timeout(Duration::from_millis(config.timeouts.request_ms))
            .pool_max_idle_per_host(config.client.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(config.client.pool_idle_timeout_secs));
        if !config.client.use_env_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self::new(
            target,
            builder.build()?,
            config.limits.max_response_body_bytes,
        ))
    }

    /// Replace the sink receiving request/response dumps.
    pub fn with_log(mut self, log: Arc<dyn ExchangeLog>) -> Self {
        self.log = log;
        self
    }

    pub fn target(&self) -> &TargetBase {
        &self.target
    }

    /// Run one full forwarding cycle.
    pub async fn handle(&self, inbound: InboundRequest) -> OutboundResponse {
        let span = tracing::info_span!(
            "exchange",
            id = %uuid::Uuid::new_v4(),
            method = %inbound.method,
            path = %inbound.path,
        );
        self.relay(inbound).instrument(span).await
    }

    async fn relay(&self, inbound: InboundRequest) -> OutboundResponse {
        let start = Instant::now();
        self.log.request(&inbound);

        let outbound = OutboundRequest::from_inbound(&inbound, &self.target);
        tracing::debug!(url = %outbound.url, "Forwarding request");

        match self.send(outbound).await {
            UpstreamOutcome::Success(upstream) => {
                self.log.response(&upstream);
                tracing::info!(
                    status = upstream.status.as_u16(),
                    bytes = upstream.body.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Relayed upstream response"
                );
                OutboundResponse::from_upstream(upstream)
            }
            UpstreamOutcome::TransportError(error) => {
                self.log.transport_error(&error);
                OutboundResponse::bad_gateway()
            }
        }
    }

    async fn send(&self, outbound: OutboundRequest) -> UpstreamOutcome {
        let url = outbound.url.clone();
        let with_body = carries_body(&outbound.method);
        let mut request = self
            .client
            .request(outbound.method, outbound.url)
            .headers(outbound.headers.to_header_map());
        if with_body {
            // Keep explicit zero-length framing; strict upstreams answer 411 without it.
            if outbound.body.is_empty() {
                request = request.header(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
            }
            request = request.body(outbound.body);
        } else if !outbound.body.is_empty() {
            request = request.body(outbound.body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) => {
                return UpstreamOutcome::TransportError(TransportError::Request { url, source })
            }
        };

        let status = response.status();
        let version = response.version();
        let headers = HeaderList::from_header_map(response.headers());

        match self.read_body(response, &url).await {
            Ok(body) => UpstreamOutcome::Success(UpstreamResponse {
                status,
                version,
                headers,
                body,
            }),
            Err(error) => UpstreamOutcome::TransportError(error),
        }
    }

    async fn read_body(&self, response: reqwest::Response, url: &Url) -> Result<Bytes, TransportError> {
        let limit = self.max_response_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(TransportError::BodyTooLarge { url: url.clone(), limit });
        }

        let mut stream = response.bytes_stream();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| TransportError::Body {
                url: url.clone(),
                source,
            })?;
            if body.len() + chunk.len() > limit {
                return Err(TransportError::BodyTooLarge { url: url.clone(), limit });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(body))
    }
}

/// Methods whose request body has defined semantics.
fn carries_body(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::PATCH].contains(method)
}
