//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

use http_forward_proxy::config::ProxyConfig;
use http_forward_proxy::http::{InboundRequest, TransportError, UpstreamResponse};
use http_forward_proxy::observability::ExchangeLog;
use http_forward_proxy::{Forwarder, HttpServer};

/// Size of the body served at `/api/binary`.
pub const BINARY_LEN: usize = 10_000;

/// Request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type Captures = Arc<Mutex<Vec<Captured>>>;

pub fn binary_body() -> Vec<u8> {
    (0..BINARY_LEN).map(|i| (i % 251) as u8).collect()
}

/// Start a mock upstream on an ephemeral loopback port.
///
/// Routes (all under `/api`):
/// - `/api/v1/users` → 200 JSON `{"id":1}`
/// - `/api/redirect` → 302 with `Location: /api/elsewhere`
/// - `/api/missing`  → 404 text
/// - `/api/binary`   → 200 `image/png`, [`BINARY_LEN`] bytes
/// - `/api/hop`      → 200 with hop-by-hop headers alongside `x-upstream`
/// - `/api/slow`     → 200 after two seconds
/// - anything else   → 200 echoing the request body
pub async fn start_mock_upstream() -> (SocketAddr, Captures) {
    let captures: Captures = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .fallback(upstream_handler)
        .with_state(captures.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, captures)
}

async fn upstream_handler(
    State(captures): State<Captures>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    captures.lock().unwrap().push(Captured {
        method,
        uri: uri.clone(),
        headers: headers.clone(),
        body: body.clone(),
    });

    match uri.path() {
        "/api/v1/users" => (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"id":1}"#,
        )
            .into_response(),
        "/api/redirect" => (
            StatusCode::FOUND,
            [(header::LOCATION, "/api/elsewhere")],
            "moved",
        )
            .into_response(),
        "/api/missing" => (StatusCode::NOT_FOUND, "nope").into_response(),
        "/api/binary" => ([(header::CONTENT_TYPE, "image/png")], binary_body()).into_response(),
        "/api/hop" => (
            [
                ("keep-alive", "timeout=5"),
                ("proxy-authenticate", "Basic"),
                ("x-upstream", "yes"),
            ],
            "hop",
        )
            .into_response(),
        "/api/slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "late".into_response()
        }
        _ => {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .cloned()
                .unwrap_or_else(|| header::HeaderValue::from_static("application/octet-stream"));
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
    }
}

/// Config pointing at `upstream` with test-friendly settings.
pub fn proxy_config(upstream: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.target.base_url = Some(upstream.to_string());
    config.client.use_env_proxy = false;
    config.client.pool_max_idle_per_host = 0;
    config
}

/// Address on loopback with nothing listening.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Spawn the proxy for `config`; returns its address.
pub async fn start_proxy(config: ProxyConfig) -> SocketAddr {
    let forwarder = Forwarder::from_config(&config)
        .unwrap()
        .with_log(Arc::new(RecordingLog::default()));
    start_proxy_with(config, forwarder).await
}

pub async fn start_proxy_with(config: ProxyConfig, forwarder: Forwarder) -> SocketAddr {
    let server = HttpServer::with_forwarder(config, forwarder);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

/// Client that behaves like a plain caller: no redirects, no proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// One side effect observed by [`RecordingLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    Request(String),
    Response(u16),
    TransportError(String),
}

/// Exchange log that remembers what it was told.
#[derive(Debug, Default)]
pub struct RecordingLog {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLog {
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ExchangeLog for RecordingLog {
    fn request(&self, request: &InboundRequest) {
        self.events
            .lock()
            .unwrap()
            .push(LogEvent::Request(request.path_and_query()));
    }

    fn response(&self, response: &UpstreamResponse) {
        self.events
            .lock()
            .unwrap()
            .push(LogEvent::Response(response.status.as_u16()));
    }

    fn transport_error(&self, error: &TransportError) {
        self.events
            .lock()
            .unwrap()
            .push(LogEvent::TransportError(error.kind().to_string()));
    }
}
