//! Request and response types for one forwarding cycle.
//!
//! # Responsibilities
//! - Capture the inbound request (method, path, query, headers, cookies, body)
//! - Derive the outbound request sent upstream
//! - Carry the buffered upstream response
//! - Build the response handed back to the serving layer
//!
//! # Design Decisions
//! - Every type lives for one cycle only; nothing is shared between requests
//! - Header filtering happens exactly once per direction, in the constructors here
//! - Bodies are `Bytes` so logging and forwarding share one buffer

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri, Version};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::http::headers::{filter_headers, HeaderList};
use crate::http::target::TargetBase;

/// Body of the 502 returned when the upstream cannot be reached.
pub const BAD_GATEWAY_BODY: &str = "Error contacting target server.\n";

/// A request as received from the caller.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Path as received, including its leading `/`.
    pub path: String,
    /// Raw query string, without the `?`.
    pub raw_query: Option<String>,
    /// Decoded query parameters in original order.
    pub query: Vec<(String, String)>,
    pub version: Version,
    pub headers: HeaderList,
    /// Cookies from every `Cookie` header; the first value of a name wins.
    /// Informational only: the headers themselves are forwarded unchanged.
    pub cookies: Vec<(String, String)>,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn from_parts(
        method: Method,
        uri: &Uri,
        version: Version,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Self {
        let raw_query = uri.query().map(str::to_string);
        let query = raw_query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        let headers = HeaderList::from_header_map(headers);
        let cookies = parse_cookies(&headers);

        Self {
            method,
            path: uri.path().to_string(),
            raw_query,
            query,
            version,
            headers,
            cookies,
            body,
        }
    }

    /// Path plus `?query` when a query was sent.
    pub fn path_and_query(&self) -> String {
        match &self.raw_query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

fn parse_cookies(headers: &HeaderList) -> Vec<(String, String)> {
    let mut cookies: Vec<(String, String)> = Vec::new();
    for value in headers.get_all("cookie") {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            let Some((name, val)) = pair.trim().split_once('=') else { continue };
            let name = name.trim();
            if name.is_empty() || cookies.iter().any(|(n, _)| n == name) {
                continue;
            }
            cookies.push((name.to_string(), val.trim().to_string()));
        }
    }
    cookies
}

/// The request issued to the upstream, derived 1:1 from an [`InboundRequest`].
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderList,
    pub body: Bytes,
}

impl OutboundRequest {
    pub fn from_inbound(inbound: &InboundRequest, target: &TargetBase) -> Self {
        let mut url = target.join(&inbound.path);
        if !inbound.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&inbound.query);
        }

        // Cookie headers travel verbatim; one is rendered only when none came in.
        let mut headers = filter_headers(&inbound.headers);
        if headers.get("cookie").is_none() && !inbound.cookies.is_empty() {
            let rendered = inbound
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            if let Ok(value) = HeaderValue::from_str(&rendered) {
                headers.push(header::COOKIE, value);
            }
        }

        Self {
            method: inbound.method.clone(),
            url,
            headers,
            body: inbound.body.clone(),
        }
    }
}

/// Fully buffered response received from the upstream.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderList,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Canonical reason phrase for the status, empty when unknown.
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Raw `Content-Type` value, empty when absent.
    pub fn content_type(&self) -> String {
        self.headers
            .get("content-type")
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default()
    }
}

/// Response handed back to the caller.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderList,
    pub body: Bytes,
}

impl OutboundResponse {
    /// Mirror the upstream: same status, filtered headers, verbatim body.
    pub fn from_upstream(upstream: UpstreamResponse) -> Self {
        Self {
            status: upstream.status,
            headers: filter_headers(&upstream.headers),
            body: upstream.body,
        }
    }

    /// Plain-text 502 carrying no upstream headers.
    pub fn bad_gateway() -> Self {
        let mut headers = HeaderList::new();
        headers.push(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status: StatusCode::BAD_GATEWAY,
            headers,
            body: Bytes::from_static(BAD_GATEWAY_BODY.as_bytes()),
        }
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.to_header_map();
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderName;

    fn inbound(uri: &str, headers: &[(&str, &str)], body: &'static [u8]) -> InboundRequest {
        let uri: Uri = uri.parse().unwrap();
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        InboundRequest::from_parts(Method::GET, &uri, Version::HTTP_11, &map, Bytes::from_static(body))
    }

    #[test]
    fn parses_query_in_order() {
        let req = inbound("/v1/users?limit=5&tag=a&tag=b%20c", &[], b"");
        assert_eq!(req.path, "/v1/users");
        assert_eq!(req.path_and_query(), "/v1/users?limit=5&tag=a&tag=b%20c");
        assert_eq!(
            req.query,
            vec![
                ("limit".to_string(), "5".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b c".to_string()),
            ]
        );
    }

    #[test]
    fn parses_cookies_first_value_wins() {
        let req = inbound(
            "/",
            &[("cookie", "session=abc; theme=dark"), ("cookie", "session=zzz; lang=en")],
            b"",
        );
        assert_eq!(
            req.cookies,
            vec![
                ("session".to_string(), "abc".to_string()),
                ("theme".to_string(), "dark".to_string()),
                ("lang".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn outbound_request_mirrors_inbound() {
        let target = TargetBase::parse("http://up.test/api").unwrap();
        let req = inbound(
            "/v1/users?limit=5",
            &[
                ("host", "proxy.local"),
                ("accept-encoding", "gzip"),
                ("x-trace", "t1"),
                ("cookie", "a=1"),
                ("cookie", "b=2"),
            ],
            b"payload",
        );

        let out = OutboundRequest::from_inbound(&req, &target);
        assert_eq!(out.method, Method::GET);
        assert_eq!(out.url.as_str(), "http://up.test/api/v1/users?limit=5");
        assert_eq!(out.body.as_ref(), b"payload");
        assert!(out.headers.get("host").is_none());
        assert!(out.headers.get("accept-encoding").is_none());
        assert_eq!(out.headers.get("x-trace").unwrap(), "t1");
        let cookies: Vec<_> = out.headers.get_all("cookie").collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
    }

    #[test]
    fn cookie_header_is_forwarded_as_sent() {
        let target = TargetBase::parse("http://up.test").unwrap();
        let req = inbound("/", &[("cookie", "id=a; flag; id=b")], b"");
        assert_eq!(req.cookies, vec![("id".to_string(), "a".to_string())]);

        let out = OutboundRequest::from_inbound(&req, &target);
        assert_eq!(out.headers.get_all("cookie").count(), 1);
        assert_eq!(out.headers.get("cookie").unwrap(), "id=a; flag; id=b");
    }

    #[test]
    fn cookies_without_header_are_rendered() {
        let target = TargetBase::parse("http://up.test").unwrap();
        let mut req = inbound("/", &[], b"");
        req.cookies = vec![("a".into(), "1".into()), ("b".into(), "2".into())];

        let out = OutboundRequest::from_inbound(&req, &target);
        assert_eq!(out.headers.get("cookie").unwrap(), "a=1; b=2");
    }

    #[test]
    fn root_path_without_query_has_no_question_mark() {
        let target = TargetBase::parse("http://up.test/api").unwrap();
        let out = OutboundRequest::from_inbound(&inbound("/", &[], b""), &target);
        assert_eq!(out.url.as_str(), "http://up.test/api/");
    }

    #[test]
    fn response_from_upstream_filters_headers_once() {
        let mut headers = HeaderList::new();
        headers.push(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.push(header::CONTENT_LENGTH, HeaderValue::from_static("8"));
        headers.push(header::CONNECTION, HeaderValue::from_static("close"));

        let upstream = UpstreamResponse {
            status: StatusCode::FOUND,
            version: Version::HTTP_11,
            headers,
            body: Bytes::from_static(b"{\"id\":1}"),
        };
        assert_eq!(upstream.reason(), "Found");
        assert_eq!(upstream.content_type(), "application/json");

        let out = OutboundResponse::from_upstream(upstream);
        assert_eq!(out.status, StatusCode::FOUND);
        assert_eq!(out.headers.len(), 1);
        assert_eq!(out.body.as_ref(), b"{\"id\":1}");
    }

    #[test]
    fn bad_gateway_is_plain_text() {
        let out = OutboundResponse::bad_gateway();
        assert_eq!(out.status, StatusCode::BAD_GATEWAY);
        assert_eq!(out.headers.get("content-type").unwrap(), "text/plain; charset=utf-8");
        assert!(!out.body.is_empty());
    }
}
