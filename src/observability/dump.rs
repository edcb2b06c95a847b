//! Human-readable dumps of each exchange.
//!
//! # Responsibilities
//! - Render the inbound request and the upstream response as text blocks
//! - Elide binary response bodies to a byte count
//! - Route dumps to stdout and transport failures to the error log
//!
//! # Design Decisions
//! - Rendering is a pure `Display` impl; writing is behind [`ExchangeLog`]
//! - Each block is written with one locked write so concurrent dumps do not interleave mid-block
//! - Decode failures never abort a cycle; bodies fall back to an escaped byte string

use std::fmt;
use std::io::Write;

use axum::body::Bytes;

use crate::http::forwarder::TransportError;
use crate::http::message::{InboundRequest, UpstreamResponse};
use crate::observability::logging::TRANSPORT_TARGET;

const RULE_WIDTH: usize = 80;

/// Sink for the side effects of one forwarding cycle.
pub trait ExchangeLog: Send + Sync {
    /// Called before the upstream request is issued.
    fn request(&self, request: &InboundRequest);

    /// Called once the upstream response is fully buffered.
    fn response(&self, response: &UpstreamResponse);

    /// Called when the upstream could not be reached.
    fn transport_error(&self, error: &TransportError);
}

/// Default sink: dumps to stdout, failures through `tracing` (stderr).
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutDump;

impl StdoutDump {
    fn emit(block: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(block.as_bytes()).and_then(|()| stdout.flush()) {
            tracing::warn!(error = %e, "Failed to write exchange dump");
        }
    }
}

impl ExchangeLog for StdoutDump {
    fn request(&self, request: &InboundRequest) {
        Self::emit(&RequestDump(request).to_string());
    }

    fn response(&self, response: &UpstreamResponse) {
        Self::emit(&ResponseDump(response).to_string());
    }

    fn transport_error(&self, error: &TransportError) {
        tracing::error!(
            target: TRANSPORT_TARGET,
            kind = error.kind(),
            error = %error.detail(),
            "Error contacting target"
        );
    }
}

/// Text block for an inbound request.
pub struct RequestDump<'a>(pub &'a InboundRequest);

impl fmt::Display for RequestDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let req = self.0;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "\n{rule}")?;
        writeln!(f, ">>> Incoming Request")?;
        writeln!(f, "{} {} {:?}", req.method, req.path_and_query(), req.version)?;
        for (name, value) in req.headers.iter() {
            writeln!(f, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
        }

        if req.body.is_empty() {
            writeln!(f, "\n(no request body)")?;
        } else {
            writeln!(f, "\n--- Request Body ---")?;
            write_body_text(f, &req.body)?;
        }
        writeln!(f, "{rule}")
    }
}

/// Text block for an upstream response.
pub struct ResponseDump<'a>(pub &'a UpstreamResponse);

impl fmt::Display for ResponseDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resp = self.0;
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(f, "\n{rule}")?;
        writeln!(f, "<<< Response From Target")?;
        write!(f, "{:?} {}", resp.version, resp.status.as_u16())?;
        match resp.reason() {
            "" => writeln!(f)?,
            reason => writeln!(f, " {reason}")?,
        }
        for (name, value) in resp.headers.iter() {
            writeln!(f, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
        }

        if resp.body.is_empty() {
            writeln!(f, "\n(no response body)")?;
        } else {
            writeln!(f, "\n--- Response Body ---")?;
            if is_textual(&resp.content_type()) {
                write_body_text(f, &resp.body)?;
            } else {
                writeln!(f, "[{} bytes]", resp.body.len())?;
            }
        }
        writeln!(f, "{rule}")
    }
}

/// Content types whose bodies are worth decoding. Case-sensitive on the raw value.
pub fn is_textual(content_type: &str) -> bool {
    ["text", "json", "xml"]
        .iter()
        .any(|marker| content_type.contains(marker))
}

fn write_body_text(f: &mut fmt::Formatter<'_>, body: &Bytes) -> fmt::Result {
    match std::str::from_utf8(body) {
        Ok(text) => writeln!(f, "{text}"),
        Err(_) => writeln!(f, "b\"{}\"", body.escape_ascii()),
    }
}
