//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, method filter, body limit)
//!     → message.rs (InboundRequest from request parts)
//!     → forwarder.rs (log, filter via headers.rs, join via target.rs, send upstream)
//!     → message.rs (OutboundResponse mirrors upstream, or 502)
//!     → Send to client
//! ```

pub mod forwarder;
pub mod headers;
pub mod message;
pub mod server;
pub mod target;

pub use forwarder::{Forwarder, TransportError, UpstreamOutcome};
pub use headers::{filter_headers, HeaderList};
pub use message::{InboundRequest, OutboundRequest, OutboundResponse, UpstreamResponse};
pub use server::HttpServer;
pub use target::TargetBase;
