//! Transparent HTTP forwarding proxy library.
//!
//! Every inbound request is relayed to one configured upstream, and both sides
//! of the exchange are dumped for inspection.

pub mod config;
pub mod http;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::{Forwarder, HttpServer};
