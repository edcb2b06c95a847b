//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from `RUST_LOG`, falling back to the config
//! - Keep transport-failure lines on stderr regardless of the filter
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Operational logs go to stderr; stdout carries only exchange dumps
//! - Transport failures use their own target with a dedicated layer, so
//!   `RUST_LOG=off` silences operational logs but never the error stream

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    filter::{filter_fn, FilterExt, Targets},
    fmt::MakeWriter,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::ObservabilityConfig;

/// Target of the error line written when the upstream cannot be reached.
pub const TRANSPORT_TARGET: &str = "http_forward_proxy::transport";

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!(
        "http_forward_proxy={level},tower_http={level}",
        level = config.log_level
    )
}

/// Subscriber with the operational layer under `filter` and an always-on
/// layer for [`TRANSPORT_TARGET`] errors, both writing to `writer`.
pub fn build_subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Clone + Send + Sync + 'static,
{
    let operational = tracing_subscriber::fmt::layer()
        .with_writer(writer.clone())
        .with_filter(filter.and(filter_fn(|meta| meta.target() != TRANSPORT_TARGET)));

    let transport = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_filter(Targets::new().with_target(TRANSPORT_TARGET, Level::ERROR));

    tracing_subscriber::registry().with(operational).with(transport)
}

/// Install the global tracing subscriber. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let _ = build_subscriber(filter, std::io::stderr).try_init();
}
