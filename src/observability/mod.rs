//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! forwarder
//!     → dump.rs (request/response dumps → stdout)
//!     → logging.rs (tracing events, transport failures → stderr)
//! ```
//!
//! # Design Decisions
//! - Dumps are plain text meant for a human watching the terminal
//! - Exchange ID flows through the tracing span of each cycle
//! - No ordering between concurrent cycles; each dump block is written whole

pub mod dump;
pub mod logging;

pub use dump::{ExchangeLog, RequestDump, ResponseDump, StdoutDump};
pub use logging::{init_tracing, TRANSPORT_TARGET};
