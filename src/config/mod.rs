//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (loader.rs, exported into the environment; existing variables win)
//!     → defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → TARGET_BASE environment override (loader.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → consumed once at startup by the server and forwarder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the target is never re-read per request
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    apply_env_overrides, load_config, load_dotenv, parse_config, read_dotenv, ConfigError,
    TARGET_BASE_ENV,
};
pub use schema::{
    ClientConfig, LimitConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, TargetConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
