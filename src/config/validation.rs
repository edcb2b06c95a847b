//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a usable upstream target before the proxy starts
//! - Validate value ranges (timeouts > 0, limits > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::http::target::{TargetBase, TargetError};

/// A single semantic problem in a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no upstream target: set TARGET_BASE or target.base_url")]
    MissingTarget,

    #[error("invalid target base {url:?}: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: TargetError,
    },

    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.target.base_url.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError::MissingTarget),
        Some(url) => {
            if let Err(source) = TargetBase::parse(url) {
                errors.push(ValidationError::InvalidTarget {
                    url: url.to_string(),
                    source,
                });
            }
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let zero_checks = [
        ("timeouts.connect_ms", config.timeouts.connect_ms == 0),
        ("timeouts.request_ms", config.timeouts.request_ms == 0),
        ("limits.max_request_body_bytes", config.limits.max_request_body_bytes == 0),
        ("limits.max_response_body_bytes", config.limits.max_response_body_bytes == 0),
    ];
    for (field, is_zero) in zero_checks {
        if is_zero {
            errors.push(ValidationError::Zero(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.target.base_url = Some("http://up.test/api".into());
        config
    }

    #[test]
    fn accepts_minimal_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn missing_target_is_rejected() {
        let mut config = valid();
        config.target.base_url = Some("   ".into());

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[..], [ValidationError::MissingTarget]));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = valid();
        config.target.base_url = Some("ftp://up.test".into());
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_ms = 0;
        config.limits.max_response_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::InvalidTarget { .. }));
        assert!(matches!(errors[1], ValidationError::InvalidBindAddress(_)));
        assert!(matches!(errors[2], ValidationError::Zero("timeouts.request_ms")));
        assert!(matches!(errors[3], ValidationError::Zero("limits.max_response_body_bytes")));
    }
}
