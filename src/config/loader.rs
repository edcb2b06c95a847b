//! Configuration loading from disk and environment.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the upstream base URL.
pub const TARGET_BASE_ENV: &str = "TARGET_BASE";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => ProxyConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Variables defined in a dotenv file, without touching the process environment.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path)? {
        let (key, value) = item?;
        vars.entry(key).or_insert(value);
    }
    Ok(vars)
}

/// Export the variables of a dotenv file into the process environment.
/// Variables already set win. Returns `false` when the file does not exist.
///
/// Call before any other thread reads the environment.
pub fn load_dotenv(path: &Path) -> Result<bool, ConfigError> {
    let vars = match read_dotenv(path) {
        Ok(vars) => vars,
        Err(ConfigError::Dotenv(e)) if e.not_found() => return Ok(false),
        Err(e) => return Err(e),
    };
    for (key, value) in vars {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(key, value);
        }
    }
    Ok(true)
}

/// Parse a TOML document into a configuration without validating it.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay environment-provided settings on top of `config`.
pub fn apply_env_overrides<F>(mut config: ProxyConfig, lookup: F) -> ProxyConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base) = lookup(TARGET_BASE_ENV).filter(|v| !v.trim().is_empty()) {
        config.target.base_url = Some(base);
    }
    config
}
