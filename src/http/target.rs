//! Upstream base URL handling.
//!
//! The base is treated as a directory root: inbound paths are appended to
//! its path, never resolved against it as absolute references.

use std::fmt;

use url::Url;

/// Why a base URL cannot be used as the upstream target.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("not a valid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("URL must not carry a query or fragment")]
    QueryOrFragment,
}

/// Validated upstream base URL; its path always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBase {
    base: Url,
}

impl TargetBase {
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let mut base = Url::parse(raw.trim())?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(TargetError::UnsupportedScheme(base.scheme().to_string()));
        }
        if base.host_str().is_none() {
            return Err(TargetError::MissingHost);
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(TargetError::QueryOrFragment);
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    /// Upstream URL for an inbound path. Leading slashes on `path` are
    /// ignored so the base path component is always kept.
    pub fn join(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}{}", self.base.path(), path.trim_start_matches('/'));
        url.set_path(&joined);
        url
    }

    pub fn as_url(&self) -> &Url {
        &self.base
    }
}

impl fmt::Display for TargetBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())
    }
}
