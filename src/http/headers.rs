//! Ordered header collections and hop-by-hop filtering.
//!
//! # Responsibilities
//! - Keep headers as an ordered multi-map (duplicates and relative order preserved)
//! - Case-insensitive lookup by name
//! - Strip hop-by-hop and framing headers in both directions
//!
//! # Design Decisions
//! - The exclusion set is fixed; it never changes per request
//! - Filtering always produces a new collection, the input is untouched

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Headers never relayed across the proxy boundary.
///
/// The outbound client and the serving layer recompute framing and
/// encoding themselves; forwarding these verbatim would corrupt both.
pub const EXCLUDED_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "upgrade",
    "accept-encoding",
];

/// Returns true if `name` is in the exclusion set (case-insensitive).
pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_HEADERS
        .iter()
        .any(|excluded| name.eq_ignore_ascii_case(excluded))
}

/// Copy of `headers` without any excluded entry, in original order.
pub fn filter_headers(headers: &HeaderList) -> HeaderList {
    headers
        .iter()
        .filter(|(name, _)| !is_excluded(name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Ordered multi-map of HTTP headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot a `HeaderMap`, one entry per value.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        map.iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Append an entry; existing entries with the same name are kept.
    pub fn push(&mut self, name: HeaderName, value: HeaderValue) {
        self.entries.push((name, value));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Every value for `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Remove every entry named `name`.
    pub fn remove(&mut self, name: &str) {
        self.entries
            .retain(|(n, _)| !n.as_str().eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a `HeaderMap`, appending so repeated names survive.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

impl FromIterator<(HeaderName, HeaderValue)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (HeaderName, HeaderValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
