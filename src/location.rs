//! Navigable locations as produced by a router on every navigation event.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Base used to resolve root-relative locations such as `/search?q=foo`.
const LOCATION_BASE: &str = "http://localhost/";

/// A URL path, query string and hash fragment at a point in time.
///
/// `search` keeps its leading `?` and `hash` its leading `#` when non-empty,
/// mirroring how browsers expose them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigableLocation {
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl NavigableLocation {
    pub fn new(
        pathname: impl Into<String>,
        search: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            pathname: pathname.into(),
            search: normalize_prefix(search.into(), '?'),
            hash: normalize_prefix(hash.into(), '#'),
        }
    }

    /// Parse an absolute URL or a root-relative path into a location.
    pub fn parse(input: &str) -> Result<Self, SyncError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SyncError::MalformedLocation {
                input: input.to_string(),
                reason: "empty location".to_string(),
            });
        }

        let base = Url::parse(LOCATION_BASE).map_err(|e| SyncError::MalformedLocation {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        let url = base
            .join(trimmed)
            .map_err(|e| SyncError::MalformedLocation {
                input: input.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        Self::new(
            url.path(),
            url.query().unwrap_or_default(),
            url.fragment().unwrap_or_default(),
        )
    }

    /// Query string without its leading `?`.
    pub fn query_string(&self) -> &str {
        self.search.strip_prefix('?').unwrap_or(&self.search)
    }
}

impl Default for NavigableLocation {
    fn default() -> Self {
        Self::new("/", "", "")
    }
}

impl fmt::Display for NavigableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pathname, self.search, self.hash)
    }
}

fn normalize_prefix(value: String, prefix: char) -> String {
    let rest = value.strip_prefix(prefix).unwrap_or(&value);
    if rest.is_empty() {
        String::new()
    } else {
        format!("{}{}", prefix, rest)
    }
}
