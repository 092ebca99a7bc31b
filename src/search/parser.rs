//! Location-to-query-state parsing.
//!
//! Turns a [`NavigableLocation`] into a [`ParsedQueryResult`]. The only
//! asynchronous step is the context availability check, which decides whether
//! a `context:` filter in the query selects a search context or stays part of
//! the query text.

use crate::context::{ContextAvailability, SearchContextSpec};
use crate::error::SyncError;
use crate::location::NavigableLocation;
use crate::search::filter::{find_global_context_filter, omit_filter};
use crate::search::params::{parse_search_url, ParsedSearchUrl};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Query state derived from one location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedQueryResult {
    pub parsed_url: ParsedSearchUrl,
    /// Query to apply; `None` means the location carries no search intent.
    pub query: Option<String>,
    pub search_context_spec: Option<SearchContextSpec>,
}

impl ParsedQueryResult {
    /// The query, if present and not blank.
    pub fn effective_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.trim().is_empty())
    }
}

/// Maps a location to query state, consulting `contexts` for context filters.
#[async_trait]
pub trait LocationParser: Send + Sync {
    async fn parse(
        &self,
        location: &NavigableLocation,
        contexts: &dyn ContextAvailability,
    ) -> Result<ParsedQueryResult, SyncError>;
}

/// Parses the `q` parameter and resolves a top-level `context:` filter.
///
/// An available context is lifted out of the query into
/// `search_context_spec`; an unavailable one (or a failed lookup) leaves the
/// query untouched with no spec.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlLocationParser;

#[async_trait]
impl LocationParser for UrlLocationParser {
    async fn parse(
        &self,
        location: &NavigableLocation,
        contexts: &dyn ContextAvailability,
    ) -> Result<ParsedQueryResult, SyncError> {
        let parsed_url = parse_search_url(&location.search);
        let Some(query) = parsed_url.query.clone() else {
            return Ok(ParsedQueryResult {
                parsed_url,
                query: None,
                search_context_spec: None,
            });
        };

        let Some(filter) = find_global_context_filter(&query) else {
            return Ok(ParsedQueryResult {
                parsed_url,
                query: Some(query),
                search_context_spec: None,
            });
        };

        let available = match contexts.is_available(&filter.spec).await {
            Ok(available) => available,
            Err(e) => {
                debug!(
                    spec = %filter.spec,
                    error = %e,
                    "Context lookup failed, treating as unavailable"
                );
                false
            }
        };

        if !available {
            return Ok(ParsedQueryResult {
                parsed_url,
                query: Some(query),
                search_context_spec: None,
            });
        }

        let remaining = omit_filter(&query, &filter);
        Ok(ParsedQueryResult {
            parsed_url,
            query: Some(remaining),
            search_context_spec: Some(SearchContextSpec {
                spec: filter.spec,
                filter: filter.filter,
            }),
        })
    }
}
