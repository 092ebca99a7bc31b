//! Query State Store
//!
//! Application-wide search query state and the host-owned selected search
//! context. Both are injected into the synchronization controller as handles
//! with explicit read and write operations.

use crate::search::{ParsedSearchUrl, SearchMode, SearchPatternType};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Snapshot of the active search query and its filters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryState {
    pub query: String,
    pub pattern_type: SearchPatternType,
    pub case_sensitive: bool,
    pub search_mode: SearchMode,
    /// Number of writes applied from a URL since startup.
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shared query state written by the synchronization controller.
pub trait QueryStateStore: Send + Sync {
    /// Apply the query and the URL-carried filters.
    ///
    /// Filters absent from `parsed` keep their current value, except case
    /// sensitivity which the URL always states.
    fn set_query_state_from_url(&self, parsed: &ParsedSearchUrl, query: &str);

    fn snapshot(&self) -> QueryState;
}

/// Process-local [`QueryStateStore`].
#[derive(Debug, Default)]
pub struct InMemoryQueryStateStore {
    state: RwLock<QueryState>,
}

impl InMemoryQueryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: QueryState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl QueryStateStore for InMemoryQueryStateStore {
    fn set_query_state_from_url(&self, parsed: &ParsedSearchUrl, query: &str) {
        let mut state = self.state.write();
        state.query = query.to_string();
        if let Some(pattern_type) = parsed.pattern_type {
            state.pattern_type = pattern_type;
        }
        state.case_sensitive = parsed.case_sensitive;
        if let Some(search_mode) = parsed.search_mode {
            state.search_mode = search_mode;
        }
        state.generation += 1;
        state.updated_at = Some(Utc::now());
    }

    fn snapshot(&self) -> QueryState {
        self.state.read().clone()
    }
}

/// Host-owned selected search context.
///
/// The controller reads the current value and proposes updates; the host
/// decides how they are stored.
pub trait SearchContextSelection: Send + Sync {
    fn selected(&self) -> Option<String>;

    fn set_selected(&self, spec: &str);
}

/// Simple [`SearchContextSelection`] holding the spec in memory.
#[derive(Debug, Default)]
pub struct SelectedContextCell {
    spec: RwLock<Option<String>>,
}

impl SelectedContextCell {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            spec: RwLock::new(initial),
        }
    }
}

impl SearchContextSelection for SelectedContextCell {
    fn selected(&self) -> Option<String> {
        self.spec.read().clone()
    }

    fn set_selected(&self, spec: &str) {
        *self.spec.write() = Some(spec.to_string());
    }
}
