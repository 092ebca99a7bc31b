//! Applying a parsed location to the store and the selected context.

use crate::context::GLOBAL_SEARCH_CONTEXT_SPEC;
use crate::search::ParsedQueryResult;
use crate::store::{QueryStateStore, SearchContextSelection};

/// What one reaction step did to shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied {
        query: String,
        search_context: String,
    },
    /// No query: neither the store nor the selection was touched.
    Ignored,
}

/// Apply `parsed` to `store`, updating `selection` first when needed.
///
/// - No query: nothing is written.
/// - Query without a context spec: the selection is reset to the global
///   context, even if it already is global.
/// - Query with a context spec: the selection is updated only if it differs.
pub fn apply_parsed_result(
    parsed: &ParsedQueryResult,
    store: &dyn QueryStateStore,
    selection: &dyn SearchContextSelection,
) -> ApplyOutcome {
    let Some(query) = parsed.effective_query() else {
        return ApplyOutcome::Ignored;
    };

    let search_context = match &parsed.search_context_spec {
        None => {
            selection.set_selected(GLOBAL_SEARCH_CONTEXT_SPEC);
            GLOBAL_SEARCH_CONTEXT_SPEC.to_string()
        }
        Some(context) => {
            if selection.selected().as_deref() != Some(context.spec.as_str()) {
                selection.set_selected(&context.spec);
            }
            context.spec.clone()
        }
    };

    store.set_query_state_from_url(&parsed.parsed_url, query);

    ApplyOutcome::Applied {
        query: query.to_string(),
        search_context,
    }
}
