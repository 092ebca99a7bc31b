//! End-to-end reactions for representative locations

use crate::integration::{next_settled, GatedAvailability, RecordingState, Write};
use async_trait::async_trait;
use querystate::context::{ContextAvailability, SearchContextSpec, SearchContextsFlag};
use querystate::error::SyncError;
use querystate::search::{parse_search_url, LocationParser, ParsedQueryResult};
use querystate::{NavigableLocation, QueryStateSync};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Parser for hosts that resolve the context elsewhere: it attaches a fixed
/// spec to any query without asking the availability checker.
struct FixedContextParser {
    spec: &'static str,
}

#[async_trait]
impl LocationParser for FixedContextParser {
    async fn parse(
        &self,
        location: &NavigableLocation,
        _contexts: &dyn ContextAvailability,
    ) -> Result<ParsedQueryResult, SyncError> {
        let parsed_url = parse_search_url(&location.search);
        let query = parsed_url.query.clone();
        Ok(ParsedQueryResult {
            parsed_url,
            search_context_spec: query.as_ref().map(|_| SearchContextSpec {
                spec: self.spec.to_string(),
                filter: format!("context:{}", self.spec),
            }),
            query,
        })
    }
}

async fn run_once(
    sync: QueryStateSync,
    events: &mut mpsc::UnboundedReceiver<querystate::SyncEvent>,
    input: &str,
) {
    let handle = sync.start(NavigableLocation::parse(input).unwrap());
    next_settled(events).await;
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_query_without_context_selects_global() {
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();
    let checker = Arc::new(GatedAvailability::new());
    let sync = QueryStateSync::new(state.clone(), state.clone(), checker).with_events(tx);

    run_once(sync, &mut events, "/search?q=foo").await;

    assert_eq!(
        state.journal(),
        vec![Write::Selected("global".to_string()), Write::Query("foo".to_string())]
    );
}

#[tokio::test]
async fn test_attached_context_with_checking_disabled() {
    let checker = Arc::new(GatedAvailability::new());
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();
    let sync = QueryStateSync::new(state.clone(), state.clone(), checker.clone())
        .with_parser(Arc::new(FixedContextParser { spec: "team/x" }))
        .with_flag(SearchContextsFlag::new(false))
        .with_events(tx);

    run_once(sync, &mut events, "/search?q=bar").await;

    assert_eq!(
        state.journal(),
        vec![Write::Selected("team/x".to_string()), Write::Query("bar".to_string())]
    );
    assert!(checker.calls().is_empty());
}

#[tokio::test]
async fn test_location_without_query_touches_nothing() {
    let checker = Arc::new(GatedAvailability::new());
    let state = Arc::new(RecordingState::new(Some("team/x")));
    let (tx, mut events) = mpsc::unbounded_channel();
    let sync = QueryStateSync::new(state.clone(), state.clone(), checker.clone()).with_events(tx);

    run_once(sync, &mut events, "/repo/commits#top").await;

    assert!(state.journal().is_empty());
    assert!(checker.calls().is_empty());
}
