//! Start/stop lifecycle and failure handling of the synchronization controller

use crate::integration::{next_settled, GatedAvailability, RecordingState, Write};
use async_trait::async_trait;
use querystate::config::SearchContextsConfig;
use querystate::context::ContextAvailability;
use querystate::error::SyncError;
use querystate::search::{LocationParser, ParsedQueryResult, UrlLocationParser};
use querystate::{NavigableLocation, QueryStateSync, SyncEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn location(input: &str) -> NavigableLocation {
    NavigableLocation::parse(input).unwrap()
}

/// Fails for `/broken`, otherwise parses normally.
struct BrokenPathParser;

#[async_trait]
impl LocationParser for BrokenPathParser {
    async fn parse(
        &self,
        location: &NavigableLocation,
        contexts: &dyn ContextAvailability,
    ) -> Result<ParsedQueryResult, SyncError> {
        if location.pathname == "/broken" {
            return Err(SyncError::Parse("broken path".to_string()));
        }
        UrlLocationParser.parse(location, contexts).await
    }
}

#[tokio::test]
async fn test_stop_discards_pending_lookup() {
    let checker = Arc::new(GatedAvailability::new());
    let release = checker.hold("team/a");
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();

    let handle = QueryStateSync::new(state.clone(), state.clone(), checker.clone())
        .with_events(tx)
        .start(location("/search?q=context:team/a+one"));
    checker.wait_for_call("team/a").await;

    handle.stop().await.unwrap();
    assert!(release.send(true).is_err(), "lookup should be gone after stop");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(state.journal().is_empty());
    while let Ok(event) = events.try_recv() {
        assert!(!event.is_settled(), "unexpected event after stop: {:?}", event);
    }
}

#[tokio::test]
async fn test_navigation_after_stop_is_not_applied() {
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();

    let checker = Arc::new(GatedAvailability::new());
    let handle = QueryStateSync::new(state.clone(), state.clone(), checker)
        .with_events(tx)
        .start(location("/search?q=foo"));
    next_settled(&mut events).await;
    let feed = handle.feed();
    assert!(handle.is_running());

    handle.stop().await.unwrap();
    assert!(feed.is_closed());
    feed.navigate(location("/search?q=bar"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        state.journal(),
        vec![Write::Selected("global".to_string()), Write::Query("foo".to_string())]
    );
    assert_eq!(events.recv().await, None);
}

#[tokio::test]
async fn test_parser_failure_is_reported_and_controller_continues() {
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();

    let checker = Arc::new(GatedAvailability::new());
    let handle = QueryStateSync::new(state.clone(), state.clone(), checker)
        .with_parser(Arc::new(BrokenPathParser))
        .with_events(tx)
        .start(location("/broken?q=foo"));

    let failed = next_settled(&mut events).await;
    assert!(matches!(failed, SyncEvent::Failed { ref error, .. } if error.contains("broken path")));
    assert!(state.journal().is_empty());

    handle.navigate(location("/search?q=foo"));
    assert!(matches!(next_settled(&mut events).await, SyncEvent::Applied { .. }));
    assert_eq!(state.journal().len(), 2);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_lookup_timeout_counts_as_unavailable() {
    let checker = Arc::new(GatedAvailability::new());
    let _never_released = checker.hold("team/slow");
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();
    let config = SearchContextsConfig {
        lookup_timeout_ms: Some(20),
        ..SearchContextsConfig::default()
    };

    let handle = QueryStateSync::from_config(&config, state.clone(), state.clone(), checker)
        .with_events(tx)
        .start(location("/search?q=context:team/slow+foo"));
    let event = next_settled(&mut events).await;

    assert!(matches!(
        event,
        SyncEvent::Applied { ref search_context, .. } if search_context == "global"
    ));
    assert_eq!(
        state.journal(),
        vec![
            Write::Selected("global".to_string()),
            Write::Query("context:team/slow foo".to_string()),
        ]
    );
    handle.stop().await.unwrap();
}
