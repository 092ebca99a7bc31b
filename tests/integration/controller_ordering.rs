//! Ordering guarantees of the synchronization controller

use crate::integration::{next_event, next_settled, GatedAvailability, RecordingState, Write};
use querystate::context::SearchContextsFlag;
use querystate::store::QueryStateStore;
use querystate::{NavigableLocation, QueryStateSync, SyncEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn location(input: &str) -> NavigableLocation {
    NavigableLocation::parse(input).unwrap()
}

#[tokio::test]
async fn test_superseded_lookup_never_applies() {
    let checker = Arc::new(GatedAvailability::new());
    let release_a = checker.hold("team/a");
    let release_b = checker.hold("team/b");
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();

    let handle = QueryStateSync::new(state.clone(), state.clone(), checker.clone())
        .with_events(tx)
        .start(location("/search?q=context:team/a+one"));
    checker.wait_for_call("team/a").await;

    assert!(handle.navigate(location("/search?q=context:team/b+two")));
    let superseded = next_event(&mut events).await;
    assert!(matches!(superseded, SyncEvent::Superseded { generation: 0, .. }));

    checker.wait_for_call("team/b").await;
    release_b.send(true).unwrap();
    let applied = next_settled(&mut events).await;
    assert_eq!(
        applied,
        SyncEvent::Applied {
            generation: 1,
            location: location("/search?q=context:team/b+two"),
            query: "two".to_string(),
            search_context: "team/b".to_string(),
        }
    );

    // The first lookup was dropped along with its gate.
    assert!(release_a.send(true).is_err());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        state.journal(),
        vec![Write::Selected("team/b".to_string()), Write::Query("two".to_string())]
    );
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_latest_of_rapid_navigations_wins() {
    let checker = Arc::new(GatedAvailability::new());
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();

    let handle = QueryStateSync::new(state.clone(), state.clone(), checker)
        .with_events(tx)
        .start(NavigableLocation::default());
    next_settled(&mut events).await;

    for i in 0..20 {
        handle.navigate(location(&format!("/search?q=q{}", i)));
    }

    let last = loop {
        let event = next_settled(&mut events).await;
        if event.location() == &location("/search?q=q19") {
            break event;
        }
    };
    assert!(matches!(last, SyncEvent::Applied { ref query, .. } if query == "q19"));
    assert_eq!(state.snapshot().query, "q19");
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_global_selected_once_before_each_store_write() {
    let state = Arc::new(RecordingState::new(Some("global")));
    let (tx, mut events) = mpsc::unbounded_channel();

    let checker = Arc::new(GatedAvailability::new());
    let handle = QueryStateSync::new(state.clone(), state.clone(), checker)
        .with_events(tx)
        .start(location("/search?q=foo"));
    next_settled(&mut events).await;
    handle.navigate(location("/search?q=bar&patternType=regexp"));
    next_settled(&mut events).await;

    assert_eq!(
        state.journal(),
        vec![
            Write::Selected("global".to_string()),
            Write::Query("foo".to_string()),
            Write::Selected("global".to_string()),
            Write::Query("bar".to_string()),
        ]
    );
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_matching_selection_is_not_updated() {
    let checker = Arc::new(GatedAvailability::new());
    let release = checker.hold("team/x");
    release.send(true).unwrap();
    let state = Arc::new(RecordingState::new(Some("team/x")));
    let (tx, mut events) = mpsc::unbounded_channel();

    let handle = QueryStateSync::new(state.clone(), state.clone(), checker)
        .with_events(tx)
        .start(location("/search?q=context:team/x+foo"));
    let event = next_settled(&mut events).await;

    assert!(matches!(
        event,
        SyncEvent::Applied { ref search_context, .. } if search_context == "team/x"
    ));
    assert_eq!(state.journal(), vec![Write::Query("foo".to_string())]);
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_locations_without_query_write_nothing() {
    let checker = Arc::new(GatedAvailability::new());
    checker.hold("global").send(true).unwrap();
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();

    let handle = QueryStateSync::new(state.clone(), state.clone(), checker)
        .with_events(tx)
        .start(location("/repo/-/blob/main.rs"));
    assert!(matches!(next_settled(&mut events).await, SyncEvent::Ignored { .. }));

    handle.navigate(location("/search?q=%20%20&patternType=literal"));
    assert!(matches!(next_settled(&mut events).await, SyncEvent::Ignored { .. }));

    // Only a context filter: nothing left to search for once it is lifted.
    handle.navigate(location("/search?q=context:global"));
    assert!(matches!(next_settled(&mut events).await, SyncEvent::Ignored { .. }));

    assert!(state.journal().is_empty());
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_unavailable_context_stays_in_query() {
    let checker = Arc::new(GatedAvailability::new());
    let state = Arc::new(RecordingState::new(Some("team/x")));
    let (tx, mut events) = mpsc::unbounded_channel();

    let handle = QueryStateSync::new(state.clone(), state.clone(), checker.clone())
        .with_events(tx)
        .start(location("/search?q=context:missing+foo"));
    next_settled(&mut events).await;

    assert_eq!(checker.calls(), vec!["missing".to_string()]);
    assert_eq!(
        state.journal(),
        vec![
            Write::Selected("global".to_string()),
            Write::Query("context:missing foo".to_string()),
        ]
    );
    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_flag_is_read_per_reaction() {
    let checker = Arc::new(GatedAvailability::new());
    let flag = SearchContextsFlag::new(true);
    let state = Arc::new(RecordingState::new(None));
    let (tx, mut events) = mpsc::unbounded_channel();

    let handle = QueryStateSync::new(state.clone(), state.clone(), checker.clone())
        .with_flag(flag.clone())
        .with_events(tx)
        .start(location("/search?q=context:team/a+one"));
    next_settled(&mut events).await;
    assert_eq!(checker.calls(), vec!["team/a".to_string()]);

    flag.set(false);
    handle.navigate(location("/search?q=context:team/b+two"));
    next_settled(&mut events).await;
    assert_eq!(checker.calls(), vec!["team/a".to_string()]);

    handle.stop().await.unwrap();
}
