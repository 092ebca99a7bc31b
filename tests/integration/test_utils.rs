//! Shared test utilities for integration tests
//!
//! Provides a checker whose lookups block until the test releases them, and a
//! recording store/selection pair that keeps every write in call order.

use async_trait::async_trait;
use parking_lot::Mutex;
use querystate::context::ContextAvailability;
use querystate::error::SyncError;
use querystate::search::ParsedSearchUrl;
use querystate::store::{QueryState, QueryStateStore, SearchContextSelection};
use querystate::SyncEvent;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Availability checker whose answers are controlled by the test.
///
/// A spec registered with [`hold`](Self::hold) blocks until the returned
/// sender is used; unregistered specs resolve to unavailable immediately.
#[derive(Default)]
pub struct GatedAvailability {
    gates: Mutex<HashMap<String, oneshot::Receiver<bool>>>,
    calls: Mutex<Vec<String>>,
}

impl GatedAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self, spec: &str) -> oneshot::Sender<bool> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(spec.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Wait until a lookup for `spec` has started.
    pub async fn wait_for_call(&self, spec: &str) {
        tokio::time::timeout(WAIT, async {
            while !self.calls.lock().iter().any(|s| s == spec) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("lookup was never started");
    }
}

#[async_trait]
impl ContextAvailability for GatedAvailability {
    async fn is_available(&self, spec: &str) -> Result<bool, SyncError> {
        self.calls.lock().push(spec.to_string());
        let gate = self.gates.lock().remove(spec);
        match gate {
            Some(rx) => Ok(rx.await.unwrap_or(false)),
            None => Ok(false),
        }
    }
}

/// One write observed by [`RecordingState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Selected(String),
    Query(String),
}

/// Store and selection in one, journaling every write.
#[derive(Default)]
pub struct RecordingState {
    journal: Mutex<Vec<Write>>,
    selected: Mutex<Option<String>>,
    state: Mutex<QueryState>,
}

impl RecordingState {
    pub fn new(selected: Option<&str>) -> Self {
        Self {
            selected: Mutex::new(selected.map(str::to_string)),
            ..Self::default()
        }
    }

    pub fn journal(&self) -> Vec<Write> {
        self.journal.lock().clone()
    }
}

impl QueryStateStore for RecordingState {
    fn set_query_state_from_url(&self, parsed: &ParsedSearchUrl, query: &str) {
        self.journal.lock().push(Write::Query(query.to_string()));
        let mut state = self.state.lock();
        state.query = query.to_string();
        state.case_sensitive = parsed.case_sensitive;
        state.generation += 1;
    }

    fn snapshot(&self) -> QueryState {
        self.state.lock().clone()
    }
}

impl SearchContextSelection for RecordingState {
    fn selected(&self) -> Option<String> {
        self.selected.lock().clone()
    }

    fn set_selected(&self, spec: &str) {
        self.journal.lock().push(Write::Selected(spec.to_string()));
        *self.selected.lock() = Some(spec.to_string());
    }
}

/// Next event, whatever its kind.
pub async fn next_event(events: &mut mpsc::UnboundedReceiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for sync event")
        .expect("event channel closed")
}

/// Next event that ends a reaction step.
pub async fn next_settled(events: &mut mpsc::UnboundedReceiver<SyncEvent>) -> SyncEvent {
    loop {
        let event = next_event(events).await;
        if event.is_settled() {
            return event;
        }
    }
}
