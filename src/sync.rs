//! Query State Synchronization
//!
//! Keeps the query state store consistent with the navigable location. A
//! single reaction task per controller watches the location feed, resolves
//! each new location through the [`LocationParser`], and applies the result.
//!
//! Only the lookup for the most recently delivered location may write state:
//! when a new location arrives the in-flight lookup future is dropped, so a
//! superseded result can never be applied, however early it completes.
//! Stopping the controller cancels the task and waits for it, after which no
//! write can happen.

mod apply;
mod events;
mod feed;

pub use apply::{apply_parsed_result, ApplyOutcome};
pub use events::SyncEvent;
pub use feed::LocationFeed;

use crate::config::SearchContextsConfig;
use crate::context::{
    ContextAvailability, FeatureGatedAvailability, SearchContextsFlag, TimeoutAvailability,
};
use crate::error::{ApiError, SyncError};
use crate::location::NavigableLocation;
use crate::search::{LocationParser, ParsedQueryResult, UrlLocationParser};
use crate::store::{QueryStateStore, SearchContextSelection};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// A lookup started for one location.
struct InFlight {
    generation: u64,
    location: NavigableLocation,
    future: BoxFuture<'static, Result<ParsedQueryResult, SyncError>>,
}

/// Synchronization controller, configured and ready to [`start`](Self::start).
pub struct QueryStateSync {
    parser: Arc<dyn LocationParser>,
    availability: Arc<dyn ContextAvailability>,
    store: Arc<dyn QueryStateStore>,
    selection: Arc<dyn SearchContextSelection>,
    flag: SearchContextsFlag,
    events: Option<mpsc::UnboundedSender<SyncEvent>>,
}

impl QueryStateSync {
    /// Controller using the URL parser, with search contexts enabled.
    pub fn new(
        store: Arc<dyn QueryStateStore>,
        selection: Arc<dyn SearchContextSelection>,
        availability: Arc<dyn ContextAvailability>,
    ) -> Self {
        Self {
            parser: Arc::new(UrlLocationParser),
            availability,
            store,
            selection,
            flag: SearchContextsFlag::new(true),
            events: None,
        }
    }

    /// Controller set up from configuration: the flag follows
    /// `search_contexts.enabled` and lookups are bounded by the configured
    /// timeout, if any.
    pub fn from_config(
        config: &SearchContextsConfig,
        store: Arc<dyn QueryStateStore>,
        selection: Arc<dyn SearchContextSelection>,
        availability: Arc<dyn ContextAvailability>,
    ) -> Self {
        let availability: Arc<dyn ContextAvailability> = match config.lookup_timeout() {
            Some(timeout) => Arc::new(TimeoutAvailability::new(availability, timeout)),
            None => availability,
        };
        Self::new(store, selection, availability).with_flag(SearchContextsFlag::new(config.enabled))
    }

    pub fn with_parser(mut self, parser: Arc<dyn LocationParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Share a flag with the host; it is read once per reaction step.
    pub fn with_flag(mut self, flag: SearchContextsFlag) -> Self {
        self.flag = flag;
        self
    }

    /// Publish a [`SyncEvent`] for every reaction step.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SyncEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn flag(&self) -> SearchContextsFlag {
        self.flag.clone()
    }

    /// Spawn the reaction task on the current tokio runtime, seeded with
    /// `initial_location`.
    pub fn start(self, initial_location: NavigableLocation) -> SyncHandle {
        let (feed, receiver) = LocationFeed::channel(initial_location);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(receiver, cancel.clone()));
        SyncHandle {
            feed,
            cancel,
            task: Some(task),
        }
    }

    async fn run(
        self,
        mut locations: watch::Receiver<NavigableLocation>,
        cancel: CancellationToken,
    ) {
        let mut generation: u64 = 0;
        let mut last_seen = locations.borrow_and_update().clone();
        info!(location = %last_seen, "Query state sync started");
        let mut in_flight = Some(self.begin_lookup(generation, last_seen.clone()));

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = locations.changed() => {
                    if changed.is_err() {
                        debug!("Location feed closed");
                        break;
                    }
                    let location = locations.borrow_and_update().clone();
                    if location == last_seen {
                        trace!(%location, "Location unchanged, skipping");
                        continue;
                    }
                    if let Some(previous) = in_flight.take() {
                        debug!(
                            generation = previous.generation,
                            location = %previous.location,
                            "Lookup superseded by newer location"
                        );
                        self.emit(SyncEvent::Superseded {
                            generation: previous.generation,
                            location: previous.location,
                        });
                    }
                    generation += 1;
                    last_seen = location.clone();
                    in_flight = Some(self.begin_lookup(generation, location));
                }
                result = wait_in_flight(&mut in_flight) => {
                    if let Some(done) = in_flight.take() {
                        self.finish(done.generation, done.location, result);
                    }
                }
            }
        }

        info!("Query state sync stopped");
    }

    fn begin_lookup(&self, generation: u64, location: NavigableLocation) -> InFlight {
        let parser = Arc::clone(&self.parser);
        let contexts =
            FeatureGatedAvailability::snapshot(Arc::clone(&self.availability), &self.flag);
        debug!(
            generation,
            %location,
            search_contexts_enabled = contexts.is_enabled(),
            "Resolving query state"
        );
        let target = location.clone();
        let future = async move { parser.parse(&target, &contexts).await }.boxed();
        InFlight {
            generation,
            location,
            future,
        }
    }

    /// The reaction step. Runs synchronously on the controller task.
    fn finish(
        &self,
        generation: u64,
        location: NavigableLocation,
        result: Result<ParsedQueryResult, SyncError>,
    ) {
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(generation, %location, error = %e, "Failed to derive query state");
                self.emit(SyncEvent::Failed {
                    generation,
                    location,
                    error: e.to_string(),
                });
                return;
            }
        };

        match apply_parsed_result(&parsed, self.store.as_ref(), self.selection.as_ref()) {
            ApplyOutcome::Applied {
                query,
                search_context,
            } => {
                debug!(
                    generation,
                    %location,
                    query = %query,
                    search_context = %search_context,
                    "Query state applied"
                );
                self.emit(SyncEvent::Applied {
                    generation,
                    location,
                    query,
                    search_context,
                });
            }
            ApplyOutcome::Ignored => {
                trace!(generation, %location, "No search query in location");
                self.emit(SyncEvent::Ignored {
                    generation,
                    location,
                });
            }
        }
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

async fn wait_in_flight(in_flight: &mut Option<InFlight>) -> Result<ParsedQueryResult, SyncError> {
    match in_flight {
        Some(lookup) => (&mut lookup.future).await,
        None => std::future::pending().await,
    }
}

/// Handle to a running controller.
///
/// Dropping the handle cancels the controller; [`stop`](Self::stop) also waits
/// for it to finish.
pub struct SyncHandle {
    feed: LocationFeed,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Deliver a new location. Returns false if it equals the current one.
    pub fn navigate(&self, location: NavigableLocation) -> bool {
        self.feed.navigate(location)
    }

    /// Feed for other producers of locations (e.g. a router integration).
    pub fn feed(&self) -> LocationFeed {
        self.feed.clone()
    }

    pub fn current_location(&self) -> NavigableLocation {
        self.feed.current()
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the controller. Once this returns no further state mutation
    /// happens, including from lookups still pending at the time of the call.
    pub async fn stop(mut self) -> Result<(), ApiError> {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| ApiError::TaskFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
