//! Router-side location feed.

use crate::location::NavigableLocation;
use std::sync::Arc;
use tokio::sync::watch;

/// Sending half of the location subject.
///
/// Holds the latest location; consecutive duplicates are coalesced so the
/// controller is not woken for a location it already has.
#[derive(Debug, Clone)]
pub struct LocationFeed {
    sender: Arc<watch::Sender<NavigableLocation>>,
}

impl LocationFeed {
    pub(crate) fn channel(
        initial: NavigableLocation,
    ) -> (Self, watch::Receiver<NavigableLocation>) {
        let (sender, receiver) = watch::channel(initial);
        (
            Self {
                sender: Arc::new(sender),
            },
            receiver,
        )
    }

    /// Publish a new location. Returns false when it equals the current one.
    pub fn navigate(&self, location: NavigableLocation) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == location {
                false
            } else {
                *current = location;
                true
            }
        })
    }

    pub fn current(&self) -> NavigableLocation {
        self.sender.borrow().clone()
    }

    /// True once the controller has stopped listening.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
