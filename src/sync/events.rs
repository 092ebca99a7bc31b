//! Events published by the synchronization controller.

use crate::location::NavigableLocation;
use serde::Serialize;

/// Outcome of one reaction step, or of a lookup that lost to a newer location.
///
/// `generation` numbers locations in the order the controller started
/// resolving them; the initial location is generation 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The query was written to the store after selecting `search_context`.
    Applied {
        generation: u64,
        location: NavigableLocation,
        query: String,
        search_context: String,
    },
    /// The location carried no search intent; nothing was written.
    Ignored {
        generation: u64,
        location: NavigableLocation,
    },
    /// The parser failed; nothing was written.
    Failed {
        generation: u64,
        location: NavigableLocation,
        error: String,
    },
    /// A newer location arrived before this lookup finished; its result was dropped.
    Superseded {
        generation: u64,
        location: NavigableLocation,
    },
}

impl SyncEvent {
    pub fn generation(&self) -> u64 {
        match self {
            SyncEvent::Applied { generation, .. }
            | SyncEvent::Ignored { generation, .. }
            | SyncEvent::Failed { generation, .. }
            | SyncEvent::Superseded { generation, .. } => *generation,
        }
    }

    pub fn location(&self) -> &NavigableLocation {
        match self {
            SyncEvent::Applied { location, .. }
            | SyncEvent::Ignored { location, .. }
            | SyncEvent::Failed { location, .. }
            | SyncEvent::Superseded { location, .. } => location,
        }
    }

    /// True for events that end a reaction step (everything but `Superseded`).
    pub fn is_settled(&self) -> bool {
        !matches!(self, SyncEvent::Superseded { .. })
    }
}
