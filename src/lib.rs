//! Querystate: Search Query State Synchronization
//!
//! Keeps an application-wide search query state consistent with the current
//! navigable location, resolving search context filters through asynchronous
//! availability lookups.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod location;
pub mod logging;
pub mod search;
pub mod store;
pub mod sync;

pub use context::GLOBAL_SEARCH_CONTEXT_SPEC;
pub use location::NavigableLocation;
pub use sync::{QueryStateSync, SyncEvent, SyncHandle};
