//! Error types for query state synchronization.

use thiserror::Error;

/// Errors raised along the synchronization path.
///
/// None of these cross the controller boundary: the reaction step logs them and
/// degrades to "no state change" or to the global search context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Malformed location {input:?}: {reason}")]
    MalformedLocation { input: String, reason: String },

    #[error("Search context lookup failed for {spec:?}: {reason}")]
    AvailabilityLookup { spec: String, reason: String },

    #[error("Search context lookup for {spec:?} timed out after {timeout_ms}ms")]
    LookupTimeout { spec: String, timeout_ms: u64 },

    #[error("Failed to parse query state from location: {0}")]
    Parse(String),
}

/// Crate-level errors surfaced by configuration, logging and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Synchronization error: {0}")]
    Sync(#[from] SyncError),

    #[error("Synchronization task failed: {0}")]
    TaskFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
