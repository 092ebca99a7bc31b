//! Configuration System
//!
//! Layered configuration for the query state synchronizer: built-in defaults,
//! the global config file, workspace config files and `QUERYSTATE_*`
//! environment variables, merged with the `config` crate.

use crate::context::GLOBAL_SEARCH_CONTEXT_SPEC;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryStateConfig {
    /// Search context settings
    #[serde(default)]
    pub search_contexts: SearchContextsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search context settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchContextsConfig {
    /// Whether context filters in URLs are checked at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound for a single availability lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_timeout_ms: Option<u64>,

    /// Context specs known to exist (used by the static catalog)
    #[serde(default)]
    pub available: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for SearchContextsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            lookup_timeout_ms: None,
            available: Vec::new(),
        }
    }
}

impl SearchContextsConfig {
    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }

    /// Validate search context settings
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.lookup_timeout_ms == Some(0) {
            errors.push(ValidationError::SearchContexts(
                "lookup_timeout_ms must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.available {
            if spec.trim().is_empty() {
                errors.push(ValidationError::SearchContexts(
                    "available contexts cannot contain empty specs".to_string(),
                ));
            } else if spec == GLOBAL_SEARCH_CONTEXT_SPEC {
                errors.push(ValidationError::SearchContexts(format!(
                    "'{}' is always available and cannot be listed",
                    GLOBAL_SEARCH_CONTEXT_SPEC
                )));
            } else if !seen.insert(spec.as_str()) {
                errors.push(ValidationError::SearchContexts(format!(
                    "duplicate context spec '{}'",
                    spec
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    SearchContexts(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::SearchContexts(msg) => write!(f, "Search contexts: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl QueryStateConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.search_contexts.validate() {
            errors.append(&mut e);
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into a single [`ApiError`].
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
