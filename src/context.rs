//! Search Context Availability
//!
//! Search contexts are named scopes that narrow a query. Whether a context spec
//! exists is answered asynchronously by a [`ContextAvailability`] implementation;
//! the wrappers here gate that lookup behind the "search contexts enabled" flag
//! and bound it with a timeout.

use crate::error::SyncError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Spec selected when a query carries no usable context. Matches the server
/// default, so it is a fixed policy value rather than a setting.
pub const GLOBAL_SEARCH_CONTEXT_SPEC: &str = "global";

/// Context spec extracted from a query, together with the filter it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContextSpec {
    pub spec: String,
    pub filter: String,
}

/// Answers whether a search context spec exists and can be used.
#[async_trait]
pub trait ContextAvailability: Send + Sync {
    async fn is_available(&self, spec: &str) -> Result<bool, SyncError>;
}

/// Shared "search contexts enabled" feature flag.
#[derive(Debug, Clone, Default)]
pub struct SearchContextsFlag {
    enabled: Arc<AtomicBool>,
}

impl SearchContextsFlag {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}

/// Availability check bound to a flag value captured for one reaction step.
///
/// When the captured value is `false` every spec resolves to unavailable
/// without touching the inner checker.
pub struct FeatureGatedAvailability {
    inner: Arc<dyn ContextAvailability>,
    enabled: bool,
}

impl FeatureGatedAvailability {
    pub fn new(inner: Arc<dyn ContextAvailability>, enabled: bool) -> Self {
        Self { inner, enabled }
    }

    /// Capture the current value of `flag`.
    pub fn snapshot(inner: Arc<dyn ContextAvailability>, flag: &SearchContextsFlag) -> Self {
        Self::new(inner, flag.is_enabled())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[async_trait]
impl ContextAvailability for FeatureGatedAvailability {
    async fn is_available(&self, spec: &str) -> Result<bool, SyncError> {
        if !self.enabled {
            return Ok(false);
        }
        self.inner.is_available(spec).await
    }
}

/// Bounds each lookup of the inner checker by a timeout.
pub struct TimeoutAvailability {
    inner: Arc<dyn ContextAvailability>,
    timeout: Duration,
}

impl TimeoutAvailability {
    pub fn new(inner: Arc<dyn ContextAvailability>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl ContextAvailability for TimeoutAvailability {
    async fn is_available(&self, spec: &str) -> Result<bool, SyncError> {
        match tokio::time::timeout(self.timeout, self.inner.is_available(spec)).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                debug!(spec, timeout_ms, "Context lookup timed out");
                Err(SyncError::LookupTimeout {
                    spec: spec.to_string(),
                    timeout_ms,
                })
            }
        }
    }
}

/// Fixed set of known context specs. The global context is always available.
#[derive(Debug, Clone, Default)]
pub struct StaticContextCatalog {
    specs: HashSet<String>,
}

impl StaticContextCatalog {
    pub fn new<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            specs: specs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, spec: &str) -> bool {
        spec == GLOBAL_SEARCH_CONTEXT_SPEC || self.specs.contains(spec)
    }
}

#[async_trait]
impl ContextAvailability for StaticContextCatalog {
    async fn is_available(&self, spec: &str) -> Result<bool, SyncError> {
        Ok(self.contains(spec))
    }
}
