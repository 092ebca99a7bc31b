//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_parse_text, format_replay_text, ParseReport, ReplayOutcome, ReplayReport, ReplayStep,
};
use crate::config::{ConfigLoader, QueryStateConfig};
use crate::context::{
    ContextAvailability, FeatureGatedAvailability, StaticContextCatalog, TimeoutAvailability,
};
use crate::error::ApiError;
use crate::location::NavigableLocation;
use crate::search::{LocationParser, UrlLocationParser};
use crate::store::{
    InMemoryQueryStateStore, QueryStateStore, SearchContextSelection, SelectedContextCell,
};
use crate::sync::{QueryStateSync, SyncEvent};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Runtime context for CLI execution: workspace and effective configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: QueryStateConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::from_config(workspace_root, config)
    }

    pub fn from_config(
        workspace_root: PathBuf,
        config: QueryStateConfig,
    ) -> Result<Self, ApiError> {
        config.ensure_valid()?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    /// Override `search_contexts.enabled` (the `--search-contexts` flag).
    pub fn with_search_contexts(mut self, enabled: Option<bool>) -> Self {
        if let Some(enabled) = enabled {
            self.config.search_contexts.enabled = enabled;
        }
        self
    }

    pub fn config(&self) -> &QueryStateConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Parse {
                location,
                contexts,
                format,
            } => {
                let report = block_on(self.parse_location(location, contexts))?;
                if format == "json" {
                    to_json(&report)
                } else {
                    Ok(format_parse_text(&report))
                }
            }
            Commands::Replay {
                file,
                contexts,
                format,
            } => {
                let input = match file {
                    Some(path) => std::fs::read_to_string(path)?,
                    None => std::io::read_to_string(std::io::stdin())?,
                };
                let report = block_on(self.replay(&input, contexts))?;
                if format == "json" {
                    to_json(&report)
                } else {
                    Ok(format_replay_text(&report))
                }
            }
            Commands::Config { format } => {
                if format == "json" {
                    to_json(&self.config)
                } else {
                    toml::to_string_pretty(&self.config)
                        .map_err(|e| ApiError::Serialization(e.to_string()))
                }
            }
        }
    }

    /// Availability checker from configured plus ad-hoc context specs.
    fn catalog(&self, extra: &[String]) -> Arc<dyn ContextAvailability> {
        Arc::new(StaticContextCatalog::new(
            self.config
                .search_contexts
                .available
                .iter()
                .chain(extra.iter())
                .cloned(),
        ))
    }

    /// Derive the query state for one location.
    pub async fn parse_location(
        &self,
        input: &str,
        extra_contexts: &[String],
    ) -> Result<ParseReport, ApiError> {
        let location = NavigableLocation::parse(input)?;
        let search_contexts = &self.config.search_contexts;
        let checker: Arc<dyn ContextAvailability> = match search_contexts.lookup_timeout() {
            Some(timeout) => {
                Arc::new(TimeoutAvailability::new(self.catalog(extra_contexts), timeout))
            }
            None => self.catalog(extra_contexts),
        };
        let contexts = FeatureGatedAvailability::new(checker, search_contexts.enabled);
        let result = UrlLocationParser.parse(&location, &contexts).await?;
        Ok(ParseReport {
            location,
            search_contexts_enabled: search_contexts.enabled,
            result,
        })
    }

    /// Feed every non-empty, non-comment line of `input` through a live
    /// synchronizer, waiting for each reaction before sending the next.
    pub async fn replay(
        &self,
        input: &str,
        extra_contexts: &[String],
    ) -> Result<ReplayReport, ApiError> {
        let store = Arc::new(InMemoryQueryStateStore::new());
        let selection = Arc::new(SelectedContextCell::new(None));
        let (events_tx, mut events) = mpsc::unbounded_channel();

        let handle = QueryStateSync::from_config(
            &self.config.search_contexts,
            store.clone(),
            selection.clone(),
            self.catalog(extra_contexts),
        )
        .with_events(events_tx)
        .start(NavigableLocation::default());
        let seed = next_settled(&mut events).await?;

        let mut steps = Vec::new();
        let mut previous: Option<NavigableLocation> = None;
        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let entry = raw.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }

            let location = match NavigableLocation::parse(entry) {
                Ok(location) => location,
                Err(e) => {
                    warn!(line, error = %e, "Skipping invalid location");
                    let error = Some(e.to_string());
                    steps.push(ReplayStep::skipped(line, entry, ReplayOutcome::Invalid, error));
                    continue;
                }
            };

            if previous.as_ref() == Some(&location) {
                steps.push(ReplayStep::skipped(line, entry, ReplayOutcome::Duplicate, None));
                continue;
            }
            previous = Some(location.clone());

            // The feed only refuses a first line that equals the seed, which
            // has already been resolved.
            let event = if handle.navigate(location) {
                next_settled(&mut events).await?
            } else {
                seed.clone()
            };
            steps.push(ReplayStep::from_event(line, entry, &event));
        }

        handle.stop().await?;
        info!(steps = steps.len(), "Replay finished");

        Ok(ReplayReport {
            steps,
            final_state: store.snapshot(),
            selected_context: selection.selected(),
        })
    }
}

async fn next_settled(
    events: &mut mpsc::UnboundedReceiver<SyncEvent>,
) -> Result<SyncEvent, ApiError> {
    while let Some(event) = events.recv().await {
        if event.is_settled() {
            return Ok(event);
        }
    }
    Err(ApiError::TaskFailed("sync event channel closed".to_string()))
}

fn block_on<F, T>(future: F) -> Result<T, ApiError>
where
    F: std::future::Future<Output = Result<T, ApiError>>,
{
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| ApiError::TaskFailed(format!("Failed to create runtime: {}", e)))?;
    rt.block_on(future)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::Serialization(e.to_string()))
}
