//! CLI presentation: report types and their text formatters.

use crate::location::NavigableLocation;
use crate::search::ParsedQueryResult;
use crate::store::QueryState;
use crate::sync::SyncEvent;
use comfy_table::Table;
use serde::Serialize;

/// Result of `querystate parse`.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub location: NavigableLocation,
    pub search_contexts_enabled: bool,
    pub result: ParsedQueryResult,
}

/// What happened to one replayed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayOutcome {
    Applied,
    Ignored,
    Failed,
    /// Same location as the previous one; coalesced by the feed.
    Duplicate,
    /// Not a parseable location.
    Invalid,
}

impl ReplayOutcome {
    fn label(self) -> &'static str {
        match self {
            ReplayOutcome::Applied => "applied",
            ReplayOutcome::Ignored => "ignored",
            ReplayOutcome::Failed => "failed",
            ReplayOutcome::Duplicate => "duplicate",
            ReplayOutcome::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub line: usize,
    pub input: String,
    pub outcome: ReplayOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplayStep {
    pub fn skipped(
        line: usize,
        input: &str,
        outcome: ReplayOutcome,
        error: Option<String>,
    ) -> Self {
        Self {
            line,
            input: input.to_string(),
            outcome,
            query: None,
            search_context: None,
            error,
        }
    }

    pub fn from_event(line: usize, input: &str, event: &SyncEvent) -> Self {
        match event {
            SyncEvent::Applied {
                query,
                search_context,
                ..
            } => Self {
                line,
                input: input.to_string(),
                outcome: ReplayOutcome::Applied,
                query: Some(query.clone()),
                search_context: Some(search_context.clone()),
                error: None,
            },
            SyncEvent::Failed { error, .. } => {
                Self::skipped(line, input, ReplayOutcome::Failed, Some(error.clone()))
            }
            SyncEvent::Ignored { .. } | SyncEvent::Superseded { .. } => {
                Self::skipped(line, input, ReplayOutcome::Ignored, None)
            }
        }
    }
}

/// Result of `querystate replay`.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    pub final_state: QueryState,
    pub selected_context: Option<String>,
}

pub fn format_parse_text(report: &ParseReport) -> String {
    let result = &report.result;
    let mut lines = vec![
        format!("Location:        {}", report.location),
        format!(
            "Query:           {}",
            result.effective_query().unwrap_or("(none)")
        ),
    ];
    match &result.search_context_spec {
        Some(context) => lines.push(format!(
            "Search context:  {} (from {})",
            context.spec, context.filter
        )),
        None => lines.push("Search context:  (none)".to_string()),
    }
    if let Some(pattern_type) = result.parsed_url.pattern_type {
        lines.push(format!("Pattern type:    {}", pattern_type));
    }
    lines.push(format!(
        "Case sensitive:  {}",
        if result.parsed_url.case_sensitive { "yes" } else { "no" }
    ));
    if !report.search_contexts_enabled {
        lines.push("Search contexts are disabled".to_string());
    }
    lines.join("\n")
}

pub fn format_replay_text(report: &ReplayReport) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Line", "Location", "Outcome", "Query", "Context"]);
    for step in &report.steps {
        let detail = step
            .error
            .clone()
            .or_else(|| step.query.clone())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            step.line.to_string(),
            step.input.clone(),
            step.outcome.label().to_string(),
            detail,
            step.search_context.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let state = &report.final_state;
    let query = if state.query.is_empty() {
        "(none)"
    } else {
        state.query.as_str()
    };
    format!(
        "{}\n\nFinal query:     {}\nPattern type:    {}\nCase sensitive:  {}\n\
         Search context:  {}\nUpdates applied: {}",
        table,
        query,
        state.pattern_type,
        if state.case_sensitive { "yes" } else { "no" },
        report.selected_context.as_deref().unwrap_or("(none)"),
        state.generation
    )
}
