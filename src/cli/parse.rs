//! CLI parse: clap types for querystate. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Querystate CLI - keep search query state in sync with navigable locations
#[derive(Parser)]
#[command(name = "querystate")]
#[command(about = "Derive and replay search query state from navigable locations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable logging entirely
    #[arg(long)]
    pub quiet: bool,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Override search_contexts.enabled (true or false)
    #[arg(long)]
    pub search_contexts: Option<bool>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Derive the query state for a single location
    Parse {
        /// Location, absolute URL or root-relative path (e.g. "/search?q=foo")
        location: String,
        /// Additional available context spec (repeatable)
        #[arg(long = "context")]
        contexts: Vec<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Replay locations, one per line, through a live synchronizer
    Replay {
        /// Read locations from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Additional available context spec (repeatable)
        #[arg(long = "context")]
        contexts: Vec<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the effective configuration
    Config {
        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
}
