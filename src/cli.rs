//! CLI domain: parse, route, output and presentation only.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_parse_text, format_replay_text, ParseReport, ReplayOutcome, ReplayReport, ReplayStep,
};
pub use route::RunContext;
