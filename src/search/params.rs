//! Search URL parameters: `q`, `patternType`, `case` and `sm`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the query pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPatternType {
    #[default]
    Standard,
    Literal,
    Regexp,
    Structural,
    Keyword,
}

impl FromStr for SearchPatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "literal" => Ok(Self::Literal),
            "regexp" => Ok(Self::Regexp),
            "structural" => Ok(Self::Structural),
            "keyword" => Ok(Self::Keyword),
            other => Err(format!("unknown pattern type: {}", other)),
        }
    }
}

impl fmt::Display for SearchPatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Standard => "standard",
            Self::Literal => "literal",
            Self::Regexp => "regexp",
            Self::Structural => "structural",
            Self::Keyword => "keyword",
        };
        f.write_str(name)
    }
}

/// Search mode carried in the `sm` parameter (`0` precise, `1` smart).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Precise,
    Smart,
}

impl SearchMode {
    fn from_param(value: &str) -> Option<Self> {
        match value.trim() {
            "0" => Some(Self::Precise),
            "1" => Some(Self::Smart),
            _ => None,
        }
    }
}

/// Search parameters decoded from a location's query string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedSearchUrl {
    /// Trimmed `q` value; `None` when missing or blank.
    pub query: Option<String>,
    pub pattern_type: Option<SearchPatternType>,
    pub case_sensitive: bool,
    pub search_mode: Option<SearchMode>,
}

/// Decode the search parameters of a query string (with or without leading `?`).
///
/// Never fails: undecodable or unknown values fall back to `None`/defaults.
pub fn parse_search_url(search: &str) -> ParsedSearchUrl {
    let search = search.strip_prefix('?').unwrap_or(search);
    let mut parsed = ParsedSearchUrl::default();

    for (key, value) in url::form_urlencoded::parse(search.as_bytes()) {
        match key.as_ref() {
            "q" if parsed.query.is_none() => {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    parsed.query = Some(trimmed.to_string());
                }
            }
            "patternType" if parsed.pattern_type.is_none() => {
                parsed.pattern_type = value.parse().ok();
            }
            "case" => {
                parsed.case_sensitive = value.eq_ignore_ascii_case("yes");
            }
            "sm" if parsed.search_mode.is_none() => {
                parsed.search_mode = SearchMode::from_param(&value);
            }
            _ => {}
        }
    }

    parsed
}
