//! Search domain: URL parameters, query filters and the location parser.

pub mod filter;
pub mod params;
pub mod parser;

pub use filter::{find_global_context_filter, omit_filter, ContextFilter};
pub use params::{parse_search_url, ParsedSearchUrl, SearchMode, SearchPatternType};
pub use parser::{LocationParser, ParsedQueryResult, UrlLocationParser};
