//! Top-level `context:` filter detection in search queries.

use std::ops::Range;

const CONTEXT_FIELD: &str = "context:";

/// A `context:` filter found at the top level of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFilter {
    /// Unquoted context spec, e.g. `@alice/project`.
    pub spec: String,
    /// The filter exactly as written in the query.
    pub filter: String,
    span: Range<usize>,
}

#[derive(Debug)]
struct Token {
    span: Range<usize>,
    depth: usize,
    /// A quote opened in this token runs to the end of the query.
    unterminated: bool,
}

/// Split a query into whitespace-separated tokens, keeping quoted runs intact
/// and recording the paren depth each token starts at.
fn tokenize(query: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut depth: usize = 0;
    let mut start: Option<(usize, usize)> = None;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, ch) in query.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if ch.is_whitespace() {
            if let Some((begin, token_depth)) = start.take() {
                tokens.push(Token {
                    span: begin..index,
                    depth: token_depth,
                    unterminated: false,
                });
            }
            continue;
        }

        if start.is_none() {
            start = Some((index, depth));
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    if let Some((begin, token_depth)) = start {
        tokens.push(Token {
            span: begin..query.len(),
            depth: token_depth,
            unterminated: quote.is_some(),
        });
    }

    tokens
}

fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && first == last {
            let inner = &value[1..value.len() - 1];
            return inner.replace(&format!("\\{}", first as char), &(first as char).to_string());
        }
    }
    value.to_string()
}

/// Find the single top-level `context:` filter of a query.
///
/// Returns `None` when there is no such filter, when it is repeated, when its
/// value is empty, or when the query has a top-level `or`, which makes the
/// context part of an alternative rather than of the whole query.
pub fn find_global_context_filter(query: &str) -> Option<ContextFilter> {
    let tokens = tokenize(query);
    let mut found: Option<ContextFilter> = None;

    for token in &tokens {
        let text = &query[token.span.clone()];
        if token.depth > 0 || text.starts_with('(') {
            continue;
        }
        if text.eq_ignore_ascii_case("or") {
            return None;
        }
        let is_context = text
            .get(..CONTEXT_FIELD.len())
            .is_some_and(|field| field.eq_ignore_ascii_case(CONTEXT_FIELD));
        if !is_context || token.unterminated {
            continue;
        }

        let spec = unquote(&text[CONTEXT_FIELD.len()..]);
        if spec.trim().is_empty() {
            continue;
        }
        if found.is_some() {
            return None;
        }
        found = Some(ContextFilter {
            spec,
            filter: text.to_string(),
            span: token.span.clone(),
        });
    }

    found
}

/// Remove a previously found filter from the query it was found in.
pub fn omit_filter(query: &str, filter: &ContextFilter) -> String {
    let before = query.get(..filter.span.start).unwrap_or_default().trim_end();
    let after = query.get(filter.span.end..).unwrap_or_default().trim_start();
    match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (_, true) => before.to_string(),
        _ => format!("{} {}", before, after),
    }
}
