//! Parser for the comma-separated index syntax shared by the
//! `custom_indices` and `ignore_indices` node inputs.
//!
//! ```text
//! "1,3,5-8,10"  ->  [1, 3, 5, 6, 7, 8, 10]
//! ```
//!
//! Tokens are separated by commas; each is either a non-negative integer or an
//! inclusive range `a-b` with `a <= b`. Surrounding whitespace is ignored.
//! Anything else (negative numbers, reversed ranges, words) is dropped without
//! error so a half-typed widget value still yields a usable list.

use std::collections::BTreeSet;

use tracing::debug;

/// Widest range a single `a-b` token may expand to.
///
/// Matches the largest `line_index` the selector widget accepts; wider ranges
/// are dropped like any other malformed token.
pub const MAX_RANGE_SPAN: usize = 1_000_000;

/// Parses `input` into a flat, order-preserving list of indices.
///
/// Duplicates are kept: `"2,2"` walks index 2 twice in a custom sequence.
pub fn parse_indices(input: &str) -> Vec<usize> {
    let mut out = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_token(token) {
            Some(Token::Single(i)) => out.push(i),
            Some(Token::Range(a, b)) => out.extend(a..=b),
            None => debug!(token, "dropping malformed index token"),
        }
    }
    out
}

/// Parses `input` into a set of indices, for exclusion lists.
pub fn parse_index_set(input: &str) -> BTreeSet<usize> {
    parse_indices(input).into_iter().collect()
}

enum Token {
    Single(usize),
    Range(usize, usize),
}

fn parse_token(token: &str) -> Option<Token> {
    match token.split_once('-') {
        Some((start, end)) => {
            let start: usize = start.trim().parse().ok()?;
            let end: usize = end.trim().parse().ok()?;
            if start > end || end - start >= MAX_RANGE_SPAN {
                return None;
            }
            Some(Token::Range(start, end))
        }
        None => token.parse().ok().map(Token::Single),
    }
}
