//! Compiles a human-typed filter string into a predicate tree.
//!
//! The string splits on whitespace-delimited `AND`/`OR` joiners
//! (case-insensitive). Segments with a `field:value` shape become leaf
//! conditions; anything else falls back to a case-insensitive substring
//! search across the caller's searchable fields. Mixed joiners fold left
//! to right without precedence or parenthesization, which is the
//! documented behavior and not something to correct here.

use tracing::debug;

use crate::error::Result;
use crate::query::condition::{parse_segment, CustomOperators};
use crate::query::filter::{Condition, FilterExpression};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Joiner {
    And,
    Or,
}

/// Compiles `query` into a predicate tree.
///
/// Returns `Ok(None)` for blank input and for input in which no segment
/// contributes a condition (free text with an empty searchable set).
/// A single contributed condition is returned unwrapped.
pub fn parse_filter(
    query: &str,
    searchable_fields: &[String],
    custom_operators: &CustomOperators,
) -> Result<Option<FilterExpression>> {
    if query.trim().is_empty() {
        return Ok(None);
    }

    let (segments, joiners) = split_on_joiners(query);

    // Joiner preceding each contributed condition; the first entry is
    // ignored during the fold.
    let mut conditions: Vec<(Option<Joiner>, FilterExpression)> = Vec::new();
    for (index, raw_segment) in segments.iter().enumerate() {
        let segment = raw_segment.trim();
        if segment.is_empty() {
            continue;
        }
        let joiner = if index == 0 {
            None
        } else {
            joiners.get(index - 1).copied()
        };
        if let Some(condition) = parse_segment(segment, custom_operators)? {
            conditions.push((joiner, condition));
        } else if let Some(search) = full_text_search(segment, searchable_fields) {
            conditions.push((joiner, search));
        }
    }

    let mut iter = conditions.into_iter();
    let Some((_, first)) = iter.next() else {
        return Ok(None);
    };
    let mut accumulator = first;
    for (joiner, condition) in iter {
        accumulator = match joiner.unwrap_or(Joiner::And) {
            Joiner::And => match accumulator {
                FilterExpression::And(mut members) => {
                    members.push(condition);
                    FilterExpression::And(members)
                }
                other => FilterExpression::And(vec![other, condition]),
            },
            Joiner::Or => match accumulator {
                FilterExpression::Or(mut members) => {
                    members.push(condition);
                    FilterExpression::Or(members)
                }
                other => FilterExpression::Or(vec![other, condition]),
            },
        };
    }

    debug!(query, filter = ?accumulator, "compiled filter expression");
    Ok(Some(accumulator))
}

/// Free-text fallback: an OR of case-insensitive `contains` conditions
/// over the searchable fields. An empty field set contributes nothing,
/// which is the only way a segment disappears from the result.
fn full_text_search(segment: &str, searchable_fields: &[String]) -> Option<FilterExpression> {
    if searchable_fields.is_empty() {
        return None;
    }
    let members = searchable_fields
        .iter()
        .map(|field| {
            FilterExpression::field(field.clone(), Condition::contains_insensitive(segment))
        })
        .collect();
    Some(FilterExpression::Or(members))
}

/// Splits on `AND`/`OR` words that are both preceded and followed by
/// whitespace, preserving the joiners positionally. A joiner word at the
/// very start or end of the string is ordinary text, as is one not
/// surrounded by whitespace.
fn split_on_joiners(input: &str) -> (Vec<&str>, Vec<Joiner>) {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut joiners = Vec::new();
    let mut segment_start = 0;
    let mut cursor = 0;

    while cursor < bytes.len() {
        if !bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
            continue;
        }
        let whitespace_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        let word_start = cursor;
        while cursor < bytes.len() && !bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        let word = &input[word_start..cursor];
        let joiner = if word.eq_ignore_ascii_case("AND") {
            Some(Joiner::And)
        } else if word.eq_ignore_ascii_case("OR") {
            Some(Joiner::Or)
        } else {
            None
        };
        let followed_by_whitespace = cursor < bytes.len() && bytes[cursor].is_ascii_whitespace();
        if let (Some(joiner), true) = (joiner, followed_by_whitespace) {
            segments.push(&input[segment_start..whitespace_start]);
            joiners.push(joiner);
            while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                cursor += 1;
            }
            segment_start = cursor;
        }
    }
    segments.push(&input[segment_start..]);
    (segments, joiners)
}
