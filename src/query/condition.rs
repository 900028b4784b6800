//! Parser for one `field:value` query segment.
//!
//! A segment resolves to a single leaf condition. Value forms are tried in
//! a fixed order: quoted exact match, bracket list, comparison/wildcard
//! prefixes, caller-supplied operator prefixes, and finally a typed exact
//! match. Segments without a `field:` shape yield `None` so the caller can
//! treat them as free text.

use crate::error::{Error, Result};
use crate::query::filter::{Condition, FilterExpression, Operator};
use crate::query::value::{parse_scalar, Value};

/// Ordered table mapping literal value prefixes to store operator names.
///
/// Lookup is first-match-wins in insertion order, so more specific
/// prefixes should be registered first.
#[derive(Clone, Debug, Default)]
pub struct CustomOperators {
    entries: Vec<(String, String)>,
}

impl CustomOperators {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a prefix and the operator name it rewrites to.
    pub fn with(mut self, prefix: impl Into<String>, operator: impl Into<String>) -> Self {
        self.entries.push((prefix.into(), operator.into()));
        self
    }

    /// True when no prefixes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resolve<'v>(&self, value: &'v str) -> Option<(Operator, &'v str)> {
        self.entries
            .iter()
            .find(|(prefix, _)| value.starts_with(prefix.as_str()))
            .map(|(prefix, operator)| (Operator::from_name(operator), &value[prefix.len()..]))
    }
}

/// Parses one trimmed query segment into a leaf condition.
///
/// Returns `Ok(None)` when the segment has no `field:` form; the caller is
/// expected to fall back to full-text search. An empty field name or empty
/// value is a malformed-query error rather than a silent empty condition.
pub fn parse_segment(
    segment: &str,
    custom: &CustomOperators,
) -> Result<Option<FilterExpression>> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Ok(None);
    }

    if let Some(expr) = parse_quoted(segment) {
        return Ok(Some(expr));
    }

    let Some((field, raw_value)) = segment.split_once(':') else {
        return Ok(None);
    };
    let field = field.trim();
    let value = raw_value.trim();
    if field.is_empty() || value.is_empty() {
        return Err(Error::MalformedQuery {
            segment: segment.to_owned(),
        });
    }

    if let Some(values) = parse_bracket_list(value) {
        let condition = Condition::new(Operator::In, Value::List(values));
        return Ok(Some(FilterExpression::field(field, condition)));
    }

    if let Some(condition) = parse_operator_prefix(value) {
        return Ok(Some(FilterExpression::field(field, condition)));
    }

    if let Some((operator, rest)) = custom.resolve(value) {
        let condition = Condition::new(operator, parse_scalar(rest));
        return Ok(Some(FilterExpression::field(field, condition)));
    }

    let condition = Condition::equals(parse_scalar(value));
    Ok(Some(FilterExpression::field(field, condition)))
}

/// `field:"literal contents"` with a word-character field name. The quoted
/// payload is taken verbatim, bypassing value typing.
fn parse_quoted(segment: &str) -> Option<FilterExpression> {
    let (field, rest) = segment.split_once(':')?;
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    if rest.len() < 2 || !rest.starts_with('"') || !rest.ends_with('"') {
        return None;
    }
    let inner = &rest[1..rest.len() - 1];
    if inner.contains('"') {
        return None;
    }
    Some(FilterExpression::field(
        field,
        Condition::equals(Value::String(inner.to_owned())),
    ))
}

/// `[a,b,c]` bracket lists. Elements are trimmed but stay strings; an
/// empty list degrades to `in [""]` rather than erroring. A bracket with
/// no closing `]` is not a list and falls through to exact match.
fn parse_bracket_list(value: &str) -> Option<Vec<Value>> {
    if value.len() < 2 || !value.starts_with('[') || !value.ends_with(']') {
        return None;
    }
    let inner = &value[1..value.len() - 1];
    Some(
        inner
            .split(',')
            .map(|element| Value::String(element.trim().to_owned()))
            .collect(),
    )
}

/// Comparison and wildcard prefixes, tried in fixed order. Only one
/// leading symbol is stripped before the remainder is captured, so
/// `>>100` parses as `gt ">100"`. Wildcard forms match case-insensitively.
fn parse_operator_prefix(value: &str) -> Option<Condition> {
    if let Some(rest) = value.strip_prefix(">=") {
        if !rest.is_empty() {
            return Some(Condition::new(Operator::Gte, parse_scalar(rest)));
        }
    }
    if let Some(rest) = value.strip_prefix("<=") {
        if !rest.is_empty() {
            return Some(Condition::new(Operator::Lte, parse_scalar(rest)));
        }
    }
    if let Some(rest) = value.strip_prefix('>') {
        if !rest.is_empty() {
            return Some(Condition::new(Operator::Gt, parse_scalar(rest)));
        }
    }
    if let Some(rest) = value.strip_prefix('<') {
        if !rest.is_empty() {
            return Some(Condition::new(Operator::Lt, parse_scalar(rest)));
        }
    }
    if let Some(rest) = value.strip_prefix("!=") {
        if !rest.is_empty() {
            return Some(Condition::new(Operator::Not, parse_scalar(rest)));
        }
    }
    if value.len() > 2 && value.starts_with('*') && value.ends_with('*') {
        let inner = &value[1..value.len() - 1];
        return Some(
            Condition::new(Operator::Contains, Value::String(inner.to_owned())).insensitive(),
        );
    }
    if value.len() > 1 {
        if let Some(rest) = value.strip_prefix('*') {
            return Some(
                Condition::new(Operator::EndsWith, Value::String(rest.to_owned())).insensitive(),
            );
        }
        if let Some(rest) = value.strip_suffix('*') {
            return Some(
                Condition::new(Operator::StartsWith, Value::String(rest.to_owned()))
                    .insensitive(),
            );
        }
    }
    None
}
