//! In-memory [`Datasource`] used by the test suite and for prototyping.
//!
//! Evaluates predicate trees directly over a vector of rows with the same
//! ordering and windowing contract a real store implements. Custom
//! operators have no in-memory semantics and surface as unsupported.

use std::cmp::Ordering;
use std::future::Future;

use crate::connection::types::OrderDirection;
use crate::error::StoreError;
use crate::query::{Condition, FilterExpression, Operator, Value};
use crate::select::{Selection, SelectionNode};
use crate::store::{Datasource, FindManyArgs, Record};

/// Store backed by a plain row vector.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatasource {
    rows: Vec<Record>,
}

impl MemoryDatasource {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `rows`.
    pub fn with_rows(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    /// Appends one row.
    pub fn push(&mut self, row: Record) {
        self.rows.push(row);
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matching(&self, filter: Option<&FilterExpression>) -> Result<Vec<Record>, StoreError> {
        let mut matched = Vec::new();
        for row in &self.rows {
            let keep = match filter {
                Some(expression) => evaluate(expression, row)?,
                None => true,
            };
            if keep {
                matched.push(row.clone());
            }
        }
        Ok(matched)
    }
}

impl Datasource for MemoryDatasource {
    fn find_many(
        &self,
        args: FindManyArgs,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send {
        let result = self.matching(args.filter.as_ref()).map(|mut rows| {
            let direction = if args.take < 0 {
                args.order_by.direction.inverted()
            } else {
                args.order_by.direction
            };
            sort_rows(&mut rows, &args.order_by.path, direction);
            rows.truncate(args.take.unsigned_abs() as usize);
            if let Some(selection) = &args.select {
                rows = rows.iter().map(|row| project(row, selection)).collect();
            }
            rows
        });
        async move { result }
    }

    fn count(
        &self,
        filter: Option<&FilterExpression>,
    ) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send {
        let result = self
            .matching(filter)
            .map(|rows| Some(rows.len() as u64));
        async move { result }
    }
}

fn evaluate(expression: &FilterExpression, row: &Record) -> Result<bool, StoreError> {
    match expression {
        FilterExpression::And(members) => {
            for member in members {
                if !evaluate(member, row)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        FilterExpression::Or(members) => {
            for member in members {
                if evaluate(member, row)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        FilterExpression::Field { field, condition } => {
            let actual = row.get(field).unwrap_or(&Value::Null);
            evaluate_condition(actual, condition)
        }
    }
}

fn evaluate_condition(actual: &Value, condition: &Condition) -> Result<bool, StoreError> {
    let insensitive = condition.case_insensitive;
    match &condition.operator {
        Operator::Equals => Ok(values_equal(actual, &condition.value, insensitive)),
        Operator::Not => Ok(!values_equal(actual, &condition.value, insensitive)),
        Operator::In => match &condition.value {
            Value::List(members) => Ok(members
                .iter()
                .any(|member| values_equal(actual, member, insensitive))),
            single => Ok(values_equal(actual, single, insensitive)),
        },
        Operator::Lt => Ok(compare(actual, &condition.value) == Some(Ordering::Less)),
        Operator::Lte => Ok(matches!(
            compare(actual, &condition.value),
            Some(Ordering::Less | Ordering::Equal)
        )),
        Operator::Gt => Ok(compare(actual, &condition.value) == Some(Ordering::Greater)),
        Operator::Gte => Ok(matches!(
            compare(actual, &condition.value),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        Operator::Contains => Ok(string_test(actual, &condition.value, insensitive, |h, n| {
            h.contains(n)
        })),
        Operator::StartsWith => Ok(string_test(actual, &condition.value, insensitive, |h, n| {
            h.starts_with(n)
        })),
        Operator::EndsWith => Ok(string_test(actual, &condition.value, insensitive, |h, n| {
            h.ends_with(n)
        })),
        Operator::Custom(_) => Err(StoreError::Unsupported(
            "custom operator in predicate",
        )),
    }
}

fn values_equal(a: &Value, b: &Value, insensitive: bool) -> bool {
    if insensitive {
        if let (Value::String(left), Value::String(right)) = (a, b) {
            return left.eq_ignore_ascii_case(right);
        }
    }
    match compare(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

/// Orders two values when they are comparable: numbers against numbers
/// (integers and floats mix) and strings against strings.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn string_test(
    actual: &Value,
    operand: &Value,
    insensitive: bool,
    test: fn(&str, &str) -> bool,
) -> bool {
    let (Value::String(haystack), Value::String(needle)) = (actual, operand) else {
        return false;
    };
    if insensitive {
        test(&haystack.to_lowercase(), &needle.to_lowercase())
    } else {
        test(haystack, needle)
    }
}

/// Sorts rows by the value at `path`. Missing and incomparable values
/// sort first ascending, last descending, keeping windows deterministic.
fn sort_rows(rows: &mut [Record], path: &[String], direction: OrderDirection) {
    rows.sort_by(|a, b| {
        let left = lookup_path(a, path);
        let right = lookup_path(b, path);
        let ordering = match (left, right) {
            (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        match direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        }
    });
}

fn lookup_path<'r>(row: &'r Record, path: &[String]) -> Option<&'r Value> {
    let (first, rest) = path.split_first()?;
    let mut current = row.get(first)?;
    for segment in rest {
        let Value::Object(nested) = current else {
            return None;
        };
        current = nested.get(segment)?;
    }
    Some(current)
}

fn project(row: &Record, selection: &Selection) -> Record {
    let mut projected = Record::new();
    for (field, node) in selection {
        let Some(value) = row.get(field) else {
            continue;
        };
        match node {
            SelectionNode::Scalar => {
                projected.insert(field.clone(), value.clone());
            }
            SelectionNode::Nested(nested) => match value {
                Value::Object(child) => {
                    projected.insert(
                        field.clone(),
                        Value::Object(project(child, nested)),
                    );
                }
                Value::List(children) => {
                    let mapped = children
                        .iter()
                        .map(|child| match child {
                            Value::Object(object) => Value::Object(project(object, nested)),
                            other => other.clone(),
                        })
                        .collect();
                    projected.insert(field.clone(), Value::List(mapped));
                }
                other => {
                    projected.insert(field.clone(), other.clone());
                }
            },
        }
    }
    projected
}
