//! Predicate tree produced by the filter compiler and consumed by stores.
//!
//! The tree serializes to the conventional JSON shape document stores
//! expect: `{"AND": [...]}`, `{"OR": [...]}`, and
//! `{"field": {"equals": value}}` leaves, with `"mode": "insensitive"`
//! attached to case-insensitive conditions.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::query::value::Value;

/// Comparison operator attached to a leaf condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    /// Exact match.
    Equals,
    /// Negated exact match.
    Not,
    /// Membership in a list of values.
    In,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Store-specific operator addressed by its wire name.
    Custom(String),
}

impl Operator {
    /// Wire name of the operator, as it appears in serialized predicates.
    pub fn name(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::Not => "not",
            Operator::In => "in",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Custom(name) => name,
        }
    }

    /// Resolves a wire name back to an operator. Unknown names become
    /// [`Operator::Custom`] so caller-supplied operator tables can target
    /// anything their store understands.
    pub fn from_name(name: &str) -> Self {
        match name {
            "equals" => Operator::Equals,
            "not" => Operator::Not,
            "in" => Operator::In,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "contains" => Operator::Contains,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            other => Operator::Custom(other.to_owned()),
        }
    }
}

/// A single-field comparison. Leaf conditions never nest.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// The comparison operator.
    pub operator: Operator,
    /// Operand; [`Value::List`] for `in`.
    pub value: Value,
    /// When set, string comparisons ignore case.
    pub case_insensitive: bool,
}

impl Condition {
    /// Builds a condition with the case-sensitive default.
    pub fn new(operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            operator,
            value: value.into(),
            case_insensitive: false,
        }
    }

    /// Exact-match condition.
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::new(Operator::Equals, value)
    }

    /// Case-insensitive substring condition.
    pub fn contains_insensitive(value: impl Into<Value>) -> Self {
        Self::new(Operator::Contains, value).insensitive()
    }

    /// Marks the condition case-insensitive.
    pub fn insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = if self.case_insensitive { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(entries))?;
        map.serialize_entry(self.operator.name(), &self.value)?;
        if self.case_insensitive {
            map.serialize_entry("mode", "insensitive")?;
        }
        map.end()
    }
}

/// Nested AND/OR structure of leaf field conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpression {
    /// Conjunction of sub-expressions.
    And(Vec<FilterExpression>),
    /// Disjunction of sub-expressions.
    Or(Vec<FilterExpression>),
    /// Leaf comparison on one field.
    Field {
        /// Field name the condition applies to.
        field: String,
        /// The comparison itself.
        condition: Condition,
    },
}

impl FilterExpression {
    /// Leaf constructor.
    pub fn field(name: impl Into<String>, condition: Condition) -> Self {
        FilterExpression::Field {
            field: name.into(),
            condition,
        }
    }

    /// Combines filter members the way the resolver merges base, parsed,
    /// and explicit filters: zero members is no filter, one member is used
    /// unwrapped, two or more are conjoined.
    pub fn combine(members: Vec<FilterExpression>) -> Option<FilterExpression> {
        let mut members = members;
        match members.len() {
            0 => None,
            1 => members.pop(),
            _ => Some(FilterExpression::And(members)),
        }
    }
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            FilterExpression::And(members) => map.serialize_entry("AND", members)?,
            FilterExpression::Or(members) => map.serialize_entry("OR", members)?,
            FilterExpression::Field { field, condition } => {
                map.serialize_entry(field, condition)?;
            }
        }
        map.end()
    }
}
