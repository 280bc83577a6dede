//! Criteria: ordered column-specifier → value mappings.
//!
//! A column specifier is a column name, optionally followed by a comparison
//! operator: `"id"`, `"price >"`, `"name ilike"`, `"id !="`. The value decides
//! the predicate shape:
//!
//! | key        | value      | predicate            |
//! |------------|------------|----------------------|
//! | `col`      | scalar     | `"col" = $n`         |
//! | `col`      | list       | `"col" IN ($n, ...)` |
//! | `col !=`   | list       | `"col" NOT IN (...)` |
//! | `col <op>` | scalar     | `"col" <op> $n`      |
//! | `col`      | null       | `"col" IS NULL`      |
//! | `col !=`   | null       | `"col" IS NOT NULL`  |
//!
//! Keys are parsed once into [`Predicate`]s before compilation.
//!
//! An unquoted column name ends at the first space, so a column whose name
//! contains spaces must be written quoted: `"\"first name\""` or
//! `"\"first name\" ilike"`.
//!
//! # Example
//! ```ignore
//! use pgtable::Criteria;
//! use serde_json::json;
//!
//! let c = Criteria::new().and("in_stock", true).and("id !=", vec![1, 2]);
//! let same = Criteria::try_from(json!({"in_stock": true, "id !=": [1, 2]}))?;
//! assert_eq!(c, same);
//! # Ok::<(), pgtable::TableError>(())
//! ```

use crate::error::{TableError, TableResult};
use crate::ident::Ident;
use crate::record::json_kind;
use crate::value::Value;

/// Comparison operator parsed from a column specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=` (default), or `IN` with a list
    Eq,
    /// `!=` / `<>`, or `NOT IN` with a list
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    Ilike,
    NotIlike,
}

impl Op {
    /// Parse an operator token. The empty token is equality; matching is
    /// case-insensitive and tolerant of repeated whitespace.
    pub fn parse(token: &str) -> TableResult<Self> {
        let normalized = token
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        let op = match normalized.as_str() {
            "" | "=" => Op::Eq,
            "!=" | "<>" => Op::Ne,
            ">" => Op::Gt,
            ">=" => Op::Gte,
            "<" => Op::Lt,
            "<=" => Op::Lte,
            "LIKE" => Op::Like,
            "NOT LIKE" => Op::NotLike,
            "ILIKE" => Op::Ilike,
            "NOT ILIKE" => Op::NotIlike,
            _ => {
                return Err(TableError::compilation(format!(
                    "Unsupported operator '{}'",
                    token.trim()
                )));
            }
        };
        Ok(op)
    }

    /// SQL text for a scalar comparison.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::Ilike => "ILIKE",
            Op::NotIlike => "NOT ILIKE",
        }
    }
}

/// Fully resolved predicate: operator and operand together.
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Compare(Op, Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    IsNull,
    IsNotNull,
}

/// One parsed criterion: `{column, test}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: Ident,
    pub test: Test,
}

impl Predicate {
    /// Equality on `column`; a list becomes membership.
    pub fn eq(column: Ident, value: impl Into<Value>) -> Self {
        let test = match value.into() {
            Value::Null => Test::IsNull,
            Value::Array(items) => Test::In(items),
            value => Test::Compare(Op::Eq, value),
        };
        Self { column, test }
    }

    /// Parse a column specifier and combine it with its value.
    pub fn parse(spec: &str, value: Value) -> TableResult<Self> {
        let (column, rest) = Ident::parse_prefix(spec)?;
        let op = Op::parse(rest).map_err(|err| {
            if rest.trim_start().starts_with(|c: char| c.is_alphanumeric() || c == '_') {
                TableError::compilation(format!(
                    "Unsupported operator '{}' in '{}'; a column name containing spaces must be quoted, e.g. '\"{}\"'",
                    rest.trim(),
                    spec.trim(),
                    spec.trim().replace('"', "\"\"")
                ))
            } else {
                err
            }
        })?;
        let test = match (op, value) {
            (Op::Eq, Value::Null) => Test::IsNull,
            (Op::Ne, Value::Null) => Test::IsNotNull,
            (op @ (Op::Eq | Op::Ne), Value::Array(items)) => {
                if let Some(nested) = items.iter().find(|v| v.is_array()) {
                    return Err(TableError::compilation(format!(
                        "List for column '{column}' must contain scalars, found {}",
                        nested.kind_name()
                    )));
                }
                if op == Op::Eq {
                    Test::In(items)
                } else {
                    Test::NotIn(items)
                }
            }
            (op, Value::Array(_)) => {
                return Err(TableError::compilation(format!(
                    "Operator '{}' on column '{column}' does not accept a list",
                    op.as_sql()
                )));
            }
            (op, Value::Null) => {
                return Err(TableError::compilation(format!(
                    "Operator '{}' on column '{column}' does not accept null",
                    op.as_sql()
                )));
            }
            (op, value) => Test::Compare(op, value),
        };
        Ok(Self { column, test })
    }
}

/// Ordered mapping of column specifiers to target values.
///
/// Entries are kept as given; [`Criteria::predicates`] parses them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<(String, Value)>,
}

impl Criteria {
    /// Empty criteria: no restriction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single equality criterion.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and(column, value)
    }

    /// Append a criterion (joined with AND).
    pub fn and(mut self, spec: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(spec, value);
        self
    }

    pub fn push(&mut self, spec: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((spec.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(spec, value)| (spec.as_str(), value))
    }

    /// Parse every entry, in order.
    pub fn predicates(&self) -> TableResult<Vec<Predicate>> {
        self.entries
            .iter()
            .map(|(spec, value)| Predicate::parse(spec, value.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = Criteria::new();
        for (spec, value) in iter {
            criteria.push(spec, value);
        }
        criteria
    }
}

impl TryFrom<serde_json::Value> for Criteria {
    type Error = TableError;

    fn try_from(value: serde_json::Value) -> TableResult<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(TableError::argument(format!(
                "Criteria must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}
