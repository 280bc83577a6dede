//! Call-shape normalization.
//!
//! Table operations accept loose inputs: nothing, a bare primary-key value,
//! criteria, a raw WHERE fragment, or JSON holding any of those. This module
//! resolves them into one canonical [`StatementRequest`] before any SQL is
//! built, so malformed input fails here and never reaches the connection.

use crate::builder::QueryOptions;
use crate::criteria::{Criteria, Predicate};
use crate::error::{TableError, TableResult};
use crate::ident::TableIdentity;
use crate::record::{Arity, Record, json_kind};
use crate::value::Value;
use uuid::Uuid;

/// The table operation a request is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Find,
    FindOne,
    Where,
    Count,
    Update,
    Destroy,
}

impl OperationKind {
    fn is_mutation(self) -> bool {
        matches!(self, OperationKind::Update | OperationKind::Destroy)
    }

    fn accepts_raw(self) -> bool {
        matches!(self, OperationKind::Where | OperationKind::Count)
    }

    fn name(self) -> &'static str {
        match self {
            OperationKind::Find => "find",
            OperationKind::FindOne => "find_one",
            OperationKind::Where => "where",
            OperationKind::Count => "count",
            OperationKind::Update => "update",
            OperationKind::Destroy => "destroy",
        }
    }
}

/// Row selector as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditions {
    /// Nothing supplied.
    All,
    /// Bare primary-key value (integer, UUID, or UUID-shaped string).
    Key(Value),
    Criteria(Criteria),
    /// Hand-written WHERE body; the caller numbers its own placeholders.
    Raw { fragment: String, params: Vec<Value> },
    /// Any of the above, still in JSON form.
    Json(serde_json::Value),
}

impl Conditions {
    pub fn raw(fragment: impl Into<String>, params: Vec<Value>) -> Self {
        Conditions::Raw {
            fragment: fragment.into(),
            params,
        }
    }
}

impl From<()> for Conditions {
    fn from(_: ()) -> Self {
        Conditions::All
    }
}

impl From<i32> for Conditions {
    fn from(key: i32) -> Self {
        Conditions::Key(Value::from(key))
    }
}

impl From<i64> for Conditions {
    fn from(key: i64) -> Self {
        Conditions::Key(Value::from(key))
    }
}

impl From<Uuid> for Conditions {
    fn from(key: Uuid) -> Self {
        Conditions::Key(Value::from(key))
    }
}

impl From<&str> for Conditions {
    fn from(key: &str) -> Self {
        Conditions::Key(Value::from(key))
    }
}

impl From<String> for Conditions {
    fn from(key: String) -> Self {
        Conditions::Key(Value::from(key))
    }
}

impl From<Criteria> for Conditions {
    fn from(criteria: Criteria) -> Self {
        Conditions::Criteria(criteria)
    }
}

impl From<serde_json::Value> for Conditions {
    fn from(value: serde_json::Value) -> Self {
        Conditions::Json(value)
    }
}

/// Resolved row restriction.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Parsed predicates, joined with AND. Empty means every row.
    Predicates(Vec<Predicate>),
    Raw { fragment: String, params: Vec<Value> },
}

/// Canonical form of a table call.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementRequest {
    pub kind: OperationKind,
    pub target: Target,
    pub options: QueryOptions,
    pub arity: Arity,
}

impl StatementRequest {
    /// Resolve `conditions` for `kind` against `table`'s primary key.
    pub fn resolve(
        kind: OperationKind,
        conditions: Conditions,
        options: QueryOptions,
        table: &TableIdentity,
    ) -> TableResult<Self> {
        let conditions = match conditions {
            Conditions::Json(json) => from_json(json)?,
            other => other,
        };

        let (target, arity) = match conditions {
            Conditions::All => {
                if kind.is_mutation() {
                    return Err(TableError::argument(format!(
                        "{} requires criteria; pass empty criteria to target every row",
                        kind.name()
                    )));
                }
                (Target::Predicates(Vec::new()), Arity::List)
            }
            Conditions::Key(key) => {
                if !key.is_key_shaped() {
                    return Err(TableError::argument(format!(
                        "A bare {} is not a primary key; use an integer, a UUID, or criteria",
                        key.kind_name()
                    )));
                }
                let predicate = Predicate::eq(table.primary_key().clone(), key);
                let arity = match kind {
                    OperationKind::Find | OperationKind::FindOne => Arity::Single,
                    _ => Arity::List,
                };
                (Target::Predicates(vec![predicate]), arity)
            }
            Conditions::Criteria(criteria) => {
                (Target::Predicates(criteria.predicates()?), Arity::List)
            }
            Conditions::Raw { fragment, params } => {
                if !kind.accepts_raw() {
                    return Err(TableError::argument(format!(
                        "{} does not accept a raw SQL fragment",
                        kind.name()
                    )));
                }
                (Target::Raw { fragment, params }, Arity::List)
            }
            Conditions::Json(_) => {
                return Err(TableError::argument("Nested JSON conditions are not supported"));
            }
        };

        let arity = if kind == OperationKind::FindOne {
            Arity::Single
        } else {
            arity
        };

        Ok(Self {
            kind,
            target,
            options,
            arity,
        })
    }
}

fn from_json(json: serde_json::Value) -> TableResult<Conditions> {
    match json {
        serde_json::Value::Null => Ok(Conditions::All),
        serde_json::Value::Number(_) | serde_json::Value::String(_) => {
            Ok(Conditions::Key(Value::from(json)))
        }
        serde_json::Value::Object(_) => Ok(Conditions::Criteria(Criteria::try_from(json)?)),
        other => Err(TableError::argument(format!(
            "Conditions must be a key or an object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Row data supplied to `insert`, `update`, or `save`.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    One(Record),
    Many(Vec<Record>),
    /// An object (one row) or an array of objects (many rows).
    Json(serde_json::Value),
}

impl Data {
    /// Rows to write, with the arity of the result the caller expects back.
    pub fn resolve(self) -> TableResult<(Vec<Record>, Arity)> {
        match self {
            Data::One(record) => Ok((vec![record], Arity::Single)),
            Data::Many(records) => Ok((records, Arity::List)),
            Data::Json(serde_json::Value::Array(items)) => {
                let rows = items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        Record::from_json(item).map_err(|_| {
                            TableError::argument(format!("Row {idx} is not a JSON object"))
                        })
                    })
                    .collect::<TableResult<Vec<_>>>()?;
                Ok((rows, Arity::List))
            }
            Data::Json(json) => Ok((vec![Record::from_json(json)?], Arity::Single)),
        }
    }

    /// A single row, for `update` and `save`.
    pub fn resolve_fields(self) -> TableResult<Record> {
        match self.resolve()? {
            (mut rows, Arity::Single) if rows.len() == 1 => Ok(rows.remove(0)),
            (rows, _) => Err(TableError::argument(format!(
                "Expected a single row of fields, got {} rows",
                rows.len()
            ))),
        }
    }
}

impl From<Record> for Data {
    fn from(record: Record) -> Self {
        Data::One(record)
    }
}

impl From<&Record> for Data {
    fn from(record: &Record) -> Self {
        Data::One(record.clone())
    }
}

impl From<Vec<Record>> for Data {
    fn from(records: Vec<Record>) -> Self {
        Data::Many(records)
    }
}

impl From<serde_json::Value> for Data {
    fn from(value: serde_json::Value) -> Self {
        Data::Json(value)
    }
}

impl From<&serde_json::Value> for Data {
    fn from(value: &serde_json::Value) -> Self {
        Data::Json(value.clone())
    }
}
