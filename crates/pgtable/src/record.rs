//! Row data: [`Record`] (ordered column → value map) and [`RowSet`] (shaped results).

use crate::error::{TableError, TableResult};
use crate::value::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_postgres::Row;

/// An ordered mapping of column names to values.
///
/// Used for row data going in (`insert`, `update`, `save`) and for rows coming
/// back from the database. Column order is preserved; it defines the column
/// list of generated INSERT statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column, replacing (in place) any previous value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((column, value));
                None
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Remove a column, keeping the order of the others.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(name, _)| name == column)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Whether `other` has exactly the same set of columns (in any order).
    pub fn same_columns(&self, other: &Record) -> bool {
        self.len() == other.len() && self.columns().all(|c| other.contains(c))
    }

    /// Decode a driver row, column by column.
    pub fn from_row(row: &Row) -> TableResult<Self> {
        let mut fields = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            let value: Value = row
                .try_get(idx)
                .map_err(|e| TableError::decode(column.name(), e.to_string()))?;
            fields.push((column.name().to_string(), value));
        }
        Ok(Self { fields })
    }

    /// Build a record from a JSON object. Key order is preserved.
    pub fn from_json(value: serde_json::Value) -> TableResult<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(TableError::argument(format!(
                "Expected a JSON object of column => value, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Build a record from any serializable struct or map.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> TableResult<Self> {
        Self::from_json(serde_json::to_value(value)?)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.clone().into()))
                .collect(),
        )
    }

    /// Decode into any deserializable type, going through JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> TableResult<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.set(column, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Result arity: one row (or none), or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    List,
}

/// Rows returned by a statement, shaped by its [`Arity`].
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    /// At most one row; `None` means "not found".
    Single(Option<Record>),
    List(Vec<Record>),
}

impl RowSet {
    /// Reduce `rows` to the requested arity (the first row for `Single`).
    pub fn shape(rows: Vec<Record>, arity: Arity) -> Self {
        match arity {
            Arity::Single => RowSet::Single(rows.into_iter().next()),
            Arity::List => RowSet::List(rows),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, RowSet::Single(_))
    }

    pub fn len(&self) -> usize {
        match self {
            RowSet::Single(row) => usize::from(row.is_some()),
            RowSet::List(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single row, or the first row of a list.
    pub fn into_one(self) -> Option<Record> {
        match self {
            RowSet::Single(row) => row,
            RowSet::List(rows) => rows.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<Record> {
        match self {
            RowSet::Single(row) => row.into_iter().collect(),
            RowSet::List(rows) => rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn set_replaces_in_place() {
        let mut r = Record::new().with("a", 1).with("b", 2);
        assert_eq!(r.set("a", 10), Some(Value::Int(1)));
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(r.get("a"), Some(&Value::Int(10)));
    }

    #[test]
    fn remove_keeps_order() {
        let mut r = Record::new().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(r.remove("b"), Some(Value::Int(2)));
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(r.remove("missing"), None);
    }

    #[test]
    fn from_json_preserves_key_order() {
        let r = Record::from_json(json!({"name": "X", "price": 12.5, "tags": ["a"]})).unwrap();
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["name", "price", "tags"]);
        assert_eq!(r.get("tags"), Some(&Value::from(vec!["a"])));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let err = Record::from_json(json!([1, 2])).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn same_columns_ignores_order() {
        let a = Record::new().with("x", 1).with("y", 2);
        let b = Record::new().with("y", 3).with("x", 4);
        let c = Record::new().with("x", 1).with("z", 2);
        assert!(a.same_columns(&b));
        assert!(!a.same_columns(&c));
    }

    #[derive(Debug, Deserialize, PartialEq, serde::Serialize)]
    struct Product {
        id: i64,
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn decode_into_struct() {
        let r = Record::new()
            .with("id", 4)
            .with("name", "Fender")
            .with("tags", vec!["1", "2"]);
        let p: Product = r.decode().unwrap();
        assert_eq!(
            p,
            Product {
                id: 4,
                name: "Fender".into(),
                tags: vec!["1".into(), "2".into()]
            }
        );
    }

    #[test]
    fn from_serialize_struct() {
        let p = Product {
            id: 1,
            name: "A".into(),
            tags: vec![],
        };
        let r = Record::from_serialize(&p).unwrap();
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["id", "name", "tags"]);
        assert_eq!(r.get("tags"), Some(&Value::Array(vec![])));
    }

    #[test]
    fn rowset_shaping() {
        let rows = vec![Record::new().with("id", 1), Record::new().with("id", 2)];
        let single = RowSet::shape(rows.clone(), Arity::Single);
        assert!(single.is_single());
        assert_eq!(single.len(), 1);
        assert_eq!(single.into_one().unwrap().get("id"), Some(&Value::Int(1)));

        let list = RowSet::shape(rows, Arity::List);
        assert_eq!(list.len(), 2);
        assert_eq!(list.into_vec().len(), 2);

        assert_eq!(RowSet::shape(vec![], Arity::Single), RowSet::Single(None));
    }
}
