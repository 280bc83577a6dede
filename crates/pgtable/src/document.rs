//! Document operations over a JSONB column.
//!
//! [`DocumentTable`] wraps a [`Table`] and adds `find_doc`, `save_doc`, and
//! `search_doc`. The wrapped table's own operations stay reachable through
//! [`DocumentTable::table`] and behave exactly as before.

use crate::builder::{Filter, QueryOptions, SearchBuilder, SelectBuilder, SqlBuilder, Statement};
use crate::client::Connection;
use crate::error::{TableError, TableResult};
use crate::ident::Ident;
use crate::record::{Arity, Record, RowSet, json_kind};
use crate::table::Table;
use crate::value::Value;

/// Column holding the document when none is given.
pub const DEFAULT_DOCUMENT_COLUMN: &str = "body";

/// A table whose rows carry a JSONB document column.
#[derive(Debug)]
pub struct DocumentTable<C> {
    table: Table<C>,
    column: Ident,
}

impl<C: Connection> Table<C> {
    /// Treat this table as a document table over the `body` column.
    pub fn documents(self) -> DocumentTable<C> {
        DocumentTable {
            table: self,
            column: Ident::from_static(DEFAULT_DOCUMENT_COLUMN),
        }
    }

    /// Treat this table as a document table over `column`.
    pub fn documents_in(self, column: &str) -> TableResult<DocumentTable<C>> {
        Ok(DocumentTable {
            table: self,
            column: Ident::parse(column)?,
        })
    }
}

impl<C: Connection> DocumentTable<C> {
    pub fn table(&self) -> &Table<C> {
        &self.table
    }

    pub fn into_inner(self) -> Table<C> {
        self.table
    }

    pub fn column(&self) -> &str {
        self.column.as_str()
    }

    /// A primary key looks the row up directly; an object matches documents
    /// containing it (`"body" @> $1`).
    pub fn prepare_find_doc(&self, criteria: serde_json::Value) -> TableResult<Statement> {
        match criteria {
            serde_json::Value::Object(_) => {
                let filter = Filter::raw(
                    format!("{} @> $1", self.column.to_sql()),
                    vec![Value::Json(criteria)],
                );
                let builder = SelectBuilder::new(self.table.identity(), filter, &QueryOptions::default())?;
                Ok(builder.into_statement(Arity::List))
            }
            serde_json::Value::Number(_) | serde_json::Value::String(_) => {
                self.table.prepare_find(criteria, QueryOptions::default())
            }
            other => Err(TableError::argument(format!(
                "Document criteria must be a key or an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub async fn find_doc(&self, criteria: serde_json::Value) -> TableResult<RowSet> {
        let statement = self.prepare_find_doc(criteria)?;
        self.table.dispatch(statement).await
    }

    /// Insert `doc`, or replace the stored document when `doc` carries the
    /// primary key. The key itself is not stored inside the document.
    pub fn prepare_save_doc(&self, doc: serde_json::Value) -> TableResult<Statement> {
        let mut body = match doc {
            serde_json::Value::Object(body) => body,
            other => {
                return Err(TableError::argument(format!(
                    "A document must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };
        let pk = self.table.identity().primary_key().as_str().to_string();
        let key = body.shift_remove(&pk).map(Value::from);

        let mut row = Record::new();
        if let Some(key) = key {
            row.set(pk, key);
        }
        row.set(self.column.as_str(), Value::Json(serde_json::Value::Object(body)));
        self.table.prepare_save(row)
    }

    pub async fn save_doc(&self, doc: serde_json::Value) -> TableResult<Option<Record>> {
        let statement = self.prepare_save_doc(doc)?;
        Ok(self.table.dispatch(statement).await?.into_one())
    }

    /// Full-text search over the text of the given document keys.
    pub fn prepare_search_doc(&self, keys: &[&str], term: &str) -> TableResult<Statement> {
        let exprs = (1..=keys.len())
            .map(|n| format!("({} ->> ${n}::text)", self.column.to_sql()))
            .collect();
        let params = keys.iter().map(|k| Value::from(*k)).collect();
        let builder = SearchBuilder::from_parts(self.table.identity(), exprs, params, term)?;
        Ok(builder.into_statement(Arity::List))
    }

    pub async fn search_doc(&self, keys: &[&str], term: &str) -> TableResult<Vec<Record>> {
        let statement = self.prepare_search_doc(keys, term)?;
        Ok(self.table.dispatch(statement).await?.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::TableIdentity;
    use serde_json::json;

    struct NoConnection;

    impl Connection for NoConnection {
        async fn query(&self, _sql: &str, _params: &[Value]) -> TableResult<Vec<Record>> {
            Ok(Vec::new())
        }
    }

    fn docs() -> DocumentTable<NoConnection> {
        Table::new(TableIdentity::public("docs").unwrap(), NoConnection)
            .without_sql_hook()
            .documents()
    }

    #[test]
    fn find_doc_by_containment() {
        let stmt = docs().prepare_find_doc(json!({"title": "A"})).unwrap();
        assert_eq!(
            stmt.sql(),
            r#"SELECT * FROM "docs" WHERE "body" @> $1 ORDER BY "id" ASC LIMIT 1000 OFFSET 0"#
        );
        assert_eq!(stmt.params(), &[Value::Json(json!({"title": "A"}))]);
    }

    #[test]
    fn find_doc_by_key_is_single() {
        let stmt = docs().prepare_find_doc(json!(3)).unwrap();
        assert_eq!(stmt.arity(), Arity::Single);
        assert!(stmt.sql().contains(r#"WHERE "id" = $1"#));
        assert!(docs().prepare_find_doc(json!([1])).unwrap_err().is_argument());
    }

    #[test]
    fn save_doc_inserts_without_key() {
        let stmt = docs().prepare_save_doc(json!({"title": "A"})).unwrap();
        assert_eq!(
            stmt.sql(),
            r#"INSERT INTO "docs" ("body") VALUES ($1) RETURNING *"#
        );
        assert_eq!(stmt.params(), &[Value::Json(json!({"title": "A"}))]);
    }

    #[test]
    fn save_doc_updates_with_key() {
        let stmt = docs().prepare_save_doc(json!({"id": 7, "title": "B"})).unwrap();
        assert_eq!(
            stmt.sql(),
            r#"UPDATE "docs" SET "body" = $1 WHERE "id" = $2 RETURNING *"#
        );
        assert_eq!(
            stmt.params(),
            &[Value::Json(json!({"title": "B"})), Value::Int(7)]
        );
        assert!(docs().prepare_save_doc(json!("x")).unwrap_err().is_argument());
    }

    #[test]
    fn search_doc_over_keys() {
        let stmt = docs().prepare_search_doc(&["title", "summary"], "rust").unwrap();
        assert_eq!(
            stmt.sql(),
            r#"SELECT * FROM "docs" WHERE to_tsvector(concat(("body" ->> $1::text), ' ', ("body" ->> $2::text))) @@ to_tsquery($3)"#
        );
        assert_eq!(
            stmt.params(),
            &[Value::from("title"), Value::from("summary"), Value::from("rust")]
        );
        assert!(docs().prepare_search_doc(&[], "rust").unwrap_err().is_argument());
    }

    #[test]
    fn custom_document_column() {
        let table = Table::new(TableIdentity::public("docs").unwrap(), NoConnection)
            .documents_in("payload")
            .unwrap();
        assert_eq!(table.column(), "payload");
        let stmt = table.prepare_find_doc(json!({"a": 1})).unwrap();
        assert!(stmt.sql().contains(r#""payload" @> $1"#));
    }
}
