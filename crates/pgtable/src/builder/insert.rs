use super::traits::SqlBuilder;
use crate::error::{TableError, TableResult};
use crate::ident::{Ident, TableIdentity};
use crate::record::Record;
use crate::value::Value;

/// Multi-row INSERT builder.
///
/// The first row's columns define the column list; every row must carry the
/// same set of columns (in any order). Placeholders are numbered row-major.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    /// Quoted table reference
    table: String,
    /// Quoted column names
    columns: Vec<String>,
    /// One `($n, ...)` group per row
    value_groups: Vec<String>,
    /// Params
    params: Vec<Value>,
}

impl InsertBuilder {
    pub fn new(table: &TableIdentity, rows: &[Record]) -> TableResult<Self> {
        let Some(first) = rows.first() else {
            return Err(TableError::argument(format!(
                "No rows given to insert into {}",
                table.display_name()
            )));
        };
        if first.is_empty() {
            return Err(TableError::argument("Row 0 has no columns to insert"));
        }

        let names: Vec<&str> = first.columns().collect();
        let columns = names
            .iter()
            .map(|name| Ident::parse(name).map(|ident| ident.to_sql()))
            .collect::<TableResult<Vec<_>>>()?;

        let mut params = Vec::with_capacity(rows.len() * names.len());
        let mut value_groups = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            if !row.same_columns(first) {
                return Err(TableError::argument(format!(
                    "Row {idx} has different columns than row 0; all rows must share the same keys"
                )));
            }
            let mut placeholders = Vec::with_capacity(names.len());
            for name in &names {
                let value = row.get(name).cloned().unwrap_or(Value::Null);
                params.push(value);
                placeholders.push(format!("${}", params.len()));
            }
            value_groups.push(format!("({})", placeholders.join(", ")));
        }

        Ok(Self {
            table: table.to_sql().to_string(),
            columns,
            value_groups,
            params,
        })
    }

    pub fn row_count(&self) -> usize {
        self.value_groups.len()
    }
}

impl SqlBuilder for InsertBuilder {
    fn build_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES {} RETURNING *",
            self.table,
            self.columns.join(", "),
            self.value_groups.join(", ")
        )
    }

    fn params(&self) -> &[Value] {
        &self.params
    }
}
