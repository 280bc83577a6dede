use super::traits::SqlBuilder;
use crate::error::{TableError, TableResult};
use crate::ident::{Ident, TableIdentity};
use crate::value::Value;

/// Full-text search request: the columns to match and the `tsquery` term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchArgs {
    pub columns: Vec<String>,
    pub term: String,
}

impl SearchArgs {
    pub fn new<I, S>(columns: I, term: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            term: term.into(),
        }
    }
}

/// `SELECT * ... WHERE to_tsvector(<expr>) @@ to_tsquery($n)` builder.
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    table: String,
    document: String,
    params: Vec<Value>,
}

impl SearchBuilder {
    pub fn new(table: &TableIdentity, args: &SearchArgs) -> TableResult<Self> {
        if args.columns.is_empty() {
            return Err(TableError::argument("Search requires at least one column"));
        }
        let exprs = args
            .columns
            .iter()
            .map(|c| Ident::parse(c).map(|ident| ident.to_sql()))
            .collect::<TableResult<Vec<_>>>()?;
        Self::from_parts(table, exprs, Vec::new(), &args.term)
    }

    /// Build from pre-rendered column expressions whose own placeholders
    /// (`$1..$k`) are bound by `expr_params`. The term takes `$k+1`.
    pub(crate) fn from_parts(
        table: &TableIdentity,
        exprs: Vec<String>,
        mut expr_params: Vec<Value>,
        term: &str,
    ) -> TableResult<Self> {
        if exprs.is_empty() {
            return Err(TableError::argument("Search requires at least one column"));
        }
        if term.trim().is_empty() {
            return Err(TableError::argument("Search term cannot be empty"));
        }
        let document = match exprs.as_slice() {
            [single] => single.clone(),
            many => format!("concat({})", many.join(", ' ', ")),
        };
        expr_params.push(Value::from(term));
        Ok(Self {
            table: table.to_sql().to_string(),
            document,
            params: expr_params,
        })
    }
}

impl SqlBuilder for SearchBuilder {
    fn build_sql(&self) -> String {
        format!(
            "SELECT * FROM {} WHERE to_tsvector({}) @@ to_tsquery(${})",
            self.table,
            self.document,
            self.params.len()
        )
    }

    fn params(&self) -> &[Value] {
        &self.params
    }
}
