use super::traits::SqlBuilder;
use super::where_builder::CompiledCondition;
use crate::error::{TableError, TableResult};
use crate::ident::{Ident, TableIdentity};
use crate::value::Value;

/// Row limit applied when none is given.
pub const DEFAULT_LIMIT: u64 = 1000;

/// Row offset applied when none is given.
pub const DEFAULT_OFFSET: u64 = 0;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }

    /// Parse `"column"`, `"column asc"` or `"column desc"`.
    pub fn parse(spec: &str) -> TableResult<Self> {
        let (column, rest) = Ident::parse_prefix(spec)?;
        let direction = match rest.trim().to_ascii_uppercase().as_str() {
            "" | "ASC" => Direction::Asc,
            "DESC" => Direction::Desc,
            other => {
                return Err(TableError::compilation(format!(
                    "Unsupported sort direction '{other}' for column '{column}'"
                )));
            }
        };
        Ok(Self {
            column: column.as_str().to_string(),
            direction,
        })
    }

    fn render(&self) -> TableResult<String> {
        let column = Ident::parse(&self.column)?;
        Ok(format!("{} {}", column.to_sql(), self.direction.as_sql()))
    }
}

/// Projection, ordering, and paging for read statements.
///
/// Missing pieces fall back to: all columns, primary key ascending,
/// [`DEFAULT_LIMIT`], [`DEFAULT_OFFSET`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub columns: Option<Vec<String>>,
    pub order: Vec<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the projection. `["*"]` selects every column.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    /// Append an order given as `"column [asc|desc]"`.
    pub fn order_by(self, spec: &str) -> TableResult<Self> {
        Ok(self.order(Order::parse(spec)?))
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn render_columns(&self) -> TableResult<String> {
        match &self.columns {
            None => Ok("*".to_string()),
            Some(cols) if cols.is_empty() || (cols.len() == 1 && cols[0] == "*") => {
                Ok("*".to_string())
            }
            Some(cols) => {
                let rendered = cols
                    .iter()
                    .map(|c| Ident::parse(c).map(|ident| ident.to_sql()))
                    .collect::<TableResult<Vec<_>>>()?;
                Ok(rendered.join(", "))
            }
        }
    }

    fn render_order(&self, table: &TableIdentity) -> TableResult<String> {
        if self.order.is_empty() {
            return Ok(format!("{} ASC", table.primary_key().to_sql()));
        }
        let rendered = self
            .order
            .iter()
            .map(Order::render)
            .collect::<TableResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }
}

/// Row restriction of a read statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Compiled criteria.
    Condition(CompiledCondition),
    /// Caller-written WHERE body; the caller numbers its own placeholders.
    Raw { fragment: String, params: Vec<Value> },
}

impl Filter {
    pub fn raw(fragment: impl Into<String>, params: Vec<Value>) -> Self {
        Filter::Raw {
            fragment: fragment.into(),
            params,
        }
    }

    fn into_parts(self) -> (String, Vec<Value>) {
        match self {
            Filter::Condition(cond) => cond.into_parts(),
            Filter::Raw { fragment, params } => {
                let fragment = fragment.trim();
                if fragment.is_empty() {
                    (String::new(), params)
                } else {
                    (format!(" WHERE {fragment}"), params)
                }
            }
        }
    }
}

impl From<CompiledCondition> for Filter {
    fn from(cond: CompiledCondition) -> Self {
        Filter::Condition(cond)
    }
}

/// SELECT statement builder.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    /// Quoted table reference
    table: String,
    /// Rendered projection
    columns: String,
    /// Empty or ` WHERE ...`
    where_clause: String,
    /// Rendered ORDER BY list
    order: String,
    limit: u64,
    offset: u64,
    params: Vec<Value>,
}

impl SelectBuilder {
    pub fn new(
        table: &TableIdentity,
        filter: impl Into<Filter>,
        options: &QueryOptions,
    ) -> TableResult<Self> {
        let (where_clause, params) = filter.into().into_parts();
        Ok(Self {
            table: table.to_sql().to_string(),
            columns: options.render_columns()?,
            where_clause,
            order: options.render_order(table)?,
            limit: options.limit.unwrap_or(DEFAULT_LIMIT),
            offset: options.offset.unwrap_or(DEFAULT_OFFSET),
            params,
        })
    }
}

impl SqlBuilder for SelectBuilder {
    fn build_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns, self.table);
        sql.push_str(&self.where_clause);
        sql.push_str(" ORDER BY ");
        sql.push_str(&self.order);
        sql.push_str(&format!(" LIMIT {}", self.limit));
        sql.push_str(&format!(" OFFSET {}", self.offset));
        sql
    }

    fn params(&self) -> &[Value] {
        &self.params
    }
}

/// `SELECT COUNT(1)` builder. Projection, ordering, and paging do not apply.
#[derive(Debug, Clone)]
pub struct CountBuilder {
    table: String,
    where_clause: String,
    params: Vec<Value>,
}

impl CountBuilder {
    pub fn new(table: &TableIdentity, filter: impl Into<Filter>) -> Self {
        let (where_clause, params) = filter.into().into_parts();
        Self {
            table: table.to_sql().to_string(),
            where_clause,
            params,
        }
    }
}

impl SqlBuilder for CountBuilder {
    fn build_sql(&self) -> String {
        format!("SELECT COUNT(1) FROM {}{}", self.table, self.where_clause)
    }

    fn params(&self) -> &[Value] {
        &self.params
    }
}
