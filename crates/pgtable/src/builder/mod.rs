//! Structured SQL builders.
//!
//! Every builder produces SQL text plus an ordered parameter list. Values are
//! always bound as `$n` placeholders and identifiers are always quoted.
//!
//! ## Design
//!
//! - The placeholder counter is an explicit `seed` threaded from one compiler
//!   to the next (`UPDATE ... SET` numbers `$1..$k`, its WHERE starts at `$k+1`).
//! - Malformed input fails while building, never at dispatch.

pub mod delete;
pub mod insert;
pub mod search;
pub mod select;
pub mod traits;
pub mod update;
pub mod where_builder;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use search::{SearchArgs, SearchBuilder};
pub use select::{
    CountBuilder, DEFAULT_LIMIT, DEFAULT_OFFSET, Direction, Filter, Order, QueryOptions,
    SelectBuilder,
};
pub use traits::SqlBuilder;
pub use update::{Assignments, UpdateBuilder, compile_assignments};
pub use where_builder::{CompiledCondition, WhereBuilder, compile};

use crate::client::Connection;
use crate::error::TableResult;
use crate::record::{Arity, RowSet};
use crate::value::Value;

/// A fully built statement: SQL text, its parameters, and the result arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
    arity: Arity,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>, arity: Arity) -> Self {
        Self {
            sql: sql.into(),
            params,
            arity,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn into_parts(self) -> (String, Vec<Value>, Arity) {
        (self.sql, self.params, self.arity)
    }

    /// Execute on `conn` and shape the rows by arity.
    pub async fn fetch<C: Connection>(&self, conn: &C) -> TableResult<RowSet> {
        let rows = conn.query(&self.sql, &self.params).await?;
        Ok(RowSet::shape(rows, self.arity))
    }
}
