//! The table facade.
//!
//! A [`Table`] pairs an immutable [`TableIdentity`] with a [`Connection`].
//! Every operation first builds a [`Statement`] synchronously (the
//! `prepare_*` methods), so malformed input is rejected before anything is
//! sent, then dispatches it and shapes the rows.
//!
//! # Example
//!
//! ```ignore
//! use pgtable::{Criteria, Record, Table, TableIdentity};
//!
//! let products = Table::new(TableIdentity::public("products")?, client);
//!
//! let one = products.find(4).await?.into_one();
//! let cheap = products.find(Criteria::eq("price <", 10)).await?.into_vec();
//! let n = products.count(()).await?;
//!
//! let saved = products
//!     .save(Record::new().with("id", 4).with("in_stock", false))
//!     .await?;
//! ```

use crate::args::{Conditions, Data, OperationKind, StatementRequest, Target};
use crate::builder::where_builder::compile_predicates;
use crate::builder::{
    CountBuilder, DeleteBuilder, Filter, InsertBuilder, QueryOptions, SearchArgs, SearchBuilder,
    SelectBuilder, SqlBuilder, Statement, UpdateBuilder, compile_assignments,
};
use crate::client::Connection;
use crate::criteria::Predicate;
use crate::error::{TableError, TableResult};
use crate::ident::TableIdentity;
use crate::monitor::{QueryContext, QueryHook, QueryResult, SQL_TARGET, TracingSqlHook};
use crate::record::{Arity, Record, RowSet};
use crate::value::Value;
use std::sync::Arc;
use std::time::Instant;

/// Access to one table through a connection.
///
/// Cloning is cheap when `C` is (e.g. `&Client`, `Arc<_>`, or a pool); the
/// identity is shared.
pub struct Table<C> {
    identity: Arc<TableIdentity>,
    conn: C,
    hook: Option<Arc<dyn QueryHook>>,
}

impl<C: Clone> Clone for Table<C> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            conn: self.conn.clone(),
            hook: self.hook.clone(),
        }
    }
}

impl<C> std::fmt::Debug for Table<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("identity", &self.identity)
            .field("sql_hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: Connection> Table<C> {
    /// A table that logs SQL through a default [`TracingSqlHook`].
    pub fn new(identity: TableIdentity, conn: C) -> Self {
        Self {
            identity: Arc::new(identity),
            conn,
            hook: Some(Arc::new(TracingSqlHook::default())),
        }
    }

    /// Replace the SQL hook.
    pub fn with_sql_hook(mut self, hook: impl QueryHook + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Disable the SQL hook.
    pub fn without_sql_hook(mut self) -> Self {
        self.hook = None;
        self
    }

    pub(crate) fn with_shared_hook(mut self, hook: Option<Arc<dyn QueryHook>>) -> Self {
        self.hook = hook;
        self
    }

    pub fn identity(&self) -> &TableIdentity {
        &self.identity
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    // ==================== Statement preparation ====================

    pub fn prepare_find(
        &self,
        conditions: impl Into<Conditions>,
        options: QueryOptions,
    ) -> TableResult<Statement> {
        let req = self.resolve(OperationKind::Find, conditions.into(), options)?;
        self.select_statement(req)
    }

    pub fn prepare_find_one(&self, conditions: impl Into<Conditions>) -> TableResult<Statement> {
        let req = self.resolve(OperationKind::FindOne, conditions.into(), QueryOptions::default())?;
        self.select_statement(req)
    }

    pub fn prepare_where(
        &self,
        fragment: &str,
        params: Vec<Value>,
        options: QueryOptions,
    ) -> TableResult<Statement> {
        let req = self.resolve(OperationKind::Where, Conditions::raw(fragment, params), options)?;
        self.select_statement(req)
    }

    pub fn prepare_count(&self, conditions: impl Into<Conditions>) -> TableResult<Statement> {
        let req = self.resolve(OperationKind::Count, conditions.into(), QueryOptions::default())?;
        Ok(CountBuilder::new(&self.identity, filter_for(req.target)).into_statement(Arity::Single))
    }

    pub fn prepare_insert(&self, data: impl Into<Data>) -> TableResult<Statement> {
        let (rows, arity) = data.into().resolve()?;
        Ok(InsertBuilder::new(&self.identity, &rows)?.into_statement(arity))
    }

    pub fn prepare_update(
        &self,
        fields: impl Into<Data>,
        criteria: impl Into<Conditions>,
    ) -> TableResult<Statement> {
        let fields = fields.into().resolve_fields()?;
        let req = self.resolve(OperationKind::Update, criteria.into(), QueryOptions::default())?;
        let Target::Predicates(predicates) = req.target else {
            return Err(TableError::argument("update does not accept a raw SQL fragment"));
        };
        self.update_statement(&fields, predicates, Arity::List)
    }

    /// Update by primary key when `data` carries it, insert otherwise.
    ///
    /// The key column may be named bare (`id`) or quoted (`"id"`). A null key
    /// is dropped and the row inserted.
    pub fn prepare_save(&self, data: impl Into<Data>) -> TableResult<Statement> {
        let mut fields = data.into().resolve_fields()?;
        let key_column = fields
            .columns()
            .find(|column| self.identity.is_primary_key(column))
            .map(str::to_string);

        match key_column.and_then(|column| fields.remove(&column)) {
            Some(key) if !key.is_null() => {
                let predicate = Predicate::eq(self.identity.primary_key().clone(), key);
                self.update_statement(&fields, vec![predicate], Arity::Single)
            }
            _ => Ok(InsertBuilder::new(&self.identity, &[fields])?.into_statement(Arity::Single)),
        }
    }

    pub fn prepare_destroy(&self, criteria: impl Into<Conditions>) -> TableResult<Statement> {
        let req = self.resolve(OperationKind::Destroy, criteria.into(), QueryOptions::default())?;
        let Target::Predicates(predicates) = req.target else {
            return Err(TableError::argument("destroy does not accept a raw SQL fragment"));
        };
        let condition = compile_predicates(predicates, 0);
        Ok(DeleteBuilder::new(&self.identity, condition).into_statement(Arity::List))
    }

    pub fn prepare_search(&self, args: &SearchArgs) -> TableResult<Statement> {
        Ok(SearchBuilder::new(&self.identity, args)?.into_statement(Arity::List))
    }

    fn resolve(
        &self,
        kind: OperationKind,
        conditions: Conditions,
        options: QueryOptions,
    ) -> TableResult<StatementRequest> {
        StatementRequest::resolve(kind, conditions, options, &self.identity)
    }

    fn select_statement(&self, req: StatementRequest) -> TableResult<Statement> {
        let arity = req.arity;
        let builder = SelectBuilder::new(&self.identity, filter_for(req.target), &req.options)?;
        Ok(builder.into_statement(arity))
    }

    fn update_statement(
        &self,
        fields: &Record,
        predicates: Vec<Predicate>,
        arity: Arity,
    ) -> TableResult<Statement> {
        let assignments = compile_assignments(fields, 0)?;
        let condition = compile_predicates(predicates, assignments.next_seed);
        Ok(UpdateBuilder::new(&self.identity, assignments, condition)?.into_statement(arity))
    }

    // ==================== Operations ====================

    /// A primary-key value yields [`RowSet::Single`]; criteria (or nothing)
    /// yield [`RowSet::List`], capped at the default limit.
    pub async fn find(&self, conditions: impl Into<Conditions>) -> TableResult<RowSet> {
        self.find_with(conditions, QueryOptions::default()).await
    }

    pub async fn find_with(
        &self,
        conditions: impl Into<Conditions>,
        options: QueryOptions,
    ) -> TableResult<RowSet> {
        let statement = self.prepare_find(conditions, options)?;
        self.dispatch(statement).await
    }

    /// First matching row, or `None`.
    pub async fn find_one(&self, conditions: impl Into<Conditions>) -> TableResult<Option<Record>> {
        let statement = self.prepare_find_one(conditions)?;
        Ok(self.dispatch(statement).await?.into_one())
    }

    /// Select with a hand-written WHERE body (`"price > $1"`).
    pub async fn where_raw(&self, fragment: &str, params: Vec<Value>) -> TableResult<Vec<Record>> {
        self.where_raw_with(fragment, params, QueryOptions::default())
            .await
    }

    pub async fn where_raw_with(
        &self,
        fragment: &str,
        params: Vec<Value>,
        options: QueryOptions,
    ) -> TableResult<Vec<Record>> {
        let statement = self.prepare_where(fragment, params, options)?;
        Ok(self.dispatch(statement).await?.into_vec())
    }

    pub async fn count(&self, conditions: impl Into<Conditions>) -> TableResult<i64> {
        let statement = self.prepare_count(conditions)?;
        let row = self.dispatch(statement).await?.into_one();
        match row.as_ref().and_then(|r| r.values().next()) {
            Some(Value::Int(n)) => Ok(*n),
            Some(other) => Err(TableError::decode(
                "count",
                format!("expected an integer, got {}", other.kind_name()),
            )),
            None => Err(TableError::decode("count", "no row returned")),
        }
    }

    /// Insert one row ([`RowSet::Single`]) or many ([`RowSet::List`], in input order).
    pub async fn insert(&self, data: impl Into<Data>) -> TableResult<RowSet> {
        let statement = self.prepare_insert(data)?;
        self.dispatch(statement).await
    }

    pub async fn insert_one(&self, row: Record) -> TableResult<Option<Record>> {
        Ok(self.insert(Data::One(row)).await?.into_one())
    }

    pub async fn insert_many(&self, rows: Vec<Record>) -> TableResult<Vec<Record>> {
        Ok(self.insert(Data::Many(rows)).await?.into_vec())
    }

    /// Set `fields` on every row matching `criteria`; returns the updated rows.
    pub async fn update(
        &self,
        fields: impl Into<Data>,
        criteria: impl Into<Conditions>,
    ) -> TableResult<Vec<Record>> {
        let statement = self.prepare_update(fields, criteria)?;
        Ok(self.dispatch(statement).await?.into_vec())
    }

    /// Returns the updated or inserted row; `None` when an update matched nothing.
    pub async fn save(&self, data: impl Into<Data>) -> TableResult<Option<Record>> {
        let statement = self.prepare_save(data)?;
        Ok(self.dispatch(statement).await?.into_one())
    }

    /// Delete matching rows and return them. Empty criteria delete every row.
    pub async fn destroy(&self, criteria: impl Into<Conditions>) -> TableResult<Vec<Record>> {
        let statement = self.prepare_destroy(criteria)?;
        Ok(self.dispatch(statement).await?.into_vec())
    }

    pub async fn search(&self, args: &SearchArgs) -> TableResult<Vec<Record>> {
        let statement = self.prepare_search(args)?;
        Ok(self.dispatch(statement).await?.into_vec())
    }

    /// Run a prepared statement through the hook and the connection.
    pub async fn dispatch(&self, statement: Statement) -> TableResult<RowSet> {
        let table = self.identity.display_name();
        let ctx = QueryContext::new(statement.sql(), statement.params().len()).with_table(&table);
        if let Some(hook) = &self.hook {
            hook.before_query(&ctx);
        }

        let start = Instant::now();
        let result = statement.fetch(&self.conn).await;

        if let Err(err) = &result {
            tracing::warn!(target: SQL_TARGET, table = %table, error = %err, "statement failed");
        }
        if let Some(hook) = &self.hook {
            let outcome = match &result {
                Ok(rows) => QueryResult::Rows(rows.len()),
                Err(err) => QueryResult::error(err.to_string()),
            };
            hook.after_query(&ctx, start.elapsed(), &outcome);
        }
        result
    }
}

fn filter_for(target: Target) -> Filter {
    match target {
        Target::Predicates(predicates) => Filter::Condition(compile_predicates(predicates, 0)),
        Target::Raw { fragment, params } => Filter::Raw { fragment, params },
    }
}
