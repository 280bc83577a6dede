//! A connection plus the defaults used to open tables on it.

use crate::client::Connection;
use crate::config::DatabaseConfig;
use crate::error::TableResult;
use crate::ident::TableIdentity;
use crate::monitor::{QueryContext, QueryHook, QueryResult, SQL_TARGET};
use crate::record::Record;
use crate::table::Table;
use crate::value::Value;
use std::sync::Arc;
use std::time::Instant;

/// Shared database handle.
///
/// Tables opened from one `Database` share its connection.
///
/// # Example
///
/// ```ignore
/// let db = pgtable::Database::new(pgtable::create_pool(&url)?);
/// let products = db.table("products")?;
/// let rows = db.run("SELECT now() AS ts", vec![]).await?;
/// ```
pub struct Database<C> {
    conn: Arc<C>,
    config: DatabaseConfig,
    hook: Option<Arc<dyn QueryHook>>,
}

impl<C> Clone for Database<C> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            config: self.config.clone(),
            hook: self.hook.clone(),
        }
    }
}

impl<C: Connection> Database<C> {
    pub fn new(conn: C) -> Self {
        Self::with_config(conn, DatabaseConfig::default())
    }

    pub fn with_config(conn: C, config: DatabaseConfig) -> Self {
        let hook = config
            .sql_hook()
            .map(|hook| Arc::new(hook) as Arc<dyn QueryHook>);
        Self {
            conn: Arc::new(conn),
            config,
            hook,
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// A table in the default schema, keyed by the default primary key.
    pub fn table(&self, name: &str) -> TableResult<Table<Arc<C>>> {
        self.table_in(&self.config.default_schema, name, &self.config.default_primary_key)
    }

    /// A table in the default schema with its own primary key column.
    pub fn table_with_key(&self, name: &str, primary_key: &str) -> TableResult<Table<Arc<C>>> {
        self.table_in(&self.config.default_schema, name, primary_key)
    }

    pub fn table_in(
        &self,
        schema: &str,
        name: &str,
        primary_key: &str,
    ) -> TableResult<Table<Arc<C>>> {
        let identity = TableIdentity::new(schema, name, primary_key)?;
        Ok(Table::new(identity, Arc::clone(&self.conn)).with_shared_hook(self.hook.clone()))
    }

    /// Run arbitrary SQL with positional parameters.
    pub async fn run(&self, sql: &str, params: Vec<Value>) -> TableResult<Vec<Record>> {
        let ctx = QueryContext::new(sql, params.len());
        if let Some(hook) = &self.hook {
            hook.before_query(&ctx);
        }
        let start = Instant::now();
        let result = self.conn.query(sql, &params).await;
        if let Err(err) = &result {
            tracing::warn!(target: SQL_TARGET, error = %err, "statement failed");
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
