//! Connection boundary: the one operation the table layer needs from a driver.

use crate::error::TableResult;
use crate::record::Record;
use crate::value::Value;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients, transactions, and pools.
///
/// Implementations run one parameterized statement and return every row it
/// produced, decoded into [`Record`]s. Reducing the rows to a single result
/// is the caller's concern.
pub trait Connection: Send + Sync {
    /// Execute `sql` with positional parameters `$1..$n` bound from `params`.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = TableResult<Vec<Record>>> + Send;
}

/// Borrow `params` in the shape tokio-postgres expects.
pub(crate) fn as_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn decode_rows(rows: Vec<Row>) -> TableResult<Vec<Record>> {
    rows.iter().map(Record::from_row).collect()
}

impl Connection for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[Value]) -> TableResult<Vec<Record>> {
        let rows = tokio_postgres::Client::query(self, sql, &as_refs(params)).await?;
        decode_rows(rows)
    }
}

impl Connection for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[Value]) -> TableResult<Vec<Record>> {
        let rows = tokio_postgres::Transaction::query(self, sql, &as_refs(params)).await?;
        decode_rows(rows)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[Value]) -> TableResult<Vec<Record>> {
        // Delegate to the deref target (tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        Connection::query(client, sql, params).await
    }
}

#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[Value]) -> TableResult<Vec<Record>> {
        let tx: &tokio_postgres::Transaction<'_> = self;
        Connection::query(tx, sql, params).await
    }
}

/// Each call checks out a connection for the duration of one statement.
#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Pool {
    async fn query(&self, sql: &str, params: &[Value]) -> TableResult<Vec<Record>> {
        let client = self.get().await?;
        Connection::query(&client, sql, params).await
    }
}

// ===== Shared handles =====

impl<C: Connection> Connection for &C {
    async fn query(&self, sql: &str, params: &[Value]) -> TableResult<Vec<Record>> {
        (*self).query(sql, params).await
    }
}

impl<C: Connection> Connection for Arc<C> {
    async fn query(&self, sql: &str, params: &[Value]) -> TableResult<Vec<Record>> {
        self.as_ref().query(sql, params).await
    }
}
