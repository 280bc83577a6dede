use super::Statement;
use crate::client::Connection;
use crate::error::TableResult;
use crate::record::{Arity, Record};
use crate::value::Value;

/// Base trait for SQL builders.
pub trait SqlBuilder: Sync {
    /// Build the SQL string.
    fn build_sql(&self) -> String;

    /// Positional parameters, in placeholder order.
    fn params(&self) -> &[Value];

    /// Debug helper.
    fn to_sql(&self) -> String {
        self.build_sql()
    }

    /// Freeze into an executable statement.
    fn into_statement(self, arity: Arity) -> Statement
    where
        Self: Sized,
    {
        Statement::new(self.build_sql(), self.params().to_vec(), arity)
    }

    /// Execute and return all rows.
    fn query(
        &self,
        conn: &impl Connection,
    ) -> impl std::future::Future<Output = TableResult<Vec<Record>>> + Send {
        async move {
            let sql = self.build_sql();
            conn.query(&sql, self.params()).await
        }
    }
}
