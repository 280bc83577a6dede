use super::truncate_sql_bytes;
use super::types::{QueryContext, QueryHook, QueryResult};
use std::time::Duration;
use tracing::Level;

/// Target of every SQL event.
pub const SQL_TARGET: &str = "pgtable.sql";

/// A `tracing`-based hook that emits each statement before it is dispatched
/// and its row count afterwards.
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl TracingSqlHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext) {
        let sql = self.truncate_sql(&ctx.sql);
        let table = ctx.table.as_deref().unwrap_or("-");
        emit_at_level!(
            self.level,
            target: SQL_TARGET,
            query_type = ?ctx.query_type,
            table,
            param_count = ctx.param_count,
            sql = %sql,
        );
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let table = ctx.table.as_deref().unwrap_or("-");
        let elapsed_ms = duration.as_secs_f64() * 1000.0;
        match result {
            QueryResult::Rows(rows) => emit_at_level!(
                self.level,
                target: SQL_TARGET,
                query_type = ?ctx.query_type,
                table,
                rows = *rows,
                elapsed_ms,
                "statement completed"
            ),
            // Failures are logged at WARN by the dispatching table.
            QueryResult::Error(_) => {}
        }
    }
}
