//! Statement hooks and SQL logging.
//!
//! Every statement a [`Table`](crate::Table) dispatches passes through its
//! [`QueryHook`]. The default hook is [`TracingSqlHook`], which emits
//! `tracing` events under the `pgtable.sql` target.
//!
//! # Example
//!
//! ```rust,ignore
//! use pgtable::monitor::{QueryContext, QueryHook};
//!
//! struct PrintHook;
//!
//! impl QueryHook for PrintHook {
//!     fn before_query(&self, ctx: &QueryContext) {
//!         println!("{:?} {}", ctx.query_type, ctx.sql);
//!     }
//! }
//!
//! let products = db.table("products")?.with_sql_hook(PrintHook);
//! ```

mod tracing_hook;
mod types;


pub use tracing_hook::{SQL_TARGET, TracingSqlHook};
pub use types::{QueryContext, QueryHook, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
