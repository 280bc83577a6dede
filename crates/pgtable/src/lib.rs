//! # pgtable
//!
//! A lightweight PostgreSQL table access layer.
//!
//! Given a table name, schema, and primary key, pgtable builds parameterized
//! SQL from loosely shaped criteria and runs it through any [`Connection`]:
//! a `tokio_postgres::Client`, a `Transaction`, or a `deadpool_postgres` pool.
//!
//! ## Features
//!
//! - **Criteria, not strings**: `{"price >": 10, "id": [1, 2]}` compiles to
//!   `"price" > $1 AND "id" IN ($2, $3)`; values are always bound, never inlined
//! - **Primary-key shortcuts**: `find(4)` and `find(uuid)` return a single row
//! - **Multi-row insert**, `save` (update-or-insert by key), full-text `search`
//! - **Transaction-friendly**: pass a transaction anywhere a `Connection` is expected
//! - **SQL logging** through `tracing` (target `pgtable.sql`)
//!
//! ## Example
//!
//! ```ignore
//! use pgtable::{Criteria, Database, Record};
//! use serde_json::json;
//!
//! let db = Database::new(pgtable::create_pool(&database_url)?);
//! let products = db.table("products")?;
//!
//! let fender = products.find(4).await?.into_one();
//! let in_stock = products.find(json!({"in_stock": true, "price <": 500})).await?;
//! let n = products.count(Criteria::eq("in_stock", true)).await?;
//!
//! products
//!     .insert(Record::new().with("name", "Gibson").with("price", 1299))
//!     .await?;
//! products
//!     .update(json!({"in_stock": false}), json!({"id": [1, 2]}))
//!     .await?;
//! products.destroy(json!({"id !=": [4]})).await?;
//! ```

pub mod args;
pub mod builder;
pub mod client;
pub mod config;
pub mod criteria;
pub mod database;
pub mod document;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod record;
pub mod table;
pub mod value;

pub use args::{Conditions, Data, OperationKind, StatementRequest, Target};
pub use builder::{
    CompiledCondition, Direction, Order, QueryOptions, SearchArgs, SqlBuilder, Statement, compile,
};
pub use client::Connection;
pub use config::DatabaseConfig;
pub use criteria::{Criteria, Op, Predicate, Test};
pub use database::Database;
pub use document::{DEFAULT_DOCUMENT_COLUMN, DocumentTable};
pub use error::{TableError, TableResult};
pub use ident::{Ident, TableIdentity};
pub use monitor::{QueryContext, QueryHook, QueryResult, QueryType, TracingSqlHook};
pub use record::{Arity, Record, RowSet};
pub use table::Table;
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
