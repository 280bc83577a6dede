//! Defaults applied when a [`Database`](crate::Database) creates tables.

use crate::error::{TableError, TableResult};
use crate::ident::{DEFAULT_PRIMARY_KEY, DEFAULT_SCHEMA};
use crate::monitor::TracingSqlHook;
use tracing::Level;

/// Table defaults and SQL logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Schema for tables created without one.
    pub default_schema: String,
    /// Primary key column for tables created without one.
    pub default_primary_key: String,
    /// Emit SQL through a [`TracingSqlHook`].
    pub log_sql: bool,
    pub sql_log_level: Level,
    /// `None` disables truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            default_schema: DEFAULT_SCHEMA.to_string(),
            default_primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            log_sql: true,
            sql_log_level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl DatabaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    pub fn default_primary_key(mut self, column: impl Into<String>) -> Self {
        self.default_primary_key = column.into();
        self
    }

    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    pub fn sql_log_level(mut self, level: Level) -> Self {
        self.sql_log_level = level;
        self
    }

    pub fn max_sql_length(mut self, len: Option<usize>) -> Self {
        self.max_sql_length = len;
        self
    }

    /// Read overrides from `PGTABLE_SCHEMA`, `PGTABLE_PRIMARY_KEY` and
    /// `PGTABLE_LOG_SQL` (`true`/`false`/`1`/`0`).
    pub fn from_env() -> TableResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> TableResult<Self> {
        let mut config = Self::default();
        if let Some(schema) = lookup("PGTABLE_SCHEMA").filter(|s| !s.trim().is_empty()) {
            config.default_schema = schema.trim().to_string();
        }
        if let Some(pk) = lookup("PGTABLE_PRIMARY_KEY").filter(|s| !s.trim().is_empty()) {
            config.default_primary_key = pk.trim().to_string();
        }
        if let Some(flag) = lookup("PGTABLE_LOG_SQL") {
            config.log_sql = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(TableError::argument(format!(
                        "PGTABLE_LOG_SQL must be a boolean, got '{other}'"
                    )));
                }
            };
        }
        Ok(config)
    }

    /// The SQL hook these settings describe, if logging is enabled.
    pub fn sql_hook(&self) -> Option<TracingSqlHook> {
        if !self.log_sql {
            return None;
        }
        let hook = TracingSqlHook::new().level(self.sql_log_level);
        Some(match self.max_sql_length {
            Some(len) => hook.max_sql_length(len),
            None => hook.no_truncate(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.default_schema, "public");
        assert_eq!(config.default_primary_key, "id");
        assert!(config.log_sql);
        assert_eq!(config.sql_hook().unwrap().max_sql_length, Some(200));
    }

    #[test]
    fn builder_methods() {
        let config = DatabaseConfig::new()
            .default_schema("sales")
            .default_primary_key("uid")
            .sql_log_level(Level::INFO)
            .max_sql_length(None);
        assert_eq!(config.default_schema, "sales");
        assert_eq!(config.default_primary_key, "uid");
        let hook = config.sql_hook().unwrap();
        assert_eq!(hook.level, Level::INFO);
        assert_eq!(hook.max_sql_length, None);
        assert!(config.log_sql(false).sql_hook().is_none());
    }

    #[test]
    fn reads_environment_overrides() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("PGTABLE_SCHEMA", "inventory"),
            ("PGTABLE_PRIMARY_KEY", " sku "),
            ("PGTABLE_LOG_SQL", "off"),
        ]))
        .unwrap();
        assert_eq!(config.default_schema, "inventory");
        assert_eq!(config.default_primary_key, "sku");
        assert!(!config.log_sql);
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = DatabaseConfig::from_lookup(lookup(&[("PGTABLE_SCHEMA", "  ")])).unwrap();
        assert_eq!(config.default_schema, "public");
    }

    #[test]
    fn rejects_bad_log_flag() {
        let err = DatabaseConfig::from_lookup(lookup(&[("PGTABLE_LOG_SQL", "maybe")])).unwrap_err();
        assert!(err.is_argument());
    }
}
