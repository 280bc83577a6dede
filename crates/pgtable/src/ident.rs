//! Safe SQL identifier handling.
//!
//! [`Ident`] stores a single, *unquoted* identifier and always renders it as a
//! quoted identifier, escaping `"` as `""`. Input that is already delimited
//! (`"CamelCase"`) is unwrapped when parsed, so quoting is applied exactly once.
//!
//! [`TableIdentity`] is the immutable `{schema, name, primary_key}` triple a
//! [`Table`](crate::Table) is built around.
//!
//! # Example
//! ```ignore
//! use pgtable::TableIdentity;
//!
//! let t = TableIdentity::new("sales", "Orders", "id")?;
//! assert_eq!(t.to_sql(), r#""sales"."Orders""#);
//! assert_eq!(t.display_name(), "sales.Orders");
//! # Ok::<(), pgtable::TableError>(())
//! ```

use crate::error::{TableError, TableResult};
use std::fmt;

/// Schema that is left out of display names.
pub const DEFAULT_SCHEMA: &str = "public";

/// Primary key column used when none is given.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// A single SQL identifier (schema, table, or column name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    /// Create an identifier from a raw (unquoted) name.
    pub fn new(name: impl Into<String>) -> TableResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TableError::compilation("Identifier cannot be empty"));
        }
        if name.contains('\0') {
            return Err(TableError::compilation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self(name))
    }

    /// Identifier from a known-valid constant.
    pub(crate) fn from_static(name: &'static str) -> Self {
        Self(name.to_string())
    }

    /// Parse an identifier that may already be delimited.
    ///
    /// - `users` → `users`
    /// - `"CamelCase"` → `CamelCase`
    /// - `"has""quote"` → `has"quote`
    pub fn parse(s: &str) -> TableResult<Self> {
        let s = s.trim();
        if s.starts_with('"') {
            let (ident, rest) = Self::parse_prefix(s)?;
            if !rest.is_empty() {
                return Err(TableError::compilation(format!(
                    "Unexpected trailing characters after quoted identifier: '{rest}'"
                )));
            }
            return Ok(ident);
        }
        Self::new(s)
    }

    /// Split a leading identifier off `s`, returning it with the unparsed remainder.
    ///
    /// A quoted prefix runs to its closing quote. An unquoted prefix runs until
    /// whitespace or the first comparison character (`!`, `<`, `>`, `=`).
    pub fn parse_prefix(s: &str) -> TableResult<(Self, &str)> {
        let s = s.trim_start();
        let mut chars = s.char_indices().peekable();

        if s.starts_with('"') {
            chars.next(); // opening quote
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some((i, '"')) => {
                        // Escaped quote: ""
                        if matches!(chars.peek(), Some((_, '"'))) {
                            chars.next();
                            name.push('"');
                        } else {
                            let ident = Self::new(name)?;
                            return Ok((ident, &s[i + 1..]));
                        }
                    }
                    Some((_, c)) => name.push(c),
                    None => {
                        return Err(TableError::compilation(format!(
                            "Unclosed quoted identifier in '{s}'"
                        )));
                    }
                }
            }
        }

        let end = s
            .find(|c: char| c.is_whitespace() || matches!(c, '!' | '<' | '>' | '='))
            .unwrap_or(s.len());
        let ident = Self::new(&s[..end])?;
        Ok((ident, &s[end..]))
    }

    /// The raw, unquoted name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the identifier as quoted SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push('"');
        for ch in self.0.chars() {
            if ch == '"' {
                out.push_str("\"\"");
            } else {
                out.push(ch);
            }
        }
        out.push('"');
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable identity of a table: schema, name, and primary key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentity {
    schema: Ident,
    name: Ident,
    primary_key: Ident,
    quoted: String,
}

impl TableIdentity {
    /// Create a table identity. Each part may be given bare or already quoted.
    pub fn new(schema: &str, name: &str, primary_key: &str) -> TableResult<Self> {
        let schema = Ident::parse(schema).map_err(as_argument)?;
        let name = Ident::parse(name).map_err(as_argument)?;
        let primary_key = Ident::parse(primary_key).map_err(as_argument)?;

        let mut quoted = String::new();
        if schema.as_str() != DEFAULT_SCHEMA {
            schema.write_sql(&mut quoted);
            quoted.push('.');
        }
        name.write_sql(&mut quoted);

        Ok(Self {
            schema,
            name,
            primary_key,
            quoted,
        })
    }

    /// A table in the `public` schema keyed by `id`.
    pub fn public(name: &str) -> TableResult<Self> {
        Self::new(DEFAULT_SCHEMA, name, DEFAULT_PRIMARY_KEY)
    }

    pub fn schema(&self) -> &str {
        self.schema.as_str()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn primary_key(&self) -> &Ident {
        &self.primary_key
    }

    /// `schema.name`, or just `name` for the default schema.
    pub fn display_name(&self) -> String {
        if self.schema.as_str() == DEFAULT_SCHEMA {
            self.name.to_string()
        } else {
            format!("{}.{}", self.schema, self.name)
        }
    }

    /// Quoted, schema-qualified (when not `public`) table reference.
    pub fn to_sql(&self) -> &str {
        &self.quoted
    }

    /// Whether `column` names the primary key, bare or quoted.
    pub fn is_primary_key(&self, column: &str) -> bool {
        column == self.primary_key.as_str() || column == self.primary_key.to_sql()
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

fn as_argument(err: TableError) -> TableError {
    match err {
        TableError::Compilation(msg) => TableError::Argument(msg),
        other => other,
    }
}
