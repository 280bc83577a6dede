use super::traits::SqlBuilder;
use super::where_builder::CompiledCondition;
use crate::error::{TableError, TableResult};
use crate::ident::{Ident, TableIdentity};
use crate::record::Record;
use crate::value::Value;

/// Compiled `SET` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignments {
    /// `"a" = $1, "b" = $2`
    pub text: String,
    pub params: Vec<Value>,
    /// Last placeholder used; a following WHERE starts after it.
    pub next_seed: usize,
}

/// Compile `fields` into `"col" = $n` assignments starting at `seed + 1`.
pub fn compile_assignments(fields: &Record, seed: usize) -> TableResult<Assignments> {
    if fields.is_empty() {
        return Err(TableError::argument("Update requires at least one field to set"));
    }
    let mut parts = Vec::with_capacity(fields.len());
    let mut params = Vec::with_capacity(fields.len());
    for (column, value) in fields.iter() {
        let column = Ident::parse(column)?;
        params.push(value.clone());
        parts.push(format!("{} = ${}", column.to_sql(), seed + params.len()));
    }
    Ok(Assignments {
        text: parts.join(", "),
        next_seed: seed + params.len(),
        params,
    })
}

/// UPDATE builder.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    set_clause: String,
    where_clause: String,
    /// SET params followed by WHERE params
    params: Vec<Value>,
}

impl UpdateBuilder {
    /// `condition` must have been compiled with `assignments.next_seed` as its seed.
    pub fn new(
        table: &TableIdentity,
        assignments: Assignments,
        condition: CompiledCondition,
    ) -> TableResult<Self> {
        if condition.seed() != assignments.next_seed {
            return Err(TableError::compilation(format!(
                "WHERE numbering starts after ${}, expected after ${}",
                condition.seed(),
                assignments.next_seed
            )));
        }
        let Assignments {
            text, mut params, ..
        } = assignments;
        let (where_clause, where_params) = condition.into_parts();
        params.extend(where_params);
        Ok(Self {
            table: table.to_sql().to_string(),
            set_clause: text,
            where_clause,
            params,
        })
    }
}

impl SqlBuilder for UpdateBuilder {
    fn build_sql(&self) -> String {
        format!(
            "UPDATE {} SET {}{} RETURNING *",
            self.table, self.set_clause, self.where_clause
        )
    }

    fn params(&self) -> &[Value] {
        &self.params
    }
}
