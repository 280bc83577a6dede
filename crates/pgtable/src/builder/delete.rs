use super::traits::SqlBuilder;
use super::where_builder::CompiledCondition;
use crate::ident::TableIdentity;
use crate::value::Value;

/// DELETE builder. An empty condition deletes every row.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    where_clause: String,
    params: Vec<Value>,
}

impl DeleteBuilder {
    pub fn new(table: &TableIdentity, condition: CompiledCondition) -> Self {
        let (where_clause, params) = condition.into_parts();
        Self {
            table: table.to_sql().to_string(),
            where_clause,
            params,
        }
    }
}

impl SqlBuilder for DeleteBuilder {
    fn build_sql(&self) -> String {
        format!("DELETE FROM {}{} RETURNING *", self.table, self.where_clause)
    }

    fn params(&self) -> &[Value] {
        &self.params
    }
}
