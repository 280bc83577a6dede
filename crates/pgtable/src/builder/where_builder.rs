//! Criteria compiler: criteria → ` WHERE ...` text plus ordered parameters.

use crate::criteria::{Criteria, Op, Predicate, Test};
use crate::error::TableResult;
use crate::ident::Ident;
use crate::value::Value;

/// Compiled WHERE clause.
///
/// `text` is empty or starts with `" WHERE "`. It contains exactly
/// `params.len()` placeholders, numbered `$seed+1 ..= $seed+params.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    text: String,
    params: Vec<Value>,
    seed: usize,
}

impl CompiledCondition {
    /// No restriction.
    pub fn empty(seed: usize) -> Self {
        Self {
            text: String::new(),
            params: Vec::new(),
            seed,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The placeholder number this condition started after.
    pub fn seed(&self) -> usize {
        self.seed
    }

    /// The last placeholder number used (equal to `seed` when none were).
    pub fn next_seed(&self) -> usize {
        self.seed + self.params.len()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.params)
    }
}

/// Compile `criteria` with placeholder numbering starting at `seed + 1`.
pub fn compile(criteria: &Criteria, seed: usize) -> TableResult<CompiledCondition> {
    Ok(compile_predicates(criteria.predicates()?, seed))
}

/// Compile already-parsed predicates.
pub fn compile_predicates(
    predicates: impl IntoIterator<Item = Predicate>,
    seed: usize,
) -> CompiledCondition {
    let mut builder = WhereBuilder::with_offset(seed);
    for predicate in predicates {
        builder.and_predicate(predicate);
    }
    builder.build()
}

/// Incremental WHERE clause builder.
///
/// Conditions are joined with `AND`; every value becomes a positional
/// placeholder, never SQL text.
pub struct WhereBuilder {
    /// WHERE conditions (without leading AND)
    conditions: Vec<String>,
    /// Parameter values
    params: Vec<Value>,
    /// Placeholder numbering starts after this
    seed: usize,
}

impl WhereBuilder {
    /// Create a new WhereBuilder with param numbering starting at 1.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Create a new WhereBuilder with param numbering starting after `offset`.
    ///
    /// For example, `with_offset(2)` means the first param will be `$3`.
    pub fn with_offset(offset: usize) -> Self {
        Self {
            conditions: Vec::new(),
            params: Vec::new(),
            seed: offset,
        }
    }

    /// Current placeholder number.
    pub fn param_count(&self) -> usize {
        self.seed + self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.param_count())
    }

    pub fn and_predicate(&mut self, predicate: Predicate) {
        let Predicate { column, test } = predicate;
        match test {
            Test::Compare(op, value) => self.and_compare(&column, op, value),
            Test::In(values) => self.and_in(&column, values),
            Test::NotIn(values) => self.and_not_in(&column, values),
            Test::IsNull => self.and_is_null(&column),
            Test::IsNotNull => self.and_is_not_null(&column),
        }
    }

    /// `"col" <op> $n`
    pub fn and_compare(&mut self, column: &Ident, op: Op, value: Value) {
        let placeholder = self.bind(value);
        self.conditions.push(format!(
            "{} {} {}",
            column.to_sql(),
            op.as_sql(),
            placeholder
        ));
    }

    /// `"col" IN ($n, $n+1, ...)`; an empty list matches nothing.
    pub fn and_in(&mut self, column: &Ident, values: Vec<Value>) {
        if values.is_empty() {
            self.conditions.push("1=0".to_string());
            return;
        }
        let list = self.bind_list(values);
        self.conditions
            .push(format!("{} IN ({})", column.to_sql(), list));
    }

    /// `"col" NOT IN ($n, ...)`; an empty list excludes nothing.
    pub fn and_not_in(&mut self, column: &Ident, values: Vec<Value>) {
        if values.is_empty() {
            self.conditions.push("1=1".to_string());
            return;
        }
        let list = self.bind_list(values);
        self.conditions
            .push(format!("{} NOT IN ({})", column.to_sql(), list));
    }

    fn bind_list(&mut self, values: Vec<Value>) -> String {
        values
            .into_iter()
            .map(|v| self.bind(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn and_is_null(&mut self, column: &Ident) {
        self.conditions.push(format!("{} IS NULL", column.to_sql()));
    }

    pub fn and_is_not_null(&mut self, column: &Ident) {
        self.conditions
            .push(format!("{} IS NOT NULL", column.to_sql()));
    }

    pub fn build(self) -> CompiledCondition {
        if self.conditions.is_empty() {
            return CompiledCondition::empty(self.seed);
        }
        CompiledCondition {
            text: format!(" WHERE {}", self.conditions.join(" AND ")),
            params: self.params,
            seed: self.seed,
        }
    }
}

impl Default for WhereBuilder {
    fn default() -> Self {
        Self::new()
    }
}
