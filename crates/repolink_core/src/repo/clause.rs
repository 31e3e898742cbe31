//! Typed builders for dynamic WHERE / SET clauses.
//!
//! # Responsibility
//! - Collect `column = ?` fragments together with their bound values.
//! - Render the clause text and expose values in placeholder order.
//!
//! # Invariants
//! - Placeholders are positional `?`; value order equals append order.
//! - Column names and expressions are `'static` SQL, values are never
//!   interpolated into the statement text.

use rusqlite::types::Value;

#[derive(Debug, Clone, Default, PartialEq)]
struct Fragments {
    sql: Vec<String>,
    values: Vec<Value>,
}

impl Fragments {
    fn push_bound(&mut self, column: &'static str, value: Value) {
        self.sql.push(format!("{column} = ?"));
        self.values.push(value);
    }

    fn push_expr(&mut self, column: &'static str, expr: &'static str) {
        self.sql.push(format!("{column} = {expr}"));
    }
}

/// Conjunction of equality predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    inner: Fragments,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `column = ?`.
    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.inner.push_bound(column, value.into());
        self
    }

    /// Appends `column = ?` only when `value` is present.
    pub fn eq_opt<T: Into<Value>>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    /// Renders the predicate list; an empty clause matches every row.
    pub fn render(&self) -> String {
        if self.inner.sql.is_empty() {
            return "1 = 1".to_string();
        }
        self.inner.sql.join(" AND ")
    }

    pub fn values(&self) -> &[Value] {
        &self.inner.values
    }

    pub fn is_empty(&self) -> bool {
        self.inner.sql.is_empty()
    }
}

/// Ordered list of column assignments for `UPDATE ... SET`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetClause {
    inner: Fragments,
}

impl SetClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `column = ?`.
    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.inner.push_bound(column, value.into());
        self
    }

    /// Appends `column = ?` only when `value` is present.
    pub fn set_opt<T: Into<Value>>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => self,
        }
    }

    /// Appends `column = <expr>` evaluated by the store; binds nothing.
    pub fn set_expr(mut self, column: &'static str, expr: &'static str) -> Self {
        self.inner.push_expr(column, expr);
        self
    }

    /// Renders the assignment list. Callers must not render an empty clause.
    pub fn render(&self) -> String {
        self.inner.sql.join(", ")
    }

    pub fn values(&self) -> &[Value] {
        &self.inner.values
    }

    pub fn is_empty(&self) -> bool {
        self.inner.sql.is_empty()
    }
}

/// Returns bind values for `UPDATE .. SET <set> WHERE <filter>`.
pub fn bind_values(set: &SetClause, filter: &WhereClause) -> Vec<Value> {
    set.values()
        .iter()
        .chain(filter.values())
        .cloned()
        .collect()
}
