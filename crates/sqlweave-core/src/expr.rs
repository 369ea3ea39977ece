//! Expression tokens.
//!
//! Operator applications between columns and values are captured as
//! [`Expr`] tokens built by the dialect's [`ExpressionBuilder`]; no SQL
//! syntax is produced anywhere else in the model.

use std::fmt;

use crate::value::Value;

/// A dialect-opaque reference to a column inside an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        ColumnRef {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        ColumnRef {
            table: None,
            name: name.into(),
        }
    }

    /// Whether both references denote the same column. A bare reference
    /// matches any table.
    pub fn denotes(&self, other: &ColumnRef) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.table, &other.table) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// What an expression token denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    /// A boolean predicate, usable in `where` and `join ... on`.
    Comparison,
    /// An arithmetic value.
    Operation,
}

/// An intermediate, dialect-rendered representation of an operator
/// application. `sql` carries `?` placeholders for every entry of
/// `params`; `columns` records every column the expression references.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub sql: String,
    pub params: Vec<Value>,
    pub columns: Vec<ColumnRef>,
}

impl Expr {
    pub fn is_comparison(&self) -> bool {
        self.kind == ExprKind::Comparison
    }

    /// Whether the expression references a column of the named table.
    pub fn references_table(&self, table: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.table.as_deref() == Some(table))
    }
}

/// One side of an operator application.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(ColumnRef),
    Value(Value),
    Expr(Expr),
}

impl From<ColumnRef> for Operand {
    fn from(c: ColumnRef) -> Self {
        Operand::Column(c)
    }
}

impl From<Expr> for Operand {
    fn from(e: Expr) -> Self {
        Operand::Expr(e)
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl Operand {
    /// Wrap anything convertible to a [`Value`].
    pub fn value(v: impl Into<Value>) -> Self {
        Operand::Value(v.into())
    }
}

/// Dialect seam for building expression tokens. Implemented once per
/// dialect, by the translator. All methods are pure.
pub trait ExpressionBuilder {
    fn add(&self, a: Operand, b: Operand) -> Expr;
    fn sub(&self, a: Operand, b: Operand) -> Expr;
    fn mul(&self, a: Operand, b: Operand) -> Expr;
    fn div(&self, a: Operand, b: Operand) -> Expr;
    fn eq(&self, a: Operand, b: Operand) -> Expr;
    fn ne(&self, a: Operand, b: Operand) -> Expr;
    fn gt(&self, a: Operand, b: Operand) -> Expr;
    fn ge(&self, a: Operand, b: Operand) -> Expr;
    fn lt(&self, a: Operand, b: Operand) -> Expr;
    fn le(&self, a: Operand, b: Operand) -> Expr;
    fn like(&self, a: Operand, b: Operand) -> Expr;
    fn contains(&self, a: Operand, b: Operand) -> Expr;
    fn logical_and(&self, a: Operand, b: Operand) -> Expr;
    fn logical_or(&self, a: Operand, b: Operand) -> Expr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denotes_compares_table_and_name() {
        let a = ColumnRef::new("users", "id");
        let b = ColumnRef::new("users", "id");
        let c = ColumnRef::new("groups", "id");
        assert!(a.denotes(&b));
        assert!(!a.denotes(&c));
        assert!(a.denotes(&ColumnRef::bare("id")));
        assert!(!a.denotes(&ColumnRef::bare("name")));
    }

    #[test]
    fn references_table_checks_collected_columns() {
        let expr = Expr {
            kind: ExprKind::Comparison,
            sql: "(`users`.`id` = `groups`.`id`)".to_string(),
            params: Vec::new(),
            columns: vec![ColumnRef::new("users", "id"), ColumnRef::new("groups", "id")],
        };
        assert!(expr.references_table("users"));
        assert!(expr.references_table("groups"));
        assert!(!expr.references_table("orders"));
    }
}
