//! The translator seam.
//!
//! A dialect supplies one [`Translator`]: validation of an operation
//! against the catalog, deterministic rendering to SQL, and
//! interpretation of driver rows back into typed values. The three
//! stages run in strict order; nothing reaches the driver when
//! validation fails.

use crate::constraints::ConstraintRegistry;
use crate::error::Result;
use crate::expr::ExpressionBuilder;
use crate::op::Operation;
use crate::schema::{Column, Table};
use crate::value::{Outcome, RawRow, Value};

/// A rendered statement: SQL text with `?` placeholders and the
/// parameter list filling them.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub text: String,
    pub params: Vec<Value>,
}

impl SqlQuery {
    pub fn new(text: impl Into<String>, params: Vec<Value>) -> Self {
        SqlQuery {
            text: text.into(),
            params,
        }
    }
}

/// Read-only view of the database's tables, passed to the translator
/// explicitly so it needs no back-reference to the database.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    pub tables: &'a [Table],
}

impl<'a> Catalog<'a> {
    pub fn new(tables: &'a [Table]) -> Self {
        Catalog { tables }
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get_table(&self, name: &str) -> Option<&'a Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn get_column(&self, table: &str, column: &str) -> Option<&'a Column> {
        self.get_table(table)?.get_column(column)
    }
}

/// Dialect-specific three-stage pipeline. Also the dialect's
/// [`ExpressionBuilder`].
pub trait Translator: ExpressionBuilder {
    /// Check the operation's call shape and run constraint validation
    /// against the (already refreshed) value caches. Must reject
    /// everything `translate` could not render faithfully.
    fn validate(
        &self,
        op: &Operation,
        catalog: &Catalog<'_>,
        registry: &mut ConstraintRegistry,
    ) -> Result<()>;

    /// Render a validated operation. Pure and deterministic: the same
    /// operation always yields the same SQL text.
    fn translate(&self, op: &Operation, catalog: &Catalog<'_>) -> Result<SqlQuery>;

    /// Map the driver result into typed values according to the
    /// catalog's declared column types. Non-row statements yield
    /// [`Outcome::None`].
    fn interpret(
        &self,
        raw: Option<Vec<RawRow>>,
        op: &Operation,
        catalog: &Catalog<'_>,
    ) -> Result<Outcome>;
}
