//! Core object model and contracts for sqlweave.
//!
//! This crate defines the schema types, the constraint registry, the
//! structured operation model, and the translator and driver seams
//! shared across dialects and the CLI.

pub mod constraints;
pub mod database;
pub mod definition;
pub mod driver;
pub mod error;
pub mod expr;
pub mod op;
pub mod schema;
pub mod translate;
pub mod validation;
pub mod value;

pub use constraints::{
    ColumnKey, ConstraintId, ConstraintKind, ConstraintRecord, ConstraintRegistry, KeyLookup,
};
pub use database::{Database, JoinRef, TableRef};
pub use driver::{ConnectConfig, Connection, Driver};
pub use error::{Error, Result};
pub use expr::{ColumnRef, Expr, ExprKind, ExpressionBuilder, Operand};
pub use op::{
    Clauses, ColumnPosition, JoinDirection, JoinSpec, Operation, Projection, Source,
};
pub use schema::{Column, Dtype, Table};
pub use translate::{Catalog, SqlQuery, Translator};
pub use validation::validate_catalog;
pub use value::{Outcome, RawRow, RawValue, Row, Value};
