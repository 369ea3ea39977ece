//! The structured operation model.
//!
//! Every Table/Column call funnels into one [`Operation`] value; the
//! translator validates it, renders it to SQL, and interprets the
//! driver result. Key management carries an explicit
//! [`ConstraintKind`] instead of inferring the kind from which
//! arguments happen to be present.

use std::collections::BTreeMap;

use crate::constraints::{ColumnKey, ConstraintKind};
use crate::expr::Expr;
use crate::schema::Column;
use crate::value::Value;

/// Field selection for reads: everything, or an explicit column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

/// Optional read clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clauses {
    pub where_: Option<Expr>,
    pub limit: Option<u64>,
    pub group_by: Option<String>,
    pub order_by: Option<String>,
}

impl Clauses {
    pub fn filtered(where_: Expr) -> Self {
        Clauses {
            where_: Some(where_),
            ..Clauses::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDirection {
    Inner,
    Left,
    Right,
}

impl JoinDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinDirection::Inner => "inner",
            JoinDirection::Left => "left",
            JoinDirection::Right => "right",
        }
    }
}

/// A validated-later join between two named tables.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub left: String,
    pub right: String,
    pub on: Expr,
    pub direction: JoinDirection,
    pub alias: Option<String>,
}

/// What a read operation selects from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(String),
    Join(JoinSpec),
}

impl Source {
    /// The table name validation and interpretation key off: the left
    /// side of a join, or the table itself.
    pub fn primary_table(&self) -> &str {
        match self {
            Source::Table(name) => name,
            Source::Join(join) => &join.left,
        }
    }
}

/// Where a new column lands in the physical column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPosition {
    First,
    After(String),
}

/// One requested operation against the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select {
        source: Source,
        projection: Projection,
        clauses: Clauses,
    },
    Distinct {
        source: Source,
        projection: Projection,
        clauses: Clauses,
    },
    Count {
        source: Source,
        where_: Option<Expr>,
        group_by: Option<String>,
    },
    Insert {
        table: String,
        rows: Vec<BTreeMap<String, Value>>,
    },
    Update {
        table: String,
        set: BTreeMap<String, Value>,
        where_: Option<Expr>,
    },
    Delete {
        table: String,
        where_: Option<Expr>,
    },
    ShowTables,
    Describe {
        table: String,
    },
    CreateTable {
        table: String,
        columns: Vec<Column>,
        temporary: bool,
        clobber: bool,
    },
    DropTable {
        table: String,
        temporary: bool,
    },
    RenameTable {
        table: String,
        to: String,
    },
    TruncateTable {
        table: String,
    },
    AddColumn {
        table: String,
        column: Column,
        position: Option<ColumnPosition>,
    },
    AlterColumn {
        table: String,
        old: String,
        to: Column,
    },
    DropColumn {
        table: String,
        column: String,
    },
    AddKey {
        table: String,
        kind: ConstraintKind,
        column: String,
        name: Option<String>,
        foreign: Option<ColumnKey>,
    },
    DropKey {
        table: String,
        kind: ConstraintKind,
        name: String,
    },
}

impl Operation {
    /// The table the operation addresses, when it addresses one.
    pub fn table(&self) -> Option<&str> {
        match self {
            Operation::Select { source, .. }
            | Operation::Distinct { source, .. }
            | Operation::Count { source, .. } => Some(source.primary_table()),
            Operation::Insert { table, .. }
            | Operation::Update { table, .. }
            | Operation::Delete { table, .. }
            | Operation::Describe { table }
            | Operation::CreateTable { table, .. }
            | Operation::DropTable { table, .. }
            | Operation::RenameTable { table, .. }
            | Operation::TruncateTable { table }
            | Operation::AddColumn { table, .. }
            | Operation::AlterColumn { table, .. }
            | Operation::DropColumn { table, .. }
            | Operation::AddKey { table, .. }
            | Operation::DropKey { table, .. } => Some(table),
            Operation::ShowTables => None,
        }
    }

    /// The table whose rows this operation may change, for constraint
    /// cache invalidation.
    pub fn mutated_table(&self) -> Option<&str> {
        match self {
            Operation::Insert { table, .. }
            | Operation::Update { table, .. }
            | Operation::Delete { table, .. }
            | Operation::TruncateTable { table }
            | Operation::DropTable { table, .. } => Some(table),
            _ => None,
        }
    }

    /// A short symbolic name for logging.
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Select { .. } => "select",
            Operation::Distinct { .. } => "distinct",
            Operation::Count { .. } => "count",
            Operation::Insert { .. } => "insert",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
            Operation::ShowTables => "show_tables",
            Operation::Describe { .. } => "describe",
            Operation::CreateTable { .. } => "create_table",
            Operation::DropTable { .. } => "drop_table",
            Operation::RenameTable { .. } => "rename_table",
            Operation::TruncateTable { .. } => "truncate_table",
            Operation::AddColumn { .. } => "add_column",
            Operation::AlterColumn { .. } => "alter_column",
            Operation::DropColumn { .. } => "drop_column",
            Operation::AddKey { .. } => "add_key",
            Operation::DropKey { .. } => "drop_key",
        }
    }
}
