use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintId;

/// Dialect-opaque column type descriptor, stored lowercase except
/// inside quoted labels (e.g. `int`, `varchar(255)`, `enum('A','b')`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Dtype(String);

impl Dtype {
    /// Lowercases the type text outside quoted sections; enum and set
    /// labels are data-bearing and keep their case.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut text = String::with_capacity(raw.len());
        let mut quoted = false;
        for c in raw.trim().chars() {
            if c == '\'' {
                quoted = !quoted;
                text.push(c);
            } else if quoted {
                text.push(c);
            } else {
                text.extend(c.to_lowercase());
            }
        }
        Dtype(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base type name, before any length/value arguments.
    pub fn base(&self) -> &str {
        let end = self
            .0
            .find(|c: char| c == '(' || c.is_whitespace())
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Column metadata: a typed schema leaf.
///
/// `constraints` holds lookup references into the owning database's
/// [`ConstraintRegistry`](crate::constraints::ConstraintRegistry);
/// a detached column (built from a definition string) has none until a
/// table carrying it is attached to a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    pub dtype: Dtype,
    pub null: bool,
    pub default: Option<String>,
    pub visible: bool,
    pub increment: bool,
    pub unique: bool,
    pub key: bool,
    pub primary: bool,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintId>,
}

impl Column {
    /// A nullable, visible column with no keys or defaults.
    pub fn new(name: impl Into<String>, dtype: Dtype) -> Self {
        Column {
            name: name.into().to_lowercase(),
            dtype,
            null: true,
            default: None,
            visible: true,
            increment: false,
            unique: false,
            key: false,
            primary: false,
            comment: String::new(),
            constraints: Vec::new(),
        }
    }

    /// Enforce the flag invariants: a primary column is unique, keyed,
    /// and not nullable.
    pub fn normalize(&mut self) {
        if self.primary {
            self.unique = true;
            self.key = true;
            self.null = false;
        }
    }
}

/// An ordered collection of columns: the in-memory image of one
/// physical table. Column order is the positional order in the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub temporary: bool,
    pub increment: Option<u64>,
    pub comment: String,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            columns,
            temporary: false,
            increment: None,
            comment: String::new(),
        }
    }

    /// The column names, in positional order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Resolve a column by bare name, then by `table.column` qualified
    /// form. Absence is an `Option`, not an error.
    pub fn get_column(&self, col: &str) -> Option<&Column> {
        if let Some(found) = self.columns.iter().find(|c| c.name == col) {
            return Some(found);
        }
        let qualified = col.strip_prefix(&self.name)?.strip_prefix('.')?;
        self.columns.iter().find(|c| c.name == qualified)
    }

    pub fn get_column_mut(&mut self, col: &str) -> Option<&mut Column> {
        let name = self.get_column(col)?.name.clone();
        self.columns.iter_mut().find(|c| c.name == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table {}: ", self.name)?;
        let defs: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        f.write_str(&defs.join(", "))
    }
}
