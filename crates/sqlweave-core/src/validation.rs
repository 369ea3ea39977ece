use std::collections::{BTreeMap, BTreeSet};

use crate::constraints::{ConstraintKind, ConstraintRegistry};
use crate::error::{Error, Result};
use crate::schema::Table;

/// Validate internal consistency of a catalog.
///
/// This checks:
/// - duplicate table and column names
/// - the primary flag implying unique and key
/// - foreign keys referencing columns that exist
pub fn validate_catalog(tables: &[Table], registry: &ConstraintRegistry) -> Result<()> {
    let mut catalog: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for table in tables {
        if catalog.contains_key(table.name.as_str()) {
            return Err(Error::Validation(format!(
                "duplicate table name: {}",
                table.name
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.as_str()) {
                return Err(Error::Validation(format!(
                    "duplicate column name: {}.{}",
                    table.name, column.name
                )));
            }
            if column.primary && !(column.unique && column.key && !column.null) {
                return Err(Error::Validation(format!(
                    "primary column must be unique, keyed, and not null: {}.{}",
                    table.name, column.name
                )));
            }
        }

        catalog.insert(table.name.as_str(), columns);
    }

    for record in registry.records() {
        let exists = |key: &crate::constraints::ColumnKey| {
            catalog
                .get(key.table.as_str())
                .is_some_and(|cols| cols.contains(key.column.as_str()))
        };

        if !exists(&record.target) {
            return Err(Error::Validation(format!(
                "constraint {} targets a missing column: {}",
                record.name, record.target
            )));
        }
        if record.kind == ConstraintKind::Foreign {
            match &record.foreign {
                Some(foreign) if exists(foreign) => {}
                Some(foreign) => {
                    return Err(Error::Validation(format!(
                        "foreign key {} references a missing column: {foreign}",
                        record.name
                    )));
                }
                None => {
                    return Err(Error::Validation(format!(
                        "foreign key {} has no referenced column",
                        record.name
                    )));
                }
            }
        }
    }

    Ok(())
}
