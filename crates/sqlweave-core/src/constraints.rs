//! Constraint records and the registry that owns them.
//!
//! Constraints live in a central [`ConstraintRegistry`] keyed by id;
//! columns carry id lists rather than owning the records, so a foreign
//! key can be reachable from both its target and its referenced column
//! without double ownership.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// Registry handle for one constraint record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct ConstraintId(u64);

/// The semantic kind of a constraint. `Primary` and `Foreign` share the
/// uniqueness machinery of `Unique` where it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Index,
    Unique,
    Primary,
    Foreign,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintKind::Index => "index",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Primary => "primary",
            ConstraintKind::Foreign => "foreign",
        }
    }
}

/// Symbolic lookup kinds accepted by constraint resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLookup {
    Index,
    Unique,
    Primary,
}

/// Identifies a column for constraint targeting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct ColumnKey {
    pub table: String,
    pub column: String,
}

impl ColumnKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        ColumnKey {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// One live constraint: its kind, name, targeted column, referenced
/// column for foreign keys, and the value cache used for uniqueness and
/// referential checks.
#[derive(Debug, Clone)]
pub struct ConstraintRecord {
    pub id: ConstraintId,
    pub kind: ConstraintKind,
    pub name: String,
    pub target: ColumnKey,
    pub foreign: Option<ColumnKey>,
    pub values: BTreeSet<Value>,
}

impl ConstraintRecord {
    /// Check a candidate value against this constraint.
    ///
    /// Index always passes. Unique and Primary reject values already in
    /// the cache and record accepted ones. Foreign requires membership
    /// in the referenced column's cached values. NULL is exempt from
    /// uniqueness and referential checks.
    pub fn validate(&mut self, value: &Value) -> Result<()> {
        match self.kind {
            ConstraintKind::Index => Ok(()),
            ConstraintKind::Unique | ConstraintKind::Primary => {
                if value.is_null() {
                    return Ok(());
                }
                if self.values.contains(value) {
                    return Err(Error::Validation(format!(
                        "{value} is not unique in {}",
                        self.target
                    )));
                }
                self.values.insert(value.clone());
                Ok(())
            }
            ConstraintKind::Foreign => {
                if value.is_null() {
                    return Ok(());
                }
                let foreign = self.foreign.as_ref().map(|f| f.to_string()).unwrap_or_default();
                if self.values.contains(value) {
                    Ok(())
                } else {
                    Err(Error::Validation(format!(
                        "{value} in {} has no match in {foreign}",
                        self.target
                    )))
                }
            }
        }
    }
}

/// Central store of constraint records.
#[derive(Debug, Default)]
pub struct ConstraintRegistry {
    next: u64,
    records: BTreeMap<ConstraintId, ConstraintRecord>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record. Unnamed constraints get their kind as name;
    /// unnamed foreign keys get `fk_{table}_{target}_{foreign}`.
    pub fn create(
        &mut self,
        kind: ConstraintKind,
        name: Option<String>,
        target: ColumnKey,
        foreign: Option<ColumnKey>,
    ) -> ConstraintId {
        let id = ConstraintId(self.next);
        self.next += 1;

        let name = name.unwrap_or_else(|| match (&kind, &foreign) {
            (ConstraintKind::Foreign, Some(f)) => {
                format!("fk_{}_{}_{}", target.table, target.column, f.column)
            }
            _ => kind.as_str().to_string(),
        });

        self.records.insert(
            id,
            ConstraintRecord {
                id,
                kind,
                name,
                target,
                foreign,
                values: BTreeSet::new(),
            },
        );
        id
    }

    pub fn get(&self, id: ConstraintId) -> Option<&ConstraintRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: ConstraintId) -> Option<&mut ConstraintRecord> {
        self.records.get_mut(&id)
    }

    pub fn remove(&mut self, id: ConstraintId) -> Option<ConstraintRecord> {
        self.records.remove(&id)
    }

    pub fn records(&self) -> impl Iterator<Item = &ConstraintRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve "the" constraint of a symbolic kind among a column's id
    /// list.
    ///
    /// An `index` lookup accepts Primary, Unique, and Index records,
    /// preferring them in that order; `unique` and `primary` lookups
    /// accept Primary and Unique, preferring Primary. When more than
    /// one record matches, the losers are removed from both the id list
    /// and the registry as a side effect.
    pub fn resolve(
        &mut self,
        ids: &mut Vec<ConstraintId>,
        lookup: KeyLookup,
    ) -> Option<ConstraintId> {
        let preference: &[ConstraintKind] = match lookup {
            KeyLookup::Index => &[
                ConstraintKind::Primary,
                ConstraintKind::Unique,
                ConstraintKind::Index,
            ],
            KeyLookup::Unique | KeyLookup::Primary => {
                &[ConstraintKind::Primary, ConstraintKind::Unique]
            }
        };

        let matching: Vec<ConstraintId> = ids
            .iter()
            .copied()
            .filter(|id| {
                self.records
                    .get(id)
                    .is_some_and(|r| preference.contains(&r.kind))
            })
            .collect();

        let winner = preference.iter().find_map(|kind| {
            matching
                .iter()
                .copied()
                .find(|id| self.records.get(id).is_some_and(|r| r.kind == *kind))
        })?;

        if matching.len() > 1 {
            for id in matching {
                if id != winner {
                    self.records.remove(&id);
                    ids.retain(|kept| *kept != id);
                }
            }
        }
        Some(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: ConstraintKind) -> ConstraintRecord {
        ConstraintRecord {
            id: ConstraintId(0),
            kind,
            name: kind.as_str().to_string(),
            target: ColumnKey::new("users", "id"),
            foreign: None,
            values: BTreeSet::new(),
        }
    }

    #[test]
    fn index_accepts_anything() {
        let mut index = record(ConstraintKind::Index);
        assert!(index.validate(&Value::Int(1)).is_ok());
        assert!(index.validate(&Value::Int(1)).is_ok());
    }

    #[test]
    fn unique_rejects_seen_values_and_records_new_ones() {
        let mut unique = record(ConstraintKind::Unique);
        unique.values = [1, 2, 3].into_iter().map(Value::Int).collect();

        assert!(unique.validate(&Value::Int(2)).is_err());
        assert!(unique.validate(&Value::Int(4)).is_ok());
        assert_eq!(unique.values.len(), 4);
        assert!(unique.values.contains(&Value::Int(4)));
    }

    #[test]
    fn foreign_requires_membership_in_referenced_values() {
        let mut fk = record(ConstraintKind::Foreign);
        fk.foreign = Some(ColumnKey::new("groups", "id"));
        fk.values = [1, 2].into_iter().map(Value::Int).collect();

        assert!(fk.validate(&Value::Int(3)).is_err());
        assert!(fk.validate(&Value::Int(1)).is_ok());
    }

    #[test]
    fn null_is_exempt_from_uniqueness_and_references() {
        let mut unique = record(ConstraintKind::Unique);
        assert!(unique.validate(&Value::Null).is_ok());
        assert!(unique.validate(&Value::Null).is_ok());

        let mut fk = record(ConstraintKind::Foreign);
        fk.foreign = Some(ColumnKey::new("groups", "id"));
        assert!(fk.validate(&Value::Null).is_ok());
    }

    #[test]
    fn resolve_prefers_primary_and_drops_the_duplicate() {
        let mut registry = ConstraintRegistry::new();
        let key = ColumnKey::new("users", "id");
        let unique = registry.create(ConstraintKind::Unique, None, key.clone(), None);
        let primary = registry.create(ConstraintKind::Primary, None, key, None);
        let mut ids = vec![unique, primary];

        let found = registry.resolve(&mut ids, KeyLookup::Primary);
        assert_eq!(found, Some(primary));
        assert_eq!(ids, vec![primary]);
        assert!(registry.get(unique).is_none());
    }

    #[test]
    fn resolve_for_index_accepts_the_unique_family() {
        let mut registry = ConstraintRegistry::new();
        let key = ColumnKey::new("users", "email");
        let unique = registry.create(ConstraintKind::Unique, None, key, None);
        let mut ids = vec![unique];

        assert_eq!(registry.resolve(&mut ids, KeyLookup::Index), Some(unique));
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn resolve_misses_return_none_without_mutation() {
        let mut registry = ConstraintRegistry::new();
        let mut ids = Vec::new();
        assert_eq!(registry.resolve(&mut ids, KeyLookup::Unique), None);
    }

    #[test]
    fn foreign_keys_get_a_generated_name() {
        let mut registry = ConstraintRegistry::new();
        let id = registry.create(
            ConstraintKind::Foreign,
            None,
            ColumnKey::new("orders", "user_id"),
            Some(ColumnKey::new("users", "id")),
        );
        assert_eq!(registry.get(id).unwrap().name, "fk_orders_user_id_id");
    }
}
