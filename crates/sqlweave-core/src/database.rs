//! Database orchestration.
//!
//! A [`Database`] owns the tables, the constraint registry, one
//! translator, and at most one live connection. Every operation runs
//! the same pipeline: refresh the affected constraint caches, validate,
//! translate, execute, invalidate, interpret.

use std::collections::{BTreeMap, BTreeSet};

use crate::constraints::{
    ColumnKey, ConstraintId, ConstraintKind, ConstraintRegistry, KeyLookup,
};
use crate::driver::{ConnectConfig, Connection, Driver};
use crate::error::{Error, Result};
use crate::expr::{ColumnRef, Expr, Operand};
use crate::op::{
    Clauses, ColumnPosition, JoinDirection, JoinSpec, Operation, Projection, Source,
};
use crate::schema::{Column, Table};
use crate::translate::{Catalog, Translator};
use crate::validation::validate_catalog;
use crate::value::{Outcome, Value};

/// One database: one dialect, one (optional) live connection.
pub struct Database<D: Driver> {
    driver: D,
    config: ConnectConfig,
    translator: Box<dyn Translator>,
    conn: Option<D::Conn>,
    tables: Vec<Table>,
    registry: ConstraintRegistry,
}

impl<D: Driver> Database<D> {
    /// The translator is fixed for the lifetime of the database; all
    /// SQL text originates from it.
    pub fn new(driver: D, config: ConnectConfig, translator: Box<dyn Translator>) -> Self {
        Database {
            driver,
            config,
            translator,
            conn: None,
            tables: Vec::new(),
            registry: ConstraintRegistry::new(),
        }
    }

    pub fn open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// Resolve a table by name. Absence is an `Option`, not an error.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get_column(&self, table: &str, column: &str) -> Option<&Column> {
        self.get_table(table)?.get_column(column)
    }

    /// Resolve "the" constraint of a symbolic kind on a column,
    /// applying the primary-over-unique preference and removing losing
    /// duplicates.
    pub fn get_constraint(
        &mut self,
        table: &str,
        column: &str,
        lookup: KeyLookup,
    ) -> Option<ConstraintId> {
        let registry = &mut self.registry;
        let table = self.tables.iter_mut().find(|t| t.name == table)?;
        let column = table.get_column_mut(column)?;
        registry.resolve(&mut column.constraints, lookup)
    }

    // ---- connection lifecycle ----

    /// Open the connection and synchronize the in-memory model from the
    /// live schema. Does nothing when already open.
    pub fn connect(&mut self) -> Result<()> {
        if self.open() {
            return Ok(());
        }
        self.conn = Some(self.driver.connect(&self.config)?);
        tracing::info!(event = "connected", database = %self.config);

        let names = match self.raw_query(&Operation::ShowTables)? {
            Outcome::Names(names) => names,
            _ => Vec::new(),
        };
        for name in names {
            self.rebuild_table(&name)?;
        }
        tracing::info!(event = "catalog_loaded", tables = self.tables.len());
        Ok(())
    }

    /// Release the connection and clear the table list. Safe to call on
    /// an already-closed database.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut conn) = self.conn.take() {
            conn.close()?;
            tracing::info!(event = "closed", database = %self.config);
        }
        self.tables.clear();
        self.registry = ConstraintRegistry::new();
        Ok(())
    }

    pub fn reconnect(&mut self) -> Result<()> {
        self.close()?;
        self.connect()
    }

    pub fn commit(&mut self) -> Result<()> {
        match self.conn.as_mut() {
            Some(conn) => conn.commit(),
            None => Err(Error::State("cannot commit: connection is not open".to_string())),
        }
    }

    pub fn rollback(&mut self) -> Result<()> {
        match self.conn.as_mut() {
            Some(conn) => conn.rollback(),
            None => Err(Error::State(
                "cannot rollback: connection is not open".to_string(),
            )),
        }
    }

    // ---- the query pipeline ----

    /// Run one operation through the full pipeline. The single entry
    /// point every Table/Column operation funnels through.
    pub fn query(&mut self, op: Operation) -> Result<Outcome> {
        if !self.open() {
            return Err(Error::State(format!(
                "cannot {}: connection is not open",
                op.verb()
            )));
        }

        self.refresh_caches(&op)?;
        self.translator
            .validate(&op, &Catalog::new(&self.tables), &mut self.registry)?;
        let sql = self.translator.translate(&op, &Catalog::new(&self.tables))?;
        tracing::debug!(event = "statement_rendered", verb = op.verb(), sql = %sql.text);

        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| Error::State("connection is not open".to_string()))?;
        let raw = conn.execute(&sql.text, &sql.params)?;

        if let Some(table) = op.mutated_table() {
            let table = table.to_string();
            self.invalidate_caches(&table);
        }

        self.translator
            .interpret(raw, &op, &Catalog::new(&self.tables))
    }

    /// Translate, execute, and interpret without validation. Used for
    /// database-side synchronization (connect, rebuild, cache refresh)
    /// where the operation is generated internally.
    fn raw_query(&mut self, op: &Operation) -> Result<Outcome> {
        let sql = self.translator.translate(op, &Catalog::new(&self.tables))?;
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| Error::State("connection is not open".to_string()))?;
        let raw = conn.execute(&sql.text, &sql.params)?;
        self.translator.interpret(raw, op, &Catalog::new(&self.tables))
    }

    /// Rebuild every Unique/Primary/Foreign value cache an insert or
    /// update is about to validate against, by re-reading the distinct
    /// values of the constrained column.
    fn refresh_caches(&mut self, op: &Operation) -> Result<()> {
        let (table, columns): (&str, BTreeSet<&str>) = match op {
            Operation::Insert { table, rows } => (
                table,
                rows.iter().flat_map(|r| r.keys().map(String::as_str)).collect(),
            ),
            Operation::Update { table, set, .. } => {
                (table, set.keys().map(String::as_str).collect())
            }
            _ => return Ok(()),
        };

        let Some(schema) = self.get_table(table) else {
            return Ok(()); // validation will report the missing table
        };

        let mut refreshes: Vec<(ConstraintId, ColumnKey)> = Vec::new();
        for name in columns {
            let Some(column) = schema.get_column(name) else {
                continue;
            };
            for id in &column.constraints {
                let Some(record) = self.registry.get(*id) else {
                    continue;
                };
                if record.target.table != table || record.target.column != column.name {
                    continue; // registered here as the foreign side
                }
                match record.kind {
                    ConstraintKind::Unique | ConstraintKind::Primary => {
                        refreshes.push((*id, record.target.clone()));
                    }
                    ConstraintKind::Foreign => {
                        if let Some(foreign) = record.foreign.clone() {
                            refreshes.push((*id, foreign));
                        }
                    }
                    ConstraintKind::Index => {}
                }
            }
        }

        for (id, source) in refreshes {
            let op = Operation::Distinct {
                source: Source::Table(source.table.clone()),
                projection: Projection::Columns(vec![source.column.clone()]),
                clauses: Clauses::default(),
            };
            let outcome = self.raw_query(&op)?;
            let values: BTreeSet<Value> = outcome
                .rows()
                .iter()
                .filter_map(|row| row.get(&source.column))
                .filter(|v| !v.is_null())
                .cloned()
                .collect();
            if let Some(record) = self.registry.get_mut(id) {
                record.values = values;
            }
        }
        Ok(())
    }

    /// Clear the value caches touching a mutated table.
    fn invalidate_caches(&mut self, table: &str) {
        let ids: Vec<ConstraintId> = self
            .registry
            .records()
            .filter(|r| {
                r.target.table == table
                    || r.foreign.as_ref().is_some_and(|f| f.table == table)
            })
            .map(|r| r.id)
            .collect();
        for id in ids {
            if let Some(record) = self.registry.get_mut(id) {
                record.values.clear();
            }
        }
    }

    // ---- schema mutations ----

    /// Create a table and load its physical shape back into the model.
    pub fn make_table(
        &mut self,
        name: &str,
        columns: Vec<Column>,
        temporary: bool,
        clobber: bool,
    ) -> Result<&Table> {
        self.query(Operation::CreateTable {
            table: name.to_string(),
            columns,
            temporary,
            clobber,
        })?;
        self.rebuild_table(name)?;
        if let Some(table) = self.tables.iter_mut().find(|t| t.name == name) {
            table.temporary = temporary;
        }
        tracing::info!(event = "table_created", table = name, temporary);
        self.get_table(name)
            .ok_or_else(|| Error::State(format!("table {name} vanished after creation")))
    }

    pub fn drop_table(&mut self, name: &str, temporary: bool) -> Result<()> {
        self.query(Operation::DropTable {
            table: name.to_string(),
            temporary,
        })?;
        self.forget_table(name);
        tracing::info!(event = "table_dropped", table = name);
        Ok(())
    }

    /// Rename a table, carrying its constraints to the new name.
    pub fn move_table(&mut self, old: &str, new: &str) -> Result<&Table> {
        self.query(Operation::RenameTable {
            table: old.to_string(),
            to: new.to_string(),
        })?;
        self.forget_table(old);
        self.rebuild_table(new)?;
        tracing::info!(event = "table_renamed", from = old, to = new);
        self.get_table(new)
            .ok_or_else(|| Error::State(format!("table {new} vanished after rename")))
    }

    pub fn truncate_table(&mut self, name: &str) -> Result<()> {
        self.query(Operation::TruncateTable {
            table: name.to_string(),
        })?;
        Ok(())
    }

    pub fn add_column(
        &mut self,
        table: &str,
        column: Column,
        position: Option<ColumnPosition>,
    ) -> Result<&Table> {
        self.query(Operation::AddColumn {
            table: table.to_string(),
            column,
            position,
        })?;
        self.rebuild_table(table)?;
        self.get_table(table)
            .ok_or_else(|| Error::State(format!("table {table} vanished after add column")))
    }

    pub fn alter_column(&mut self, table: &str, old: &str, to: Column) -> Result<&Table> {
        self.query(Operation::AlterColumn {
            table: table.to_string(),
            old: old.to_string(),
            to,
        })?;
        self.rebuild_table(table)?;
        self.get_table(table)
            .ok_or_else(|| Error::State(format!("table {table} vanished after alter column")))
    }

    pub fn drop_column(&mut self, table: &str, column: &str) -> Result<&Table> {
        self.query(Operation::DropColumn {
            table: table.to_string(),
            column: column.to_string(),
        })?;
        self.rebuild_table(table)?;
        self.get_table(table)
            .ok_or_else(|| Error::State(format!("table {table} vanished after drop column")))
    }

    // ---- key management ----

    /// Add a key of an explicit kind. Issues the schema-altering SQL
    /// first; the in-memory constraint is registered only on success.
    pub fn add_key(
        &mut self,
        table: &str,
        column: &str,
        kind: ConstraintKind,
        foreign: Option<ColumnKey>,
        name: Option<String>,
    ) -> Result<ConstraintId> {
        let target_column = self
            .get_column(table, column)
            .ok_or_else(|| {
                Error::Validation(format!("no column {column} in table {table}"))
            })?
            .clone();
        let target = ColumnKey::new(table, target_column.name.clone());

        match kind {
            ConstraintKind::Primary if target_column.null => {
                return Err(Error::Validation(format!(
                    "a primary key requires a NOT NULL column: {target}"
                )));
            }
            ConstraintKind::Foreign => {
                let foreign = foreign.as_ref().ok_or_else(|| {
                    Error::Validation("a foreign key requires a referenced column".to_string())
                })?;
                if foreign.table == table {
                    return Err(Error::Validation(format!(
                        "cannot foreign key a table on itself: {target} -> {foreign}"
                    )));
                }
                if self.get_column(&foreign.table, &foreign.column).is_none() {
                    return Err(Error::Validation(format!(
                        "foreign key references a missing column: {foreign}"
                    )));
                }
            }
            _ => {}
        }

        self.query(Operation::AddKey {
            table: table.to_string(),
            kind,
            column: target.column.clone(),
            name: name.clone(),
            foreign: foreign.clone(),
        })?;

        let id = self
            .registry
            .create(kind, name, target.clone(), foreign.clone());
        self.link(&target, id);
        if let Some(foreign) = &foreign {
            // dual registration: the referenced column sees the key too
            self.link(foreign, id);
            self.ensure_foreign_index(foreign);
            self.recompute_flags(foreign);
        }
        self.recompute_flags(&target);
        validate_catalog(&self.tables, &self.registry)?;
        tracing::info!(event = "key_added", table, column, kind = kind.as_str());
        Ok(id)
    }

    /// Drop a key by its registry id: issues the SQL, then removes the
    /// record from the registry and from every column referencing it.
    pub fn drop_key(&mut self, id: ConstraintId) -> Result<()> {
        let record = self
            .registry
            .get(id)
            .ok_or_else(|| Error::Validation("no such constraint".to_string()))?
            .clone();

        self.query(Operation::DropKey {
            table: record.target.table.clone(),
            kind: record.kind,
            name: record.name.clone(),
        })?;

        self.forget_record(id);
        self.recompute_flags(&record.target);
        tracing::info!(
            event = "key_dropped",
            table = %record.target.table,
            kind = record.kind.as_str()
        );
        Ok(())
    }

    pub fn add_primary_key(&mut self, table: &str, column: &str) -> Result<ConstraintId> {
        self.add_key(table, column, ConstraintKind::Primary, None, None)
    }

    pub fn add_unique(
        &mut self,
        table: &str,
        column: &str,
        name: Option<String>,
    ) -> Result<ConstraintId> {
        self.add_key(table, column, ConstraintKind::Unique, None, name)
    }

    pub fn add_index(
        &mut self,
        table: &str,
        column: &str,
        name: Option<String>,
    ) -> Result<ConstraintId> {
        self.add_key(table, column, ConstraintKind::Index, None, name)
    }

    pub fn add_foreign_key(
        &mut self,
        table: &str,
        column: &str,
        foreign: ColumnKey,
        name: Option<String>,
    ) -> Result<ConstraintId> {
        self.add_key(table, column, ConstraintKind::Foreign, Some(foreign), name)
    }

    // ---- expression passthroughs ----

    pub fn add(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.add(a.into(), b.into())
    }

    pub fn sub(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.sub(a.into(), b.into())
    }

    pub fn mul(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.mul(a.into(), b.into())
    }

    pub fn div(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.div(a.into(), b.into())
    }

    pub fn eq(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.eq(a.into(), b.into())
    }

    pub fn ne(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.ne(a.into(), b.into())
    }

    pub fn gt(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.gt(a.into(), b.into())
    }

    pub fn ge(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.ge(a.into(), b.into())
    }

    pub fn lt(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.lt(a.into(), b.into())
    }

    pub fn le(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.le(a.into(), b.into())
    }

    pub fn like(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.like(a.into(), b.into())
    }

    pub fn contains(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.contains(a.into(), b.into())
    }

    pub fn logical_and(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.logical_and(a.into(), b.into())
    }

    pub fn logical_or(&self, a: impl Into<Operand>, b: impl Into<Operand>) -> Expr {
        self.translator.logical_or(a.into(), b.into())
    }

    /// Fold `column = value` pairs into one AND-chained comparison.
    pub fn filters(&self, table: &str, pairs: &[(&str, Value)]) -> Option<Expr> {
        let mut combined: Option<Expr> = None;
        for (column, value) in pairs {
            let predicate = self.eq(
                Operand::Column(ColumnRef::new(table, *column)),
                Operand::Value(value.clone()),
            );
            combined = Some(match combined {
                Some(previous) => self.logical_and(previous, predicate),
                None => predicate,
            });
        }
        combined
    }

    /// Borrow a table operation handle. `None` when the table is not in
    /// the catalog.
    pub fn table(&mut self, name: &str) -> Option<TableRef<'_, D>> {
        self.get_table(name)?;
        let name = name.to_string();
        Some(TableRef { db: self, name })
    }

    // ---- internal model maintenance ----

    /// Re-describe a table and rebuild its in-memory image, re-linking
    /// surviving constraints and registering flag-implied ones.
    fn rebuild_table(&mut self, name: &str) -> Result<()> {
        let describe = Operation::Describe {
            table: name.to_string(),
        };
        let definitions = match self.raw_query(&describe)? {
            Outcome::Names(defs) => defs,
            other => {
                return Err(Error::Driver(format!(
                    "describe {name} yielded {other:?} instead of definitions"
                )));
            }
        };

        let mut columns = Vec::with_capacity(definitions.len());
        for definition in &definitions {
            let mut column = Column::from_definition(definition)?;
            column.normalize();
            columns.push(column);
        }

        let idx = self.tables.iter().position(|t| t.name == name);
        let mut table = match idx {
            Some(i) => {
                let mut existing = self.tables[i].clone();
                existing.columns = columns;
                existing
            }
            None => Table::new(name, columns),
        };

        // Re-link surviving constraint records; drop the ones whose
        // column no longer exists.
        let mut stale: Vec<ConstraintId> = Vec::new();
        for record in self.registry.records() {
            if record.target.table == name {
                match table.get_column_mut(&record.target.column) {
                    Some(column) => column.constraints.push(record.id),
                    None => stale.push(record.id),
                }
            } else if let Some(foreign) = &record.foreign {
                if foreign.table == name {
                    match table.get_column_mut(&foreign.column) {
                        Some(column) => column.constraints.push(record.id),
                        None => stale.push(record.id),
                    }
                }
            }
        }
        match idx {
            Some(i) => self.tables[i] = table,
            None => self.tables.push(table),
        }
        for id in stale {
            self.forget_record(id);
        }

        self.ensure_flag_constraints(name);
        for table in &mut self.tables {
            if table.name == name {
                for column in &mut table.columns {
                    column.normalize();
                }
            }
        }
        validate_catalog(&self.tables, &self.registry)
    }

    /// Register the constraints a column's flags imply, mirroring
    /// definition-time behavior: primary wins over unique wins over key.
    fn ensure_flag_constraints(&mut self, table_name: &str) {
        let registry = &mut self.registry;
        let Some(table) = self.tables.iter_mut().find(|t| t.name == table_name) else {
            return;
        };
        for column in &mut table.columns {
            let has = |registry: &ConstraintRegistry, ids: &[ConstraintId], kinds: &[ConstraintKind]| {
                ids.iter().any(|id| {
                    registry
                        .get(*id)
                        .is_some_and(|r| kinds.contains(&r.kind))
                })
            };

            let kind = if column.primary
                && !has(registry, &column.constraints, &[ConstraintKind::Primary])
            {
                Some(ConstraintKind::Primary)
            } else if column.unique
                && !column.primary
                && !has(
                    registry,
                    &column.constraints,
                    &[ConstraintKind::Primary, ConstraintKind::Unique],
                )
            {
                Some(ConstraintKind::Unique)
            } else if column.key
                && !column.primary
                && !column.unique
                && !has(
                    registry,
                    &column.constraints,
                    &[
                        ConstraintKind::Primary,
                        ConstraintKind::Unique,
                        ConstraintKind::Index,
                    ],
                )
            {
                Some(ConstraintKind::Index)
            } else {
                None
            };

            if let Some(kind) = kind {
                let id = registry.create(
                    kind,
                    None,
                    ColumnKey::new(table_name, column.name.clone()),
                    None,
                );
                column.constraints.push(id);
            }
        }
    }

    /// The original auto-indexes a referenced column that has no index
    /// of its own.
    fn ensure_foreign_index(&mut self, foreign: &ColumnKey) {
        let registry = &mut self.registry;
        let Some(table) = self.tables.iter_mut().find(|t| t.name == foreign.table) else {
            return;
        };
        let Some(column) = table.get_column_mut(&foreign.column) else {
            return;
        };
        let indexed = column.constraints.iter().any(|id| {
            registry.get(*id).is_some_and(|r| {
                r.target == *foreign
                    && matches!(
                        r.kind,
                        ConstraintKind::Index | ConstraintKind::Unique | ConstraintKind::Primary
                    )
            })
        });
        if !indexed {
            let id = registry.create(ConstraintKind::Index, None, foreign.clone(), None);
            column.constraints.push(id);
        }
    }

    fn link(&mut self, key: &ColumnKey, id: ConstraintId) {
        if let Some(table) = self.tables.iter_mut().find(|t| t.name == key.table) {
            if let Some(column) = table.get_column_mut(&key.column) {
                column.constraints.push(id);
            }
        }
    }

    /// Remove a record from the registry and from every column's id
    /// list (both sides, for foreign keys).
    fn forget_record(&mut self, id: ConstraintId) {
        self.registry.remove(id);
        for table in &mut self.tables {
            for column in &mut table.columns {
                column.constraints.retain(|kept| *kept != id);
            }
        }
    }

    /// Drop a table from the model along with every constraint that
    /// targets or references it.
    fn forget_table(&mut self, name: &str) {
        let ids: Vec<ConstraintId> = self
            .registry
            .records()
            .filter(|r| {
                r.target.table == name
                    || r.foreign.as_ref().is_some_and(|f| f.table == name)
            })
            .map(|r| r.id)
            .collect();
        for id in ids {
            self.forget_record(id);
        }
        self.tables.retain(|t| t.name != name);
    }

    /// Re-derive a column's key flags from its surviving constraints.
    fn recompute_flags(&mut self, key: &ColumnKey) {
        let registry = &self.registry;
        let Some(table) = self.tables.iter_mut().find(|t| t.name == key.table) else {
            return;
        };
        let Some(column) = table.get_column_mut(&key.column) else {
            return;
        };
        let has = |kinds: &[ConstraintKind]| {
            column.constraints.iter().any(|id| {
                registry
                    .get(*id)
                    .is_some_and(|r| r.target == *key && kinds.contains(&r.kind))
            })
        };
        let primary = has(&[ConstraintKind::Primary]);
        let unique = primary || has(&[ConstraintKind::Unique]);
        let keyed = unique || has(&[ConstraintKind::Index]);
        column.primary = primary;
        column.unique = unique;
        column.key = keyed;
    }
}

/// A borrowed handle exposing the Table operation surface. All methods
/// forward to [`Database::query`]; the table itself never builds SQL.
pub struct TableRef<'a, D: Driver> {
    db: &'a mut Database<D>,
    name: String,
}

impl<'a, D: Driver> TableRef<'a, D> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A qualified reference to one of this table's columns, for use in
    /// expressions.
    pub fn col(&self, column: &str) -> Option<ColumnRef> {
        let column = self.db.get_column(&self.name, column)?;
        Some(ColumnRef::new(self.name.clone(), column.name.clone()))
    }

    pub fn select(&mut self, projection: Projection, clauses: Clauses) -> Result<Outcome> {
        self.db.query(Operation::Select {
            source: Source::Table(self.name.clone()),
            projection,
            clauses,
        })
    }

    /// Select with `column = value` filters AND-ed into the where
    /// clause.
    pub fn select_where(
        &mut self,
        projection: Projection,
        filters: &[(&str, Value)],
    ) -> Result<Outcome> {
        let where_ = self.db.filters(&self.name, filters);
        self.select(
            projection,
            Clauses {
                where_,
                ..Clauses::default()
            },
        )
    }

    pub fn distinct(&mut self, projection: Projection, clauses: Clauses) -> Result<Outcome> {
        self.db.query(Operation::Distinct {
            source: Source::Table(self.name.clone()),
            projection,
            clauses,
        })
    }

    pub fn count(&mut self, where_: Option<Expr>, group_by: Option<String>) -> Result<Outcome> {
        self.db.query(Operation::Count {
            source: Source::Table(self.name.clone()),
            where_,
            group_by,
        })
    }

    pub fn insert(&mut self, row: BTreeMap<String, Value>) -> Result<Outcome> {
        self.insert_many(vec![row])
    }

    pub fn insert_many(&mut self, rows: Vec<BTreeMap<String, Value>>) -> Result<Outcome> {
        self.db.query(Operation::Insert {
            table: self.name.clone(),
            rows,
        })
    }

    pub fn update(
        &mut self,
        set: BTreeMap<String, Value>,
        where_: Option<Expr>,
    ) -> Result<Outcome> {
        self.db.query(Operation::Update {
            table: self.name.clone(),
            set,
            where_,
        })
    }

    /// Delete matching rows; an absent `where_` clears the table.
    pub fn delete(&mut self, where_: Option<Expr>) -> Result<Outcome> {
        self.db.query(Operation::Delete {
            table: self.name.clone(),
            where_,
        })
    }

    /// A read-only handle over this table joined to another; `on` must
    /// be an equality between a column of each side.
    pub fn join(
        self,
        right: &str,
        on: Expr,
        direction: JoinDirection,
        alias: Option<String>,
    ) -> JoinRef<'a, D> {
        JoinRef {
            spec: JoinSpec {
                left: self.name,
                right: right.to_string(),
                on,
                direction,
                alias,
            },
            db: self.db,
        }
    }

    pub fn add_primary_key(&mut self, column: &str) -> Result<ConstraintId> {
        self.db.add_primary_key(&self.name, column)
    }

    pub fn add_unique(&mut self, column: &str, name: Option<String>) -> Result<ConstraintId> {
        self.db.add_unique(&self.name, column, name)
    }

    pub fn add_index(&mut self, column: &str, name: Option<String>) -> Result<ConstraintId> {
        self.db.add_index(&self.name, column, name)
    }

    pub fn add_foreign_key(
        &mut self,
        column: &str,
        foreign: ColumnKey,
        name: Option<String>,
    ) -> Result<ConstraintId> {
        self.db.add_foreign_key(&self.name, column, foreign, name)
    }

    pub fn add_key(
        &mut self,
        column: &str,
        kind: ConstraintKind,
        foreign: Option<ColumnKey>,
        name: Option<String>,
    ) -> Result<ConstraintId> {
        self.db.add_key(&self.name, column, kind, foreign, name)
    }

    pub fn drop_key(&mut self, id: ConstraintId) -> Result<()> {
        self.db.drop_key(id)
    }
}

/// Read-only operations over a join.
pub struct JoinRef<'a, D: Driver> {
    db: &'a mut Database<D>,
    spec: JoinSpec,
}

impl<D: Driver> JoinRef<'_, D> {
    pub fn select(&mut self, projection: Projection, clauses: Clauses) -> Result<Outcome> {
        self.db.query(Operation::Select {
            source: Source::Join(self.spec.clone()),
            projection,
            clauses,
        })
    }

    pub fn distinct(&mut self, projection: Projection, clauses: Clauses) -> Result<Outcome> {
        self.db.query(Operation::Distinct {
            source: Source::Join(self.spec.clone()),
            projection,
            clauses,
        })
    }

    pub fn count(&mut self, where_: Option<Expr>, group_by: Option<String>) -> Result<Outcome> {
        self.db.query(Operation::Count {
            source: Source::Join(self.spec.clone()),
            where_,
            group_by,
        })
    }
}
