//! The MySQL translator: call-shape validation, deterministic SQL
//! rendering, and result interpretation.

use std::collections::BTreeSet;

use sqlweave_core::{
    Catalog, Clauses, Column, ColumnPosition, ColumnRef, ConstraintKind, ConstraintRegistry,
    Dtype, Error, Expr, ExprKind, ExpressionBuilder, Operand, Operation, Outcome, Projection,
    RawRow, RawValue, Result, Row, Source, SqlQuery, Table, Translator, Value,
};

use crate::dialect::{escape_string, is_valid_dtype, quote, quote_path, render_definition};

const INT_BASES: &[&str] = &[
    "bit", "tinyint", "smallint", "mediumint", "int", "bigint", "serial", "year",
];
const FLOAT_BASES: &[&str] = &["decimal", "float", "double"];
const BLOB_BASES: &[&str] = &[
    "binary", "varbinary", "tinyblob", "blob", "mediumblob", "longblob",
];

/// Stateless MySQL dialect. One instance serves a whole database.
#[derive(Debug, Default)]
pub struct MySqlTranslator;

impl MySqlTranslator {
    pub fn new() -> Self {
        MySqlTranslator
    }

    fn binary(&self, kind: ExprKind, op: &str, a: Operand, b: Operand) -> Expr {
        let (a_sql, mut params, mut columns) = render_operand(a);
        let (b_sql, b_params, b_columns) = render_operand(b);
        params.extend(b_params);
        columns.extend(b_columns);
        Expr {
            kind,
            sql: format!("({a_sql} {op} {b_sql})"),
            params,
            columns,
        }
    }

    /// `= NULL` never matches in MySQL; equality against the NULL
    /// marker renders as an `is null` test instead.
    fn null_aware(&self, op: &str, null_op: &str, a: Operand, b: Operand) -> Expr {
        let operand = match (&a, &b) {
            (_, Operand::Value(Value::Null)) => a,
            (Operand::Value(Value::Null), _) => b,
            _ => return self.binary(ExprKind::Comparison, op, a, b),
        };
        let (sql, params, columns) = render_operand(operand);
        Expr {
            kind: ExprKind::Comparison,
            sql: format!("({sql} {null_op})"),
            params,
            columns,
        }
    }
}

fn render_operand(operand: Operand) -> (String, Vec<Value>, Vec<ColumnRef>) {
    match operand {
        Operand::Column(column) => {
            let sql = match &column.table {
                Some(table) => format!("{}.{}", quote(table), quote(&column.name)),
                None => quote(&column.name),
            };
            (sql, Vec::new(), vec![column])
        }
        Operand::Value(value) => ("?".to_string(), vec![value], Vec::new()),
        Operand::Expr(expr) => (expr.sql, expr.params, expr.columns),
    }
}

impl ExpressionBuilder for MySqlTranslator {
    fn add(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Operation, "+", a, b)
    }

    fn sub(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Operation, "-", a, b)
    }

    fn mul(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Operation, "*", a, b)
    }

    fn div(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Operation, "/", a, b)
    }

    fn eq(&self, a: Operand, b: Operand) -> Expr {
        self.null_aware("=", "is null", a, b)
    }

    fn ne(&self, a: Operand, b: Operand) -> Expr {
        self.null_aware("!=", "is not null", a, b)
    }

    fn gt(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Comparison, ">", a, b)
    }

    fn ge(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Comparison, ">=", a, b)
    }

    fn lt(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Comparison, "<", a, b)
    }

    fn le(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Comparison, "<=", a, b)
    }

    fn like(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Comparison, "like", a, b)
    }

    /// Substring containment, rendered as `like` with the text operand
    /// wrapped in wildcards.
    fn contains(&self, a: Operand, b: Operand) -> Expr {
        let b = match b {
            Operand::Value(Value::Text(text)) => {
                Operand::Value(Value::Text(format!("%{text}%")))
            }
            other => other,
        };
        self.binary(ExprKind::Comparison, "like", a, b)
    }

    fn logical_and(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Comparison, "and", a, b)
    }

    fn logical_or(&self, a: Operand, b: Operand) -> Expr {
        self.binary(ExprKind::Comparison, "or", a, b)
    }
}

// ---- validation helpers ----

fn require_table<'a>(catalog: &Catalog<'a>, name: &str) -> Result<&'a Table> {
    catalog
        .get_table(name)
        .ok_or_else(|| Error::Validation(format!("no table named {name}")))
}

fn require_column<'a>(table: &'a Table, name: &str) -> Result<&'a Column> {
    table
        .get_column(name)
        .ok_or_else(|| Error::Validation(format!("no column {name} in table {}", table.name)))
}

/// The tables a read source draws from, in resolution order.
fn source_tables<'a>(catalog: &Catalog<'a>, source: &Source) -> Result<Vec<&'a Table>> {
    match source {
        Source::Table(name) => Ok(vec![require_table(catalog, name)?]),
        Source::Join(join) => Ok(vec![
            require_table(catalog, &join.left)?,
            require_table(catalog, &join.right)?,
        ]),
    }
}

fn resolve_in<'a>(tables: &[&'a Table], name: &str) -> Option<&'a Column> {
    tables.iter().find_map(|t| t.get_column(name))
}

fn check_expr_columns(expr: &Expr, tables: &[&Table]) -> Result<()> {
    for column in &expr.columns {
        let found = match &column.table {
            Some(table) => tables
                .iter()
                .find(|t| t.name == *table)
                .and_then(|t| t.get_column(&column.name))
                .is_some(),
            None => resolve_in(tables, &column.name).is_some(),
        };
        if !found {
            return Err(Error::Validation(format!(
                "expression references an unknown column: {column}"
            )));
        }
    }
    Ok(())
}

fn check_where(where_: &Option<Expr>, tables: &[&Table]) -> Result<()> {
    if let Some(expr) = where_ {
        if !expr.is_comparison() {
            return Err(Error::Validation(
                "where clause must be a comparison".to_string(),
            ));
        }
        check_expr_columns(expr, tables)?;
    }
    Ok(())
}

fn check_join(source: &Source, catalog: &Catalog<'_>) -> Result<()> {
    let Source::Join(join) = source else {
        return Ok(());
    };
    if !join.on.is_comparison() {
        return Err(Error::Validation(
            "join condition must be a comparison".to_string(),
        ));
    }
    for side in [&join.left, &join.right] {
        require_table(catalog, side)?;
        if !join.on.references_table(side) {
            return Err(Error::Validation(format!(
                "join condition must reference a column of {side}"
            )));
        }
    }
    Ok(())
}

fn check_clauses(clauses: &Clauses, tables: &[&Table]) -> Result<()> {
    check_where(&clauses.where_, tables)?;
    if clauses.limit == Some(0) {
        return Err(Error::Validation("limit must be positive".to_string()));
    }
    for (label, clause) in [("group by", &clauses.group_by), ("order by", &clauses.order_by)] {
        if let Some(column) = clause {
            if resolve_in(tables, column).is_none() {
                return Err(Error::Validation(format!(
                    "{label} column is not in the source tables: {column}"
                )));
            }
        }
    }
    Ok(())
}

fn check_projection(
    projection: &Projection,
    tables: &[&Table],
) -> Result<()> {
    if let Projection::Columns(columns) = projection {
        if columns.is_empty() {
            return Err(Error::Validation(
                "projection must name at least one column".to_string(),
            ));
        }
        for column in columns {
            if resolve_in(tables, column).is_none() {
                return Err(Error::Validation(format!(
                    "projected column is not in the source tables: {column}"
                )));
            }
        }
    }
    Ok(())
}

/// Run every constraint registered on a column against one candidate
/// value. Mutates the uniqueness caches as values are accepted.
fn check_constraints(
    registry: &mut ConstraintRegistry,
    table: &str,
    column: &Column,
    value: &Value,
) -> Result<()> {
    for id in &column.constraints {
        let Some(record) = registry.get_mut(*id) else {
            continue;
        };
        if record.target.table == table && record.target.column == column.name {
            record.validate(value)?;
        }
    }
    Ok(())
}

fn check_dtype(dtype: &Dtype) -> Result<()> {
    if is_valid_dtype(dtype) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{dtype} is not a MySQL column type"
        )))
    }
}

// ---- rendering helpers ----

fn render_source(source: &Source) -> (String, Vec<Value>) {
    match source {
        Source::Table(name) => (quote(name), Vec::new()),
        Source::Join(join) => {
            let mut sql = format!(
                "{} {} join {}",
                quote(&join.left),
                join.direction.as_str(),
                quote(&join.right)
            );
            if let Some(alias) = &join.alias {
                sql.push_str(&format!(" as {}", quote(alias)));
            }
            sql.push_str(&format!(" on {}", join.on.sql));
            (sql, join.on.params.clone())
        }
    }
}

fn render_projection(projection: &Projection) -> String {
    match projection {
        Projection::All => "*".to_string(),
        Projection::Columns(columns) => columns
            .iter()
            .map(|c| quote_path(c))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn render_clauses(clauses: &Clauses) -> (String, Vec<Value>) {
    let mut sql = String::new();
    let mut params = Vec::new();
    if let Some(where_) = &clauses.where_ {
        sql.push_str(&format!(" where {}", where_.sql));
        params.extend(where_.params.iter().cloned());
    }
    if let Some(group_by) = &clauses.group_by {
        sql.push_str(&format!(" group by {}", quote_path(group_by)));
    }
    if let Some(order_by) = &clauses.order_by {
        sql.push_str(&format!(" order by {}", quote_path(order_by)));
    }
    if let Some(limit) = clauses.limit {
        sql.push_str(&format!(" limit {limit}"));
    }
    (sql, params)
}

// ---- interpretation helpers ----

fn as_text(value: &RawValue) -> Option<String> {
    match value {
        RawValue::Text(text) => Some(text.clone()),
        RawValue::Bytes(bytes) => String::from_utf8(bytes.clone()).ok(),
        RawValue::Int(v) => Some(v.to_string()),
        RawValue::UInt(v) => Some(v.to_string()),
        RawValue::Float(v) => Some(v.to_string()),
        RawValue::Null => None,
    }
}

fn first_cell(rows: &[RawRow]) -> Option<&RawValue> {
    rows.first().and_then(|row| row.first()).map(|(_, v)| v)
}

/// Coerce one driver-native value according to the declared dtype.
/// Unknown columns pass through with the driver's own typing.
fn interpret_value(raw: RawValue, dtype: Option<&Dtype>) -> Value {
    let base = dtype.map(|d| d.base().to_string()).unwrap_or_default();
    match raw {
        RawValue::Null => Value::Null,
        RawValue::Int(v) if base == "bool" => Value::Bool(v != 0),
        RawValue::Int(v) => Value::Int(v),
        RawValue::UInt(v) if base == "bool" => Value::Bool(v != 0),
        RawValue::UInt(v) => Value::UInt(v),
        RawValue::Float(v) => Value::Float(v),
        RawValue::Text(text) => {
            if base == "bool" {
                match text.parse::<i64>() {
                    Ok(v) => Value::Bool(v != 0),
                    Err(_) => Value::Text(text),
                }
            } else if INT_BASES.contains(&base.as_str()) {
                match text.parse::<i64>() {
                    Ok(v) => Value::Int(v),
                    Err(_) => Value::Text(text),
                }
            } else if FLOAT_BASES.contains(&base.as_str()) {
                match text.parse::<f64>() {
                    Ok(v) => Value::Float(v),
                    Err(_) => Value::Text(text),
                }
            } else {
                Value::Text(text)
            }
        }
        RawValue::Bytes(bytes) => {
            if BLOB_BASES.contains(&base.as_str()) {
                Value::Bytes(bytes)
            } else {
                match String::from_utf8(bytes) {
                    Ok(text) => interpret_value(RawValue::Text(text), dtype),
                    Err(err) => Value::Bytes(err.into_bytes()),
                }
            }
        }
    }
}

fn column_dtype<'a>(
    catalog: &Catalog<'a>,
    source: &Source,
    name: &str,
) -> Option<&'a Dtype> {
    let tables: Vec<&str> = match source {
        Source::Table(table) => vec![table],
        Source::Join(join) => vec![&join.left, &join.right],
    };
    tables
        .iter()
        .find_map(|t| catalog.get_column(t, name))
        .map(|c| &c.dtype)
}

/// Fetch a field from a describe row, tolerating driver-qualified keys
/// like `COLUMNS.Field`.
fn describe_field<'a>(row: &'a RawRow, key: &str) -> Option<&'a RawValue> {
    let suffix = format!(".{key}");
    row.iter()
        .find(|(k, _)| k == key || k.ends_with(&suffix))
        .map(|(_, v)| v)
}

/// Reassemble a `describe` row into a parseable column definition.
fn definition_from_describe(row: &RawRow) -> Result<String> {
    let text = |key: &str| describe_field(row, key).and_then(as_text);
    let field = text("Field")
        .ok_or_else(|| Error::Driver("describe row is missing Field".to_string()))?;
    let dtype = text("Type")
        .ok_or_else(|| Error::Driver("describe row is missing Type".to_string()))?;

    let mut definition = format!("{field} {dtype}");
    if text("Null").as_deref() == Some("NO") {
        definition.push_str(" not null");
    }
    if let Some(default) = text("Default") {
        if default.parse::<f64>().is_ok() {
            definition.push_str(&format!(" default {default}"));
        } else {
            definition.push_str(&format!(" default '{}'", escape_string(&default)));
        }
    }
    if text("Extra").is_some_and(|e| e.contains("auto_increment")) {
        definition.push_str(" auto_increment");
    }
    match text("Key").as_deref() {
        Some("PRI") => definition.push_str(" primary key"),
        Some("UNI") => definition.push_str(" unique"),
        Some("MUL") => definition.push_str(" key"),
        _ => {}
    }
    Ok(definition)
}

impl Translator for MySqlTranslator {
    fn validate(
        &self,
        op: &Operation,
        catalog: &Catalog<'_>,
        registry: &mut ConstraintRegistry,
    ) -> Result<()> {
        // Table existence comes first; CreateTable inverts the check.
        match op {
            Operation::ShowTables => return Ok(()),
            Operation::CreateTable { table, clobber, .. } => {
                if !clobber && catalog.get_table(table).is_some() {
                    return Err(Error::Validation(format!(
                        "table {table} already exists"
                    )));
                }
            }
            Operation::Select { source, .. }
            | Operation::Distinct { source, .. }
            | Operation::Count { source, .. } => {
                source_tables(catalog, source)?;
                check_join(source, catalog)?;
            }
            _ => {
                if let Some(table) = op.table() {
                    require_table(catalog, table)?;
                }
            }
        }

        match op {
            Operation::Select {
                source,
                projection,
                clauses,
            }
            | Operation::Distinct {
                source,
                projection,
                clauses,
            } => {
                let tables = source_tables(catalog, source)?;
                check_projection(projection, &tables)?;
                check_clauses(clauses, &tables)?;
            }

            Operation::Count {
                source,
                where_,
                group_by,
            } => {
                let tables = source_tables(catalog, source)?;
                check_where(where_, &tables)?;
                if let Some(column) = group_by {
                    if resolve_in(&tables, column).is_none() {
                        return Err(Error::Validation(format!(
                            "group by column is not in the source tables: {column}"
                        )));
                    }
                }
            }

            Operation::Insert { table, rows } => {
                if rows.is_empty() {
                    return Err(Error::Validation(
                        "insert requires at least one row".to_string(),
                    ));
                }
                let schema = require_table(catalog, table)?;
                let shape: BTreeSet<&String> = rows[0].keys().collect();
                for row in rows {
                    let keys: BTreeSet<&String> = row.keys().collect();
                    if keys != shape {
                        return Err(Error::Validation(
                            "insert rows must share one column set".to_string(),
                        ));
                    }
                }
                for name in &shape {
                    require_column(schema, name)?;
                }
                for column in &schema.columns {
                    let supplied = shape.contains(&column.name);
                    let optional = column.null || column.default.is_some() || column.increment;
                    if !supplied && !optional {
                        return Err(Error::Validation(format!(
                            "insert is missing required column {}.{}",
                            table, column.name
                        )));
                    }
                }
                for row in rows {
                    for (name, value) in row {
                        let column = require_column(schema, name)?;
                        check_constraints(registry, table, column, value)?;
                    }
                }
            }

            Operation::Update { table, set, where_ } => {
                let schema = require_table(catalog, table)?;
                if set.is_empty() {
                    return Err(Error::Validation(
                        "update requires at least one assignment".to_string(),
                    ));
                }
                check_where(where_, &[schema])?;
                for (name, value) in set {
                    let column = require_column(schema, name)?;
                    check_constraints(registry, table, column, value)?;
                }
            }

            Operation::Delete { table, where_ } => {
                let schema = require_table(catalog, table)?;
                check_where(where_, &[schema])?;
            }

            Operation::CreateTable { columns, .. } => {
                if columns.is_empty() {
                    return Err(Error::Validation(
                        "a table needs at least one column".to_string(),
                    ));
                }
                let mut used = BTreeSet::new();
                for column in columns {
                    if !used.insert(column.name.as_str()) {
                        return Err(Error::Validation(format!(
                            "duplicate column in definition: {}",
                            column.name
                        )));
                    }
                    check_dtype(&column.dtype)?;
                }
            }

            Operation::RenameTable { to, .. } => {
                if catalog.get_table(to).is_some() {
                    return Err(Error::Validation(format!(
                        "cannot rename onto an existing table: {to}"
                    )));
                }
            }

            Operation::AddColumn {
                table,
                column,
                position,
            } => {
                let schema = require_table(catalog, table)?;
                if schema.get_column(&column.name).is_some() {
                    return Err(Error::Validation(format!(
                        "column {} already exists in {table}",
                        column.name
                    )));
                }
                check_dtype(&column.dtype)?;
                if let Some(ColumnPosition::After(anchor)) = position {
                    require_column(schema, anchor)?;
                }
            }

            Operation::AlterColumn { table, old, to } => {
                let schema = require_table(catalog, table)?;
                let old = require_column(schema, old)?;
                check_dtype(&to.dtype)?;
                if to.name != old.name && schema.get_column(&to.name).is_some() {
                    return Err(Error::Validation(format!(
                        "column {} already exists in {table}",
                        to.name
                    )));
                }
            }

            Operation::DropColumn { table, column } => {
                let schema = require_table(catalog, table)?;
                require_column(schema, column)?;
            }

            Operation::AddKey {
                table,
                kind,
                column,
                foreign,
                ..
            } => {
                let schema = require_table(catalog, table)?;
                require_column(schema, column)?;
                match (kind, foreign) {
                    (ConstraintKind::Foreign, Some(foreign)) => {
                        if foreign.table == *table {
                            return Err(Error::Validation(
                                "cannot foreign key a table on itself".to_string(),
                            ));
                        }
                        let referenced = require_table(catalog, &foreign.table)?;
                        require_column(referenced, &foreign.column)?;
                    }
                    (ConstraintKind::Foreign, None) => {
                        return Err(Error::Validation(
                            "a foreign key requires a referenced column".to_string(),
                        ));
                    }
                    (_, Some(_)) => {
                        return Err(Error::Validation(
                            "only foreign keys take a referenced column".to_string(),
                        ));
                    }
                    _ => {}
                }
            }

            Operation::DropKey { kind, name, .. } => {
                if *kind != ConstraintKind::Primary && name.is_empty() {
                    return Err(Error::Validation(
                        "dropping a named key requires its name".to_string(),
                    ));
                }
            }

            Operation::ShowTables
            | Operation::Describe { .. }
            | Operation::DropTable { .. }
            | Operation::TruncateTable { .. } => {}
        }

        Ok(())
    }

    fn translate(&self, op: &Operation, _catalog: &Catalog<'_>) -> Result<SqlQuery> {
        let (mut sql, mut params) = match op {
            Operation::Select {
                source,
                projection,
                clauses,
            } => {
                let (src, mut params) = render_source(source);
                let (tail, tail_params) = render_clauses(clauses);
                params.extend(tail_params);
                (
                    format!("select {} from {src}{tail}", render_projection(projection)),
                    params,
                )
            }

            Operation::Distinct {
                source,
                projection,
                clauses,
            } => {
                let (src, mut params) = render_source(source);
                let (tail, tail_params) = render_clauses(clauses);
                params.extend(tail_params);
                (
                    format!(
                        "select distinct {} from {src}{tail}",
                        render_projection(projection)
                    ),
                    params,
                )
            }

            Operation::Count {
                source,
                where_,
                group_by,
            } => {
                let (src, mut params) = render_source(source);
                let mut sql = format!("select count(*) from {src}");
                if let Some(where_) = where_ {
                    sql.push_str(&format!(" where {}", where_.sql));
                    params.extend(where_.params.iter().cloned());
                }
                if let Some(group_by) = group_by {
                    sql.push_str(&format!(" group by {}", quote_path(group_by)));
                }
                (sql, params)
            }

            Operation::Insert { table, rows } => {
                let first = rows.first().ok_or_else(|| {
                    Error::Syntax("insert with no rows reached translate".to_string())
                })?;
                let columns: Vec<&String> = first.keys().collect();
                let quoted: Vec<String> = columns.iter().map(|c| quote(c)).collect();
                let placeholders = format!(
                    "({})",
                    vec!["?"; columns.len()].join(", ")
                );
                let tuples = vec![placeholders; rows.len()].join(", ");
                let params: Vec<Value> = rows
                    .iter()
                    .flat_map(|row| row.values().cloned())
                    .collect();
                (
                    format!(
                        "insert into {} ({}) values {tuples}",
                        quote(table),
                        quoted.join(", ")
                    ),
                    params,
                )
            }

            Operation::Update { table, set, where_ } => {
                let assignments: Vec<String> =
                    set.keys().map(|c| format!("{} = ?", quote(c))).collect();
                let mut params: Vec<Value> = set.values().cloned().collect();
                let mut sql = format!(
                    "update {} set {}",
                    quote(table),
                    assignments.join(", ")
                );
                if let Some(where_) = where_ {
                    sql.push_str(&format!(" where {}", where_.sql));
                    params.extend(where_.params.iter().cloned());
                }
                (sql, params)
            }

            Operation::Delete { table, where_ } => {
                let mut sql = format!("delete from {}", quote(table));
                let mut params = Vec::new();
                if let Some(where_) = where_ {
                    sql.push_str(&format!(" where {}", where_.sql));
                    params.extend(where_.params.iter().cloned());
                }
                (sql, params)
            }

            Operation::ShowTables => ("show tables".to_string(), Vec::new()),

            Operation::Describe { table } => {
                (format!("describe {}", quote(table)), Vec::new())
            }

            Operation::CreateTable {
                table,
                columns,
                temporary,
                clobber,
            } => {
                let definitions: Vec<String> =
                    columns.iter().map(render_definition).collect();
                let sql = format!(
                    "create {}table {}{} ({})",
                    if *temporary { "temporary " } else { "" },
                    if *clobber { "" } else { "if not exists " },
                    quote(table),
                    definitions.join(", ")
                );
                (sql, Vec::new())
            }

            Operation::DropTable { table, temporary } => (
                format!(
                    "drop {}table if exists {}",
                    if *temporary { "temporary " } else { "" },
                    quote(table)
                ),
                Vec::new(),
            ),

            Operation::RenameTable { table, to } => (
                format!("alter table {} rename {}", quote(table), quote(to)),
                Vec::new(),
            ),

            Operation::TruncateTable { table } => {
                (format!("truncate table {}", quote(table)), Vec::new())
            }

            Operation::AddColumn {
                table,
                column,
                position,
            } => {
                let mut sql = format!(
                    "alter table {} add column {}",
                    quote(table),
                    render_definition(column)
                );
                match position {
                    Some(ColumnPosition::First) => sql.push_str(" first"),
                    Some(ColumnPosition::After(anchor)) => {
                        sql.push_str(&format!(" after {}", quote(anchor)));
                    }
                    None => {}
                }
                (sql, Vec::new())
            }

            Operation::AlterColumn { table, old, to } => (
                format!(
                    "alter table {} change column {} {}",
                    quote(table),
                    quote(old),
                    render_definition(to)
                ),
                Vec::new(),
            ),

            Operation::DropColumn { table, column } => (
                format!(
                    "alter table {} drop column {}",
                    quote(table),
                    quote(column)
                ),
                Vec::new(),
            ),

            Operation::AddKey {
                table,
                kind,
                column,
                name,
                foreign,
            } => {
                let table_sql = quote(table);
                let column_sql = quote(column);
                let sql = match kind {
                    ConstraintKind::Primary => {
                        format!("alter table {table_sql} add primary key ({column_sql})")
                    }
                    ConstraintKind::Unique => match name {
                        Some(name) => format!(
                            "alter table {table_sql} add unique key {} ({column_sql})",
                            quote(name)
                        ),
                        None => {
                            format!("alter table {table_sql} add unique key ({column_sql})")
                        }
                    },
                    ConstraintKind::Index => match name {
                        Some(name) => format!(
                            "alter table {table_sql} add index {} ({column_sql})",
                            quote(name)
                        ),
                        None => format!("alter table {table_sql} add index ({column_sql})"),
                    },
                    ConstraintKind::Foreign => {
                        let foreign = foreign.as_ref().ok_or_else(|| {
                            Error::Syntax(
                                "foreign key without a referenced column".to_string(),
                            )
                        })?;
                        let references = format!(
                            "references {} ({})",
                            quote(&foreign.table),
                            quote(&foreign.column)
                        );
                        match name {
                            Some(name) => format!(
                                "alter table {table_sql} add constraint {} foreign key ({column_sql}) {references}",
                                quote(name)
                            ),
                            None => format!(
                                "alter table {table_sql} add foreign key ({column_sql}) {references}"
                            ),
                        }
                    }
                };
                (sql, Vec::new())
            }

            Operation::DropKey { table, kind, name } => {
                let table_sql = quote(table);
                let sql = match kind {
                    ConstraintKind::Primary => {
                        format!("alter table {table_sql} drop primary key")
                    }
                    ConstraintKind::Foreign => {
                        format!("alter table {table_sql} drop foreign key {}", quote(name))
                    }
                    ConstraintKind::Unique | ConstraintKind::Index => {
                        format!("alter table {table_sql} drop index {}", quote(name))
                    }
                };
                (sql, Vec::new())
            }
        };

        sql.push(';');
        params.shrink_to_fit();
        tracing::trace!(event = "translated", verb = op.verb(), sql = %sql);
        Ok(SqlQuery::new(sql, params))
    }

    fn interpret(
        &self,
        raw: Option<Vec<RawRow>>,
        op: &Operation,
        catalog: &Catalog<'_>,
    ) -> Result<Outcome> {
        let Some(rows) = raw else {
            return Ok(Outcome::None);
        };

        match op {
            Operation::Select { source, .. } | Operation::Distinct { source, .. } => {
                let mut out = Vec::with_capacity(rows.len());
                for raw_row in rows {
                    let mut row = Row::new();
                    for (name, value) in raw_row {
                        let dtype = column_dtype(catalog, source, &name);
                        row.insert(name, interpret_value(value, dtype));
                    }
                    out.push(row);
                }
                Ok(Outcome::Rows(out))
            }

            Operation::Count { .. } => {
                let cell = first_cell(&rows)
                    .ok_or_else(|| Error::Driver("count returned no rows".to_string()))?;
                let count = match cell {
                    RawValue::Int(v) if *v >= 0 => *v as u64,
                    RawValue::UInt(v) => *v,
                    other => as_text(other)
                        .and_then(|t| t.parse::<u64>().ok())
                        .ok_or_else(|| {
                            Error::Driver(format!("count returned {other:?}"))
                        })?,
                };
                Ok(Outcome::Count(count))
            }

            Operation::ShowTables => {
                let names = rows
                    .iter()
                    .filter_map(|row| row.first().and_then(|(_, v)| as_text(v)))
                    .collect();
                Ok(Outcome::Names(names))
            }

            Operation::Describe { .. } => {
                let mut definitions = Vec::with_capacity(rows.len());
                for row in &rows {
                    definitions.push(definition_from_describe(row)?);
                }
                Ok(Outcome::Names(definitions))
            }

            _ => Ok(Outcome::None),
        }
    }
}
