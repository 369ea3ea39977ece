#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sqlweave_core::{
    ConnectConfig, Connection, Database, Driver, RawRow, RawValue, Result, Value,
};
use sqlweave_mysql::MySqlTranslator;

/// Shared record of every statement a mock connection executed.
pub type Log = Rc<RefCell<Vec<(String, Vec<Value>)>>>;

/// A scripted driver: executed SQL is matched by prefix against the
/// rules, first hit wins; unmatched statements return no result set.
pub struct MockDriver {
    rules: Vec<(String, Vec<RawRow>)>,
    log: Log,
}

impl MockDriver {
    pub fn new(rules: Vec<(&str, Vec<RawRow>)>) -> (Self, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let driver = MockDriver {
            rules: rules
                .into_iter()
                .map(|(prefix, rows)| (prefix.to_string(), rows))
                .collect(),
            log: log.clone(),
        };
        (driver, log)
    }
}

pub struct MockConnection {
    rules: Vec<(String, Vec<RawRow>)>,
    log: Log,
}

impl Driver for MockDriver {
    type Conn = MockConnection;

    fn connect(&self, _config: &ConnectConfig) -> Result<Self::Conn> {
        Ok(MockConnection {
            rules: self.rules.clone(),
            log: self.log.clone(),
        })
    }
}

impl Connection for MockConnection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<Option<Vec<RawRow>>> {
        self.log
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
        for (prefix, rows) in &self.rules {
            if sql.starts_with(prefix.as_str()) {
                return Ok(Some(rows.clone()));
            }
        }
        Ok(None)
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

pub fn database(rules: Vec<(&str, Vec<RawRow>)>) -> (Database<MockDriver>, Log) {
    let (driver, log) = MockDriver::new(rules);
    let db = Database::new(
        driver,
        ConnectConfig::new("localhost", "app", "secret", "shop"),
        Box::new(MySqlTranslator::new()),
    );
    (db, log)
}

/// One `show tables` result row.
pub fn table_row(name: &str) -> RawRow {
    vec![(
        "Tables_in_shop".to_string(),
        RawValue::Text(name.to_string()),
    )]
}

/// One `describe` result row in the driver's native shape.
pub fn describe_row(
    field: &str,
    dtype: &str,
    null: &str,
    key: &str,
    default: Option<&str>,
    extra: &str,
) -> RawRow {
    vec![
        ("Field".to_string(), RawValue::Text(field.to_string())),
        ("Type".to_string(), RawValue::Text(dtype.to_string())),
        ("Null".to_string(), RawValue::Text(null.to_string())),
        ("Key".to_string(), RawValue::Text(key.to_string())),
        (
            "Default".to_string(),
            default
                .map(|d| RawValue::Text(d.to_string()))
                .unwrap_or(RawValue::Null),
        ),
        ("Extra".to_string(), RawValue::Text(extra.to_string())),
    ]
}

/// The `users` table as the driver would describe it.
pub fn users_describe() -> Vec<RawRow> {
    vec![
        describe_row("id", "int", "NO", "PRI", None, "auto_increment"),
        describe_row("name", "varchar(255)", "YES", "", None, ""),
        describe_row("group_id", "int", "YES", "", None, ""),
    ]
}

/// The `groups` table as the driver would describe it.
pub fn groups_describe() -> Vec<RawRow> {
    vec![
        describe_row("id", "int", "NO", "PRI", None, ""),
        describe_row("name", "varchar(255)", "YES", "", None, ""),
    ]
}

/// A single-column result row.
pub fn value_row(column: &str, value: RawValue) -> RawRow {
    vec![(column.to_string(), value)]
}

/// All statements executed so far whose SQL starts with the prefix.
pub fn executed(log: &Log, prefix: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|(sql, _)| sql.starts_with(prefix))
        .map(|(sql, _)| sql.clone())
        .collect()
}
