//! End-to-end flows over a scripted mock driver: connect-time catalog
//! population, the constraint refresh/validate pipeline, key
//! management, and result interpretation.

mod common;

use std::collections::BTreeMap;

use common::{
    database, describe_row, executed, groups_describe, table_row, users_describe, value_row,
};
use sqlweave_core::{
    ColumnKey, ColumnRef, Error, KeyLookup, Outcome, Projection, RawValue, Value,
};

fn two_table_rules() -> Vec<(&'static str, Vec<sqlweave_core::RawRow>)> {
    vec![
        ("show tables", vec![table_row("users"), table_row("groups")]),
        ("describe `users`", users_describe()),
        ("describe `groups`", groups_describe()),
    ]
}

#[test]
fn connect_populates_tables_from_show_and_describe() {
    let (mut db, log) = database(two_table_rules());
    db.connect().unwrap();

    assert_eq!(db.table_names(), vec!["users", "groups"]);
    let users = db.get_table("users").unwrap();
    assert_eq!(users.column_names(), vec!["id", "name", "group_id"]);

    let id = users.get_column("id").unwrap();
    assert!(id.primary && id.unique && id.key && !id.null && id.increment);
    assert_eq!(id.constraints.len(), 1);

    let statements = log.borrow();
    assert_eq!(statements[0].0, "show tables;");
    assert_eq!(statements[1].0, "describe `users`;");
    assert_eq!(statements[2].0, "describe `groups`;");
}

#[test]
fn duplicate_primary_key_fails_before_any_insert_sql() {
    let mut rules = two_table_rules();
    rules.push((
        "select distinct `id` from `users`",
        vec![
            value_row("id", RawValue::Int(1)),
            value_row("id", RawValue::Int(2)),
        ],
    ));
    let (mut db, log) = database(rules);
    db.connect().unwrap();

    let mut row = BTreeMap::new();
    row.insert("id".to_string(), Value::Int(1));
    row.insert("name".to_string(), Value::from("ann"));
    let err = db.table("users").unwrap().insert(row).unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(executed(&log, "insert").is_empty());
    // the cache refresh did run
    assert_eq!(executed(&log, "select distinct `id` from `users`").len(), 1);
}

#[test]
fn fresh_primary_key_inserts_and_returns_no_rows() {
    let mut rules = two_table_rules();
    rules.push((
        "select distinct `id` from `users`",
        vec![value_row("id", RawValue::Int(1))],
    ));
    let (mut db, log) = database(rules);
    db.connect().unwrap();

    let mut row = BTreeMap::new();
    row.insert("id".to_string(), Value::Int(2));
    row.insert("name".to_string(), Value::from("bob"));
    let outcome = db.table("users").unwrap().insert(row).unwrap();

    assert_eq!(outcome, Outcome::None);
    let inserts = executed(&log, "insert");
    assert_eq!(
        inserts,
        vec!["insert into `users` (`id`, `name`) values (?, ?);".to_string()]
    );
}

#[test]
fn select_interprets_rows_by_declared_dtype() {
    let mut rules = two_table_rules();
    rules.push((
        "select `id`, `name` from `users`",
        vec![
            vec![
                ("id".to_string(), RawValue::Bytes(b"7".to_vec())),
                ("name".to_string(), RawValue::Bytes(b"ann".to_vec())),
            ],
            vec![
                ("id".to_string(), RawValue::Int(8)),
                ("name".to_string(), RawValue::Null),
            ],
        ],
    ));
    let (mut db, _log) = database(rules);
    db.connect().unwrap();

    let outcome = db
        .table("users")
        .unwrap()
        .select(
            Projection::Columns(vec!["id".to_string(), "name".to_string()]),
            Default::default(),
        )
        .unwrap();

    let rows = outcome.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("id"), Some(&Value::Int(7)));
    assert_eq!(rows[0].get("name"), Some(&Value::Text("ann".to_string())));
    assert_eq!(rows[1].get("id"), Some(&Value::Int(8)));
    assert_eq!(rows[1].get("name"), Some(&Value::Null));
}

#[test]
fn count_interprets_the_scalar() {
    let mut rules = two_table_rules();
    rules.push((
        "select count(*) from `users`",
        vec![value_row("count(*)", RawValue::UInt(3))],
    ));
    let (mut db, _log) = database(rules);
    db.connect().unwrap();

    let outcome = db.table("users").unwrap().count(None, None).unwrap();
    assert_eq!(outcome.count(), Some(3));
}

#[test]
fn foreign_key_updates_both_columns_and_auto_indexes() {
    let (mut db, log) = database(two_table_rules());
    db.connect().unwrap();

    let id = db
        .add_foreign_key("users", "group_id", ColumnKey::new("groups", "name"), None)
        .unwrap();

    let record = db.registry().get(id).unwrap();
    assert_eq!(record.name, "fk_users_group_id_name");
    assert_eq!(record.foreign, Some(ColumnKey::new("groups", "name")));

    // dual registration plus an automatic index on the referenced
    // column, which had none
    let referenced = db.get_column("groups", "name").unwrap();
    assert!(referenced.constraints.contains(&id));
    assert_eq!(referenced.constraints.len(), 2);

    assert_eq!(
        executed(&log, "alter table `users` add foreign key"),
        vec![
            "alter table `users` add foreign key (`group_id`) \
             references `groups` (`name`);"
                .to_string()
        ]
    );
}

#[test]
fn update_validates_foreign_values_against_the_referenced_column() {
    let mut rules = two_table_rules();
    rules.push((
        "select distinct `id` from `groups`",
        vec![
            value_row("id", RawValue::Int(1)),
            value_row("id", RawValue::Int(2)),
        ],
    ));
    let (mut db, log) = database(rules);
    db.connect().unwrap();
    db.add_foreign_key("users", "group_id", ColumnKey::new("groups", "id"), None)
        .unwrap();

    let where_ = db.eq(ColumnRef::new("users", "id"), Value::Int(5));
    let mut set = BTreeMap::new();
    set.insert("group_id".to_string(), Value::Int(9));
    let err = db
        .table("users")
        .unwrap()
        .update(set, Some(where_.clone()))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(executed(&log, "update").is_empty());

    let mut set = BTreeMap::new();
    set.insert("group_id".to_string(), Value::Int(2));
    let outcome = db
        .table("users")
        .unwrap()
        .update(set, Some(where_))
        .unwrap();
    assert_eq!(outcome, Outcome::None);
    assert_eq!(
        executed(&log, "update"),
        vec!["update `users` set `group_id` = ? where (`users`.`id` = ?);".to_string()]
    );
}

#[test]
fn added_keys_resolve_and_drop_cleanly() {
    let (mut db, log) = database(two_table_rules());
    db.connect().unwrap();

    let id = db.add_unique("users", "name", None).unwrap();
    assert!(db.get_column("users", "name").unwrap().unique);
    assert_eq!(
        db.get_constraint("users", "name", KeyLookup::Unique),
        Some(id)
    );
    // a unique key satisfies an index lookup
    assert_eq!(
        db.get_constraint("users", "name", KeyLookup::Index),
        Some(id)
    );

    db.drop_key(id).unwrap();
    let name = db.get_column("users", "name").unwrap();
    assert!(!name.unique && !name.key && name.constraints.is_empty());
    assert_eq!(db.get_constraint("users", "name", KeyLookup::Unique), None);

    assert_eq!(executed(&log, "alter table `users` add unique").len(), 1);
    assert_eq!(executed(&log, "alter table `users` drop index").len(), 1);
}

#[test]
fn make_table_describes_and_registers_the_new_table() {
    let mut rules = two_table_rules();
    rules.push((
        "describe `tags`",
        vec![
            describe_row("id", "int", "NO", "PRI", None, ""),
            describe_row("label", "varchar(32)", "YES", "", None, ""),
        ],
    ));
    let (mut db, log) = database(rules);
    db.connect().unwrap();

    let columns = vec![
        sqlweave_core::Column::from_definition("id int not null primary key").unwrap(),
        sqlweave_core::Column::from_definition("label varchar(32)").unwrap(),
    ];
    let table = db.make_table("tags", columns, false, false).unwrap();
    assert_eq!(table.column_names(), vec!["id", "label"]);
    assert!(table.get_column("id").unwrap().primary);

    assert_eq!(
        executed(&log, "create table"),
        vec![
            "create table if not exists `tags` (`id` int not null primary key, \
             `label` varchar(32));"
                .to_string()
        ]
    );
    assert_eq!(db.table_names(), vec!["users", "groups", "tags"]);
}

#[test]
fn drop_table_forgets_the_model_and_its_constraints() {
    let (mut db, log) = database(two_table_rules());
    db.connect().unwrap();
    db.add_foreign_key("users", "group_id", ColumnKey::new("groups", "id"), None)
        .unwrap();

    db.drop_table("groups", false).unwrap();
    assert_eq!(db.table_names(), vec!["users"]);
    // the foreign key referencing the dropped table went with it
    let group_id = db.get_column("users", "group_id").unwrap();
    assert!(group_id.constraints.is_empty());
    assert_eq!(
        executed(&log, "drop table"),
        vec!["drop table if exists `groups`;".to_string()]
    );
}

#[test]
fn closed_databases_reject_queries_and_close_is_idempotent() {
    let (mut db, _log) = database(two_table_rules());
    db.connect().unwrap();
    db.close().unwrap();
    db.close().unwrap();

    assert!(db.tables().is_empty());
    let err = db.table("users").is_none();
    assert!(err);
    assert!(matches!(db.commit(), Err(Error::State(_))));
}

#[test]
fn reconnect_restores_the_catalog() {
    let (mut db, _log) = database(two_table_rules());
    db.connect().unwrap();
    db.reconnect().unwrap();
    assert_eq!(db.table_names(), vec!["users", "groups"]);
}
