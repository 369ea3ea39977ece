use sqlweave_core::{Column, Dtype, Table};

#[test]
fn serializes_a_table_deterministically() {
    let table = Table::new(
        "users",
        vec![Column::from_definition("id int not null primary key").unwrap()],
    );

    let json = serde_json::to_string_pretty(&table).expect("serialize table");
    let expected = r#"{
  "name": "users",
  "columns": [
    {
      "name": "id",
      "dtype": "int",
      "null": false,
      "default": null,
      "visible": true,
      "increment": false,
      "unique": true,
      "key": true,
      "primary": true,
      "comment": ""
    }
  ],
  "temporary": false,
  "increment": null,
  "comment": ""
}"#;
    assert_eq!(json, expected);
}

#[test]
fn snapshot_round_trips_through_json() {
    let tables = vec![
        Table::new(
            "users",
            vec![
                Column::from_definition("id int not null primary key").unwrap(),
                Column::from_definition("name varchar(255) default 'anon'").unwrap(),
            ],
        ),
        Table::new("groups", vec![Column::new("id", Dtype::new("int"))]),
    ];

    let json = serde_json::to_string(&tables).expect("serialize snapshot");
    let parsed: Vec<Table> = serde_json::from_str(&json).expect("parse snapshot");

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].name, "users");
    assert_eq!(parsed[0].columns[1].default.as_deref(), Some("'anon'"));
    assert!(parsed[0].columns[0].primary);
    assert_eq!(parsed[1].columns[0].dtype.as_str(), "int");
}
