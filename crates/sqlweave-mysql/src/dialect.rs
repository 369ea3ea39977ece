//! MySQL lexical conventions: identifier quoting, string escaping, and
//! the accepted column types.

use sqlweave_core::{Column, Dtype};

/// Base names of every accepted MySQL column type.
pub const MYSQL_TYPES: &[&str] = &[
    "bit",
    "tinyint",
    "bool",
    "smallint",
    "mediumint",
    "int",
    "bigint",
    "serial",
    "decimal",
    "float",
    "double",
    "date",
    "datetime",
    "timestamp",
    "time",
    "year",
    "char",
    "varchar",
    "binary",
    "varbinary",
    "tinyblob",
    "tinytext",
    "blob",
    "text",
    "mediumblob",
    "mediumtext",
    "longblob",
    "longtext",
    "enum",
    "set",
];

/// Whether a dtype's base name is one MySQL accepts.
pub fn is_valid_dtype(dtype: &Dtype) -> bool {
    MYSQL_TYPES.contains(&dtype.base())
}

/// Quote an identifier with backticks, doubling embedded backticks.
pub fn quote(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote a possibly `table.column` qualified name part by part.
pub fn quote_path(path: &str) -> String {
    path.split('.').map(quote).collect::<Vec<_>>().join(".")
}

/// Escape a string for embedding in a single-quoted SQL literal.
/// Values travel as placeholders; this covers DDL text like defaults
/// and comments.
pub fn escape_string(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\'' => escaped.push_str("''"),
            '\\' => escaped.push_str("\\\\"),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render a column definition with a quoted name, for DDL statements.
pub fn render_definition(column: &Column) -> String {
    let mut sql = format!("{} {}", quote(&column.name), column.dtype);
    if !column.null {
        sql.push_str(" not null");
    }
    if let Some(default) = &column.default {
        sql.push_str(" default ");
        sql.push_str(default);
    }
    if !column.visible {
        sql.push_str(" invisible");
    }
    if column.increment {
        sql.push_str(" auto_increment");
    }
    if column.primary {
        sql.push_str(" primary key");
    } else {
        if column.unique {
            sql.push_str(" unique");
        }
        if column.key {
            sql.push_str(" key");
        }
    }
    if !column.comment.is_empty() {
        sql.push_str(&format!(" comment '{}'", escape_string(&column.comment)));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_doubles_embedded_backticks() {
        assert_eq!(quote("users"), "`users`");
        assert_eq!(quote("odd`name"), "`odd``name`");
        assert_eq!(quote_path("users.id"), "`users`.`id`");
    }

    #[test]
    fn dtype_validity_keys_off_the_base_name() {
        assert!(is_valid_dtype(&Dtype::new("VARCHAR(255)")));
        assert!(is_valid_dtype(&Dtype::new("enum('a','b')")));
        assert!(is_valid_dtype(&Dtype::new("int")));
        assert!(!is_valid_dtype(&Dtype::new("uuid")));
    }

    #[test]
    fn definitions_render_with_quoted_names() {
        let column = Column::from_definition("id int not null primary key").unwrap();
        assert_eq!(
            render_definition(&column),
            "`id` int not null primary key"
        );

        let column = Column::from_definition("name varchar(255) default 'anon'").unwrap();
        assert_eq!(
            render_definition(&column),
            "`name` varchar(255) default 'anon'"
        );
    }

    #[test]
    fn escaping_handles_quotes_and_control_bytes() {
        assert_eq!(escape_string("it's"), "it''s");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
        assert_eq!(escape_string("line\nbreak"), "line\\nbreak");
    }
}
