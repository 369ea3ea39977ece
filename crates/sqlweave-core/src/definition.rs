//! Column definition grammar.
//!
//! `name dtype [[NOT] NULL] [DEFAULT value] [[IN]VISIBLE]
//! [[AUTO_]INCREMENT] [UNIQUE [KEY]] [[PRIMARY] KEY] [COMMENT 'text']`
//!
//! Parsing is case-insensitive; names may be backtick-quoted; dtypes may
//! span tokens (`enum ('a','b')`). `Display` renders the canonical
//! lowercase form, and parsing that form reproduces the column.

use std::fmt;

use crate::error::{Error, Result};
use crate::schema::{Column, Dtype};

const KEYWORDS: &[&str] = &[
    "null",
    "default",
    "visible",
    "invisible",
    "auto_increment",
    "increment",
    "unique",
    "key",
    "primary",
    "comment",
];

impl Column {
    /// Parse a SQL-style column definition into a `Column`.
    pub fn from_definition(definition: &str) -> Result<Column> {
        let tokens = tokenize(definition)?;
        let mut iter = tokens.into_iter().peekable();

        let name = iter
            .next()
            .ok_or_else(|| Error::Definition("empty definition".to_string()))?;
        let name = name.trim_matches('`').to_lowercase();
        if name.is_empty() {
            return Err(Error::Definition("empty column name".to_string()));
        }

        // The dtype is one token, optionally extended by a detached
        // argument group (`enum ('a','b')`). Anything else after it is
        // an option keyword or an error.
        let mut dtype = iter
            .next_if(|t| {
                let lowered = t.to_lowercase();
                !KEYWORDS.contains(&lowered.as_str()) && lowered != "not"
            })
            .ok_or_else(|| Error::Definition(format!("no dtype in definition: {definition}")))?;
        if let Some(args) = iter.next_if(|t| t.starts_with('(')) {
            dtype.push(' ');
            dtype.push_str(&args);
        }

        let mut column = Column::new(name, Dtype::new(dtype));

        while let Some(token) = iter.next() {
            match token.to_lowercase().as_str() {
                "null" => column.null = true,
                "not" => match iter.next().map(|t| t.to_lowercase()) {
                    Some(ref t) if t == "null" => column.null = false,
                    other => {
                        return Err(Error::Definition(format!(
                            "expected NULL after NOT, found {:?}",
                            other
                        )));
                    }
                },
                "default" => {
                    let mut parts = Vec::new();
                    while let Some(part) = iter.next_if(|t| {
                        let lowered = t.to_lowercase();
                        !KEYWORDS.contains(&lowered.as_str()) && lowered != "not"
                    }) {
                        parts.push(part);
                    }
                    if parts.is_empty() {
                        return Err(Error::Definition(
                            "DEFAULT requires a value".to_string(),
                        ));
                    }
                    column.default = Some(parts.join(" "));
                }
                "visible" => column.visible = true,
                "invisible" => column.visible = false,
                "auto_increment" | "increment" => column.increment = true,
                "unique" => column.unique = true,
                "key" => column.key = true,
                "primary" => column.primary = true,
                "comment" => {
                    let rest: Vec<String> = iter.by_ref().collect();
                    if rest.is_empty() {
                        return Err(Error::Definition(
                            "COMMENT requires a value".to_string(),
                        ));
                    }
                    column.comment = unquote(&rest.join(" "));
                }
                other => {
                    return Err(Error::Definition(format!(
                        "unexpected token in definition: {other}"
                    )));
                }
            }
        }

        column.normalize();
        Ok(column)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.dtype)?;
        if !self.null {
            write!(f, " not null")?;
        }
        if let Some(default) = &self.default {
            write!(f, " default {default}")?;
        }
        if !self.visible {
            write!(f, " invisible")?;
        }
        if self.increment {
            write!(f, " auto_increment")?;
        }
        if self.primary {
            write!(f, " primary key")?;
        } else {
            if self.unique {
                write!(f, " unique")?;
            }
            if self.key {
                write!(f, " key")?;
            }
        }
        if !self.comment.is_empty() {
            write!(f, " comment '{}'", self.comment)?;
        }
        Ok(())
    }
}

/// Split a definition on whitespace, keeping quoted strings and
/// parenthesized groups intact.
fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for ch in input.chars() {
        match quote {
            Some(open) => {
                current.push(ch);
                if ch == open {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        Error::Definition(format!("unbalanced parentheses: {input}"))
                    })?;
                    current.push(ch);
                }
                c if c.is_whitespace() && depth == 0 => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err(Error::Definition(format!("unterminated quote: {input}")));
    }
    if depth != 0 {
        return Err(Error::Definition(format!(
            "unbalanced parentheses: {input}"
        )));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}
