//! MySQL dialect for sqlweave.
//!
//! Provides [`MySqlTranslator`], the dialect's implementation of the
//! core `Translator` and `ExpressionBuilder` seams: lowercase keyword
//! rendering, backtick identifier quoting, `?` placeholders, and
//! dtype-directed result coercion.

pub mod dialect;
pub mod translator;

pub use dialect::{MYSQL_TYPES, escape_string, is_valid_dtype, quote, quote_path};
pub use translator::MySqlTranslator;
