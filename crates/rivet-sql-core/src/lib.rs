//! # rivet-sql-core
//!
//! The core of the rivet mapping code generator: a typed model of
//! schema definition files and an SQL-generation engine for the
//! SQLite-flavored dialect the generator targets.
//!
//! This crate provides:
//! - A hand-written tokenizer for the extended dialect (`$name`
//!   variables, labeled statements, `AS "Name"` table attributes)
//! - A parser that turns schema files into tables, columns and named
//!   queries, collecting diagnostics instead of failing fast
//! - A typed expression tree rendered back into SQL with correct
//!   operator precedence and positional parameter binding
//!
//! ## Parsing a schema file
//!
//! ```rust
//! use rivet_sql_core::parser::parse_schema_file;
//!
//! let result = parse_schema_file(
//!     "CREATE TABLE config (config_key TEXT PRIMARY KEY) AS \"ConfigEntry\";\n\
//!      readAll: SELECT * FROM config ORDER BY $clause;",
//! );
//! assert!(result.diagnostics.is_empty());
//! assert_eq!(result.schema.tables[0].class_name(), "ConfigEntry");
//! ```
//!
//! ## Building and rendering an expression
//!
//! ```rust
//! use rivet_sql_core::expr::{col, render};
//! use rivet_sql_core::types::{SqlType, SqlValue};
//!
//! let filter = col("config_key", SqlType::Text).eq("language").unwrap();
//! let (sql, params) = render(&filter);
//! assert_eq!(sql, "config_key = ?");
//! assert_eq!(params[0].value, SqlValue::Text(String::from("language")));
//! ```

pub mod dialect;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod types;

pub use expr::{col, render, Expr, GenerationContext, Precedence, TypedExpr};
pub use lexer::{tokenize, Keyword, Span, Token, TokenKind};
pub use parser::{parse_schema_file, Diagnostic, ParseResult, Severity};
pub use schema::{NamedQuery, Placeholder, Schema, Table};
pub use types::{BoundValue, SqlType, SqlValue, ToSqlValue};
