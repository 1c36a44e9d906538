//! Schema-file parser
//!
//! Turns tokenized schema source into a [`crate::schema::Schema`]:
//! `CREATE TABLE` statements (a SQLite subset plus the `AS "Name"`
//! attribute) and labeled queries whose placeholders are classified
//! into value bindings, `IN` lists and dynamic clauses.
//!
//! Malformed input produces diagnostics, never panics or early exits;
//! the parser resynchronizes at statement boundaries and keeps going.

mod error;
#[allow(clippy::module_inception)]
mod parser;

pub use error::{Diagnostic, DiagnosticKind, Severity};
pub use parser::{parse_schema_file, ParseResult};
