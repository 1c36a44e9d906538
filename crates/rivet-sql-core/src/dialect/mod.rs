//! SQL dialect behavior.
//!
//! The core targets the SQLite-flavored dialect, but identifier
//! quoting and placeholder style go through a trait so a generation
//! context can be pointed at a different flavor.

mod sqlite;

pub use sqlite::SqliteDialect;

use crate::lexer::Keyword;

/// Trait for dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the parameter placeholder.
    fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Returns true if the name cannot appear bare in generated SQL.
    ///
    /// Names colliding with a reserved word are always quoted, as is
    /// anything that does not scan as a plain identifier.
    fn needs_quoting(&self, name: &str) -> bool {
        if Keyword::from_str(name).is_some() {
            return true;
        }
        let mut chars = name.chars();
        let starts_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        !starts_ok || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Quotes an identifier if necessary, doubling embedded quotes.
    fn quote_identifier(&self, name: &str) -> String {
        if self.needs_quoting(name) {
            let quote = self.identifier_quote();
            let escaped = name.replace(quote, &format!("{quote}{quote}"));
            format!("{quote}{escaped}{quote}")
        } else {
            String::from(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_stay_bare() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.quote_identifier("config_key"), "config_key");
        assert_eq!(dialect.quote_identifier("_private"), "_private");
    }

    #[test]
    fn test_reserved_words_are_quoted() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.quote_identifier("order"), "\"order\"");
        assert_eq!(dialect.quote_identifier("SELECT"), "\"SELECT\"");
    }

    #[test]
    fn test_odd_names_are_quoted_and_escaped() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.quote_identifier("two words"), "\"two words\"");
        assert_eq!(dialect.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(dialect.quote_identifier("1st"), "\"1st\"");
    }
}
