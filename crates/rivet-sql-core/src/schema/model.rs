//! The in-memory description of parsed schema files.
//!
//! These types describe what a schema file declares and are handed to
//! the code-generation back-end. They serialize, so tooling can
//! snapshot a schema and diff it later.

use serde::{Deserialize, Serialize};

use crate::lexer::Span;
use crate::types::SqlType;

/// Everything a schema file declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Declared tables, in file order.
    pub tables: Vec<Table>,
    /// Labeled queries, in file order.
    pub queries: Vec<NamedQuery>,
    /// Mappings from tables to the classes generated for them.
    pub entity_bindings: Vec<EntityBinding>,
}

impl Schema {
    /// Looks up a table by name (case-insensitive).
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a named query by label.
    #[must_use]
    pub fn query(&self, label: &str) -> Option<&NamedQuery> {
        self.queries.iter().find(|q| q.label == label)
    }
}

/// Links a table to the class generated for its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBinding {
    /// The table name.
    pub table: String,
    /// The mapped class name.
    pub class_name: String,
}

/// A declared table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// The table name as written.
    pub name: String,
    /// The columns, in declaration order. Names are unique.
    pub columns: Vec<Column>,
    /// Columns of a table-level `PRIMARY KEY (…)` constraint. Empty
    /// when the key is declared on a column or the table uses the
    /// implicit rowid.
    pub primary_key: Vec<String>,
    /// Column groups of table-level `UNIQUE (…)` constraints.
    pub unique_constraints: Vec<Vec<String>>,
    /// True for `WITHOUT ROWID` tables.
    pub without_rowid: bool,
    /// Table-level foreign keys.
    pub foreign_keys: Vec<ForeignKey>,
    /// The name attached with `AS "Name"`, if any.
    pub mapped_class_name: Option<String>,
    /// Where the table is declared.
    pub span: Span,
}

impl Table {
    /// Looks up a column by name (case-insensitive).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if any primary key is declared, on a column or at
    /// table level.
    #[must_use]
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty() || self.columns.iter().any(|c| c.primary_key)
    }

    /// Returns the class name generated for this table: the mapped
    /// name when one was attached, otherwise the pascal-cased singular
    /// of the table name.
    #[must_use]
    pub fn class_name(&self) -> String {
        self.mapped_class_name
            .clone()
            .unwrap_or_else(|| derived_class_name(&self.name))
    }
}

/// A declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// The column name as written.
    pub name: String,
    /// The declared type.
    pub ty: ColumnType,
    /// False when `NOT NULL` or a primary key.
    pub nullable: bool,
    /// The `DEFAULT` expression, preserved textually.
    pub default: Option<String>,
    /// True for a column-level `PRIMARY KEY`.
    pub primary_key: bool,
    /// True when the primary key carries `AUTOINCREMENT`.
    pub autoincrement: bool,
    /// True for a column-level `UNIQUE`.
    pub unique: bool,
    /// A column-level `REFERENCES` clause, if any.
    pub references: Option<ForeignKeyClause>,
    /// Where the column is declared.
    pub span: Span,
}

/// A declared column type: the storage class it resolves to plus the
/// exact spelling, size suffix included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    /// The resolved storage class.
    pub base: SqlType,
    /// The spelling as written, e.g. `VARCHAR(20)`.
    pub raw: String,
}

impl ColumnType {
    /// Resolves a written type to its storage class, keeping the raw
    /// spelling.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            base: SqlType::from_type_name(&raw),
            raw,
        }
    }
}

/// The target side of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyClause {
    /// The referenced table.
    pub table: String,
    /// The referenced columns; empty means the target's primary key.
    pub columns: Vec<String>,
    /// `ON DELETE` action, if any.
    pub on_delete: Option<ReferenceAction>,
    /// `ON UPDATE` action, if any.
    pub on_update: Option<ReferenceAction>,
}

/// A table-level `FOREIGN KEY (…) REFERENCES …` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// The local columns.
    pub columns: Vec<String>,
    /// The referenced side.
    pub target: ForeignKeyClause,
    /// Where the constraint is declared.
    pub span: Span,
}

/// What happens to referencing rows on delete or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceAction {
    /// `CASCADE`
    Cascade,
    /// `RESTRICT`
    Restrict,
    /// `SET NULL`
    SetNull,
    /// `SET DEFAULT`
    SetDefault,
    /// `NO ACTION`
    NoAction,
}

impl ReferenceAction {
    /// Returns the SQL spelling of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// A labeled query from a schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedQuery {
    /// The label before the colon.
    pub label: String,
    /// The statement body: literal SQL alternating with placeholders.
    pub fragments: Vec<QueryFragment>,
    /// Where the query is declared.
    pub span: Span,
}

impl NamedQuery {
    /// Returns the placeholders in statement order.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&Placeholder> {
        self.fragments
            .iter()
            .filter_map(|fragment| match fragment {
                QueryFragment::Placeholder(p) => Some(p),
                QueryFragment::Sql(_) => None,
            })
            .collect()
    }
}

/// One piece of a named query's body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryFragment {
    /// SQL forwarded verbatim.
    Sql(String),
    /// A hole resolved at call time.
    Placeholder(Placeholder),
}

/// A hole in a named query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placeholder {
    /// A bare `?`, or `?N` with an explicit index.
    Positional {
        /// The one-based index when written as `?N`.
        index: Option<u32>,
    },
    /// `$name` bound to a single value.
    Value {
        /// The variable name.
        name: String,
        /// The expected storage class when one can be inferred.
        expected: Option<SqlType>,
    },
    /// `IN ?` or `IN $name`: expands to `(?, ?, …)` at call time.
    InList {
        /// The variable name; `None` for the anonymous `IN ?` form.
        name: Option<String>,
    },
    /// A hole filled with rendered SQL rather than a bound value.
    DynamicClause {
        /// The variable name.
        name: String,
        /// What kind of SQL the caller supplies.
        kind: ClauseKind,
    },
}

/// What a dynamic clause placeholder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClauseKind {
    /// A boolean predicate.
    Predicate,
    /// An `ORDER BY` tail, passed through verbatim (including any
    /// `NULLS FIRST`/`NULLS LAST`).
    OrderBy,
}

/// Derives a class name from a table name: split on underscores,
/// singularize the last word, capitalize each word.
fn derived_class_name(table: &str) -> String {
    let words: Vec<&str> = table.split('_').filter(|w| !w.is_empty()).collect();
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        let word = if i + 1 == words.len() {
            singularize(word)
        } else {
            String::from(*word)
        };
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if ["ses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        String::from(&word[..word.len() - 2])
    } else if lower.ends_with('s') && !lower.ends_with("ss") && word.len() > 1 {
        String::from(&word[..word.len() - 1])
    } else {
        String::from(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, mapped: Option<&str>) -> Table {
        Table {
            name: String::from(name),
            columns: vec![],
            primary_key: vec![],
            unique_constraints: vec![],
            without_rowid: false,
            foreign_keys: vec![],
            mapped_class_name: mapped.map(String::from),
            span: Span::default(),
        }
    }

    #[test]
    fn test_mapped_name_wins() {
        assert_eq!(table("users", Some("Account")).class_name(), "Account");
    }

    #[test]
    fn test_derived_class_names() {
        assert_eq!(table("users", None).class_name(), "User");
        assert_eq!(table("config", None).class_name(), "Config");
        assert_eq!(table("with_defaults", None).class_name(), "WithDefault");
        assert_eq!(table("categories", None).class_name(), "Category");
        assert_eq!(table("addresses", None).class_name(), "Address");
        assert_eq!(table("order_items", None).class_name(), "OrderItem");
    }

    #[test]
    fn test_column_type_from_raw() {
        let ty = ColumnType::from_raw("VARCHAR(20)");
        assert_eq!(ty.base, SqlType::Text);
        assert_eq!(ty.raw, "VARCHAR(20)");
    }

    #[test]
    fn test_table_lookup_is_case_insensitive() {
        let schema = Schema {
            tables: vec![table("Users", None)],
            queries: vec![],
            entity_bindings: vec![],
        };
        assert!(schema.table("users").is_some());
        assert!(schema.table("missing").is_none());
    }

    #[test]
    fn test_placeholders_in_order() {
        let query = NamedQuery {
            label: String::from("q"),
            fragments: vec![
                QueryFragment::Sql(String::from("SELECT * FROM t WHERE id IN ")),
                QueryFragment::Placeholder(Placeholder::InList { name: None }),
                QueryFragment::Sql(String::from(" ORDER BY ")),
                QueryFragment::Placeholder(Placeholder::DynamicClause {
                    name: String::from("clause"),
                    kind: ClauseKind::OrderBy,
                }),
            ],
            span: Span::default(),
        };
        let placeholders = query.placeholders();
        assert_eq!(placeholders.len(), 2);
        assert!(matches!(placeholders[0], Placeholder::InList { name: None }));
        assert!(matches!(
            placeholders[1],
            Placeholder::DynamicClause {
                kind: ClauseKind::OrderBy,
                ..
            }
        ));
    }
}
