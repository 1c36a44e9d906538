//! Token types for the SQL tokenizer.

use super::Span;

/// Reserved words of the dialect.
///
/// Identifiers are compared case-insensitively against this table; a
/// match produces a [`TokenKind::Keyword`] token. The emitter also
/// consults it to decide when a column or table name must be quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Abort,
    Action,
    Add,
    All,
    And,
    As,
    Asc,
    Autoincrement,
    Between,
    Blob,
    Boolean,
    By,
    Cascade,
    Case,
    Cast,
    Check,
    Collate,
    Conflict,
    Constraint,
    Create,
    Cross,
    Datetime,
    Default,
    Delete,
    Desc,
    Distinct,
    Drop,
    Else,
    End,
    Escape,
    Except,
    Exists,
    Fail,
    First,
    Foreign,
    From,
    Full,
    Group,
    Having,
    If,
    Ignore,
    In,
    Index,
    Inner,
    Insert,
    Int,
    Integer,
    Intersect,
    Into,
    Is,
    Join,
    Key,
    Last,
    Left,
    Like,
    Limit,
    No,
    Not,
    Null,
    Nulls,
    Offset,
    On,
    Or,
    Order,
    Outer,
    Primary,
    Real,
    References,
    Replace,
    Restrict,
    Right,
    Rollback,
    Rowid,
    Select,
    Set,
    Table,
    Text,
    Then,
    Union,
    Unique,
    Update,
    Using,
    Values,
    When,
    Where,
    Without,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait, clippy::too_many_lines)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ABORT" => Some(Self::Abort),
            "ACTION" => Some(Self::Action),
            "ADD" => Some(Self::Add),
            "ALL" => Some(Self::All),
            "AND" => Some(Self::And),
            "AS" => Some(Self::As),
            "ASC" => Some(Self::Asc),
            "AUTOINCREMENT" => Some(Self::Autoincrement),
            "BETWEEN" => Some(Self::Between),
            "BLOB" => Some(Self::Blob),
            "BOOLEAN" => Some(Self::Boolean),
            "BY" => Some(Self::By),
            "CASCADE" => Some(Self::Cascade),
            "CASE" => Some(Self::Case),
            "CAST" => Some(Self::Cast),
            "CHECK" => Some(Self::Check),
            "COLLATE" => Some(Self::Collate),
            "CONFLICT" => Some(Self::Conflict),
            "CONSTRAINT" => Some(Self::Constraint),
            "CREATE" => Some(Self::Create),
            "CROSS" => Some(Self::Cross),
            "DATETIME" => Some(Self::Datetime),
            "DEFAULT" => Some(Self::Default),
            "DELETE" => Some(Self::Delete),
            "DESC" => Some(Self::Desc),
            "DISTINCT" => Some(Self::Distinct),
            "DROP" => Some(Self::Drop),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "ESCAPE" => Some(Self::Escape),
            "EXCEPT" => Some(Self::Except),
            "EXISTS" => Some(Self::Exists),
            "FAIL" => Some(Self::Fail),
            "FIRST" => Some(Self::First),
            "FOREIGN" => Some(Self::Foreign),
            "FROM" => Some(Self::From),
            "FULL" => Some(Self::Full),
            "GROUP" => Some(Self::Group),
            "HAVING" => Some(Self::Having),
            "IF" => Some(Self::If),
            "IGNORE" => Some(Self::Ignore),
            "IN" => Some(Self::In),
            "INDEX" => Some(Self::Index),
            "INNER" => Some(Self::Inner),
            "INSERT" => Some(Self::Insert),
            "INT" => Some(Self::Int),
            "INTEGER" => Some(Self::Integer),
            "INTERSECT" => Some(Self::Intersect),
            "INTO" => Some(Self::Into),
            "IS" => Some(Self::Is),
            "JOIN" => Some(Self::Join),
            "KEY" => Some(Self::Key),
            "LAST" => Some(Self::Last),
            "LEFT" => Some(Self::Left),
            "LIKE" => Some(Self::Like),
            "LIMIT" => Some(Self::Limit),
            "NO" => Some(Self::No),
            "NOT" => Some(Self::Not),
            "NULL" => Some(Self::Null),
            "NULLS" => Some(Self::Nulls),
            "OFFSET" => Some(Self::Offset),
            "ON" => Some(Self::On),
            "OR" => Some(Self::Or),
            "ORDER" => Some(Self::Order),
            "OUTER" => Some(Self::Outer),
            "PRIMARY" => Some(Self::Primary),
            "REAL" => Some(Self::Real),
            "REFERENCES" => Some(Self::References),
            "REPLACE" => Some(Self::Replace),
            "RESTRICT" => Some(Self::Restrict),
            "RIGHT" => Some(Self::Right),
            "ROLLBACK" => Some(Self::Rollback),
            "ROWID" => Some(Self::Rowid),
            "SELECT" => Some(Self::Select),
            "SET" => Some(Self::Set),
            "TABLE" => Some(Self::Table),
            "TEXT" => Some(Self::Text),
            "THEN" => Some(Self::Then),
            "UNION" => Some(Self::Union),
            "UNIQUE" => Some(Self::Unique),
            "UPDATE" => Some(Self::Update),
            "USING" => Some(Self::Using),
            "VALUES" => Some(Self::Values),
            "WHEN" => Some(Self::When),
            "WHERE" => Some(Self::Where),
            "WITHOUT" => Some(Self::Without),
            _ => None,
        }
    }

    /// Returns the keyword's canonical upper-case spelling.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "ABORT",
            Self::Action => "ACTION",
            Self::Add => "ADD",
            Self::All => "ALL",
            Self::And => "AND",
            Self::As => "AS",
            Self::Asc => "ASC",
            Self::Autoincrement => "AUTOINCREMENT",
            Self::Between => "BETWEEN",
            Self::Blob => "BLOB",
            Self::Boolean => "BOOLEAN",
            Self::By => "BY",
            Self::Cascade => "CASCADE",
            Self::Case => "CASE",
            Self::Cast => "CAST",
            Self::Check => "CHECK",
            Self::Collate => "COLLATE",
            Self::Conflict => "CONFLICT",
            Self::Constraint => "CONSTRAINT",
            Self::Create => "CREATE",
            Self::Cross => "CROSS",
            Self::Datetime => "DATETIME",
            Self::Default => "DEFAULT",
            Self::Delete => "DELETE",
            Self::Desc => "DESC",
            Self::Distinct => "DISTINCT",
            Self::Drop => "DROP",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Escape => "ESCAPE",
            Self::Except => "EXCEPT",
            Self::Exists => "EXISTS",
            Self::Fail => "FAIL",
            Self::First => "FIRST",
            Self::Foreign => "FOREIGN",
            Self::From => "FROM",
            Self::Full => "FULL",
            Self::Group => "GROUP",
            Self::Having => "HAVING",
            Self::If => "IF",
            Self::Ignore => "IGNORE",
            Self::In => "IN",
            Self::Index => "INDEX",
            Self::Inner => "INNER",
            Self::Insert => "INSERT",
            Self::Int => "INT",
            Self::Integer => "INTEGER",
            Self::Intersect => "INTERSECT",
            Self::Into => "INTO",
            Self::Is => "IS",
            Self::Join => "JOIN",
            Self::Key => "KEY",
            Self::Last => "LAST",
            Self::Left => "LEFT",
            Self::Like => "LIKE",
            Self::Limit => "LIMIT",
            Self::No => "NO",
            Self::Not => "NOT",
            Self::Null => "NULL",
            Self::Nulls => "NULLS",
            Self::Offset => "OFFSET",
            Self::On => "ON",
            Self::Or => "OR",
            Self::Order => "ORDER",
            Self::Outer => "OUTER",
            Self::Primary => "PRIMARY",
            Self::Real => "REAL",
            Self::References => "REFERENCES",
            Self::Replace => "REPLACE",
            Self::Restrict => "RESTRICT",
            Self::Right => "RIGHT",
            Self::Rollback => "ROLLBACK",
            Self::Rowid => "ROWID",
            Self::Select => "SELECT",
            Self::Set => "SET",
            Self::Table => "TABLE",
            Self::Text => "TEXT",
            Self::Then => "THEN",
            Self::Union => "UNION",
            Self::Unique => "UNIQUE",
            Self::Update => "UPDATE",
            Self::Using => "USING",
            Self::Values => "VALUES",
            Self::When => "WHEN",
            Self::Where => "WHERE",
            Self::Without => "WITHOUT",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Numeric literal. The payload is the exact lexeme, which is the
    /// canonical form forwarded to generated SQL (e.g. `0x1F`, `.5e-3`).
    Number {
        /// The literal as written in the source.
        lexeme: String,
    },
    /// String literal (`'…'`) or binary string literal (`x'…'`).
    StringLiteral {
        /// The unescaped payload (doubled quotes collapsed).
        value: String,
        /// True for `x'…'` binary strings.
        binary: bool,
    },
    /// Identifier, plain or double-quoted. The payload is unescaped.
    Identifier(String),
    /// A reserved word.
    Keyword(Keyword),

    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `=`
    Eq,
    /// `!=` or `<>`
    NotEq,
    /// `;`
    Semicolon,
    /// `:` directly after an identifier; the schema-file parser decides
    /// whether the pair forms a statement label.
    Colon,

    /// `?` or `?N`.
    Positional {
        /// Explicit one-based index when written as `?N`.
        index: Option<u32>,
    },
    /// `$name`, `:name` or `@name`.
    NamedVariable(String),

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match self {
            Self::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        self.kind.as_keyword()
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.as_keyword() == Some(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str_case_insensitive() {
        assert_eq!(Keyword::from_str("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("WiThOuT"), Some(Keyword::Without));
        assert_eq!(Keyword::from_str("config_key"), None);
    }

    #[test]
    fn test_keyword_as_str() {
        assert_eq!(Keyword::Order.as_str(), "ORDER");
        assert_eq!(Keyword::References.as_str(), "REFERENCES");
    }

    #[test]
    fn test_token_helpers() {
        let select = Token::new(TokenKind::Keyword(Keyword::Select), Span::new(0, 6));
        assert!(select.is_keyword(Keyword::Select));
        assert!(!select.is_keyword(Keyword::From));
        assert!(!select.is_eof());
        assert!(Token::new(TokenKind::Eof, Span::new(6, 6)).is_eof());
    }
}
