//! Parser for schema definition files.
//!
//! A schema file holds `CREATE TABLE` statements (with the dialect's
//! `AS "Name"` suffix) and labeled queries (`label: SELECT …;`).
//! Query bodies are not understood beyond what placeholder
//! classification and finding the terminating `;` require; everything
//! else is forwarded verbatim.
//!
//! The parser never gives up on the whole file: an unrecognized token
//! abandons the current statement, records a diagnostic, resyncs to
//! the next top-level `;` and continues.

use tracing::debug;

use super::error::{Diagnostic, DiagnosticKind};
use crate::lexer::{tokenize, Keyword, Span, Token, TokenKind};
use crate::schema::{
    validate, ClauseKind, Column, ColumnType, EntityBinding, ForeignKey, ForeignKeyClause,
    NamedQuery, Placeholder, QueryFragment, ReferenceAction, Schema, Table,
};

/// What parsing a schema file produces: the (possibly partial) model
/// and every problem found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    /// The parsed model.
    pub schema: Schema,
    /// Tokenizer, parser and schema diagnostics, in source order per
    /// pass.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Returns true if any diagnostic is fatal for code generation.
    #[must_use]
    pub fn has_fatal_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}

/// Parses a schema file and runs the whole-model checks.
#[must_use]
pub fn parse_schema_file(source: &str) -> ParseResult {
    let (tokens, lex_errors) = tokenize(source);
    let mut parser = SchemaParser {
        source,
        tokens,
        pos: 0,
        diagnostics: lex_errors.into_iter().map(Diagnostic::from).collect(),
    };
    let schema = parser.parse();
    let mut diagnostics = parser.diagnostics;
    diagnostics.extend(validate(&schema));
    ParseResult {
        schema,
        diagnostics,
    }
}

struct SchemaParser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl SchemaParser<'_> {
    fn parse(&mut self) -> Schema {
        let mut schema = Schema::default();

        loop {
            match &self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Create) => {
                    if let Some(table) = self.parse_create_table() {
                        debug!(table = %table.name, columns = table.columns.len(), "parsed CREATE TABLE");
                        if let Some(class_name) = &table.mapped_class_name {
                            schema.entity_bindings.push(EntityBinding {
                                table: table.name.clone(),
                                class_name: class_name.clone(),
                            });
                        }
                        schema.tables.push(table);
                    }
                }
                TokenKind::Identifier(_) if matches!(self.peek().kind, TokenKind::Colon) => {
                    if let Some(query) = self.parse_named_query() {
                        debug!(
                            label = %query.label,
                            placeholders = query.placeholders().len(),
                            "parsed named query"
                        );
                        schema.queries.push(query);
                    }
                }
                _ => {
                    self.unexpected("CREATE TABLE or a named query");
                    self.resync();
                }
            }
        }

        schema
    }

    // ---- token plumbing -------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + 1).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.current().is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&mut self, expected: &str) {
        let token = self.current().clone();
        let found = token.span.lexeme(self.source);
        let message = if token.is_eof() {
            format!("expected {expected}, found end of input")
        } else {
            format!("expected {expected}, found `{found}`")
        };
        self.diagnostics.push(Diagnostic::critical(
            DiagnosticKind::UnexpectedToken,
            token.span,
            message,
        ));
    }

    /// Skips to just past the next top-level `;`.
    fn resync(&mut self) {
        loop {
            match &self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Option<Token> {
        if self.current().is_keyword(keyword) {
            Some(self.advance())
        } else {
            self.unexpected(keyword.as_str());
            None
        }
    }

    fn expect_left_paren(&mut self) -> Option<Token> {
        if matches!(self.current().kind, TokenKind::LeftParen) {
            Some(self.advance())
        } else {
            self.unexpected("`(`");
            None
        }
    }

    fn expect_right_paren(&mut self) -> Option<Token> {
        if matches!(self.current().kind, TokenKind::RightParen) {
            Some(self.advance())
        } else {
            self.unexpected("`)`");
            None
        }
    }

    /// A name position accepts identifiers and also bare keywords, so
    /// a column can be called `order` (it gets quoted on emission).
    fn expect_name(&mut self) -> Option<String> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            TokenKind::Keyword(_) => {
                let token = self.advance();
                Some(String::from(token.span.lexeme(self.source)))
            }
            _ => {
                self.unexpected("a name");
                None
            }
        }
    }

    fn parse_name_list(&mut self) -> Option<Vec<String>> {
        self.expect_left_paren()?;
        let mut names = Vec::new();
        loop {
            names.push(self.expect_name()?);
            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_right_paren()?;
        Some(names)
    }

    // ---- CREATE TABLE ---------------------------------------------------

    /// Parses one `CREATE TABLE` statement. `None` means the statement
    /// was abandoned; the parser has already resynced.
    fn parse_create_table(&mut self) -> Option<Table> {
        let start = self.current().span;
        let result = self.parse_create_table_inner(start);
        if result.is_none() {
            self.resync();
        }
        result
    }

    fn parse_create_table_inner(&mut self, start: Span) -> Option<Table> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;

        if self.eat_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
        }

        let name = self.expect_name()?;
        self.expect_left_paren()?;

        let mut table = Table {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            without_rowid: false,
            foreign_keys: Vec::new(),
            mapped_class_name: None,
            span: start,
        };

        loop {
            if matches!(
                self.current().as_keyword(),
                Some(Keyword::Primary | Keyword::Unique | Keyword::Foreign)
            ) {
                self.parse_table_constraint(&mut table)?;
            } else {
                let column = self.parse_column_def()?;
                table.columns.push(column);
            }
            if matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect_right_paren()?;

        if self.eat_keyword(Keyword::Without) {
            self.expect_keyword(Keyword::Rowid)?;
            table.without_rowid = true;
        }

        if self.eat_keyword(Keyword::As) {
            table.mapped_class_name = Some(self.parse_mapped_name()?);
        }

        table.span = Span::new(start.start, self.prev_end());

        if matches!(self.current().kind, TokenKind::Semicolon) {
            self.advance();
        } else {
            self.unexpected("`;`");
            self.resync();
        }

        Some(table)
    }

    /// The `AS` attribute takes a quoted name; both `"Name"` and
    /// `'Name'` spellings are accepted.
    fn parse_mapped_name(&mut self) -> Option<String> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            TokenKind::StringLiteral { value, binary: false } => {
                let name = value.clone();
                self.advance();
                Some(name)
            }
            _ => {
                self.unexpected("a quoted class name");
                None
            }
        }
    }

    fn parse_column_def(&mut self) -> Option<Column> {
        let start = self.current().span;
        let name = self.expect_name()?;
        let ty = self.parse_column_type()?;

        let mut column = Column {
            name,
            ty,
            nullable: true,
            default: None,
            primary_key: false,
            autoincrement: false,
            unique: false,
            references: None,
            span: start,
        };

        loop {
            match self.current().as_keyword() {
                Some(Keyword::Primary) => {
                    self.advance();
                    self.expect_keyword(Keyword::Key)?;
                    if !self.eat_keyword(Keyword::Asc) {
                        self.eat_keyword(Keyword::Desc);
                    }
                    column.autoincrement = self.eat_keyword(Keyword::Autoincrement);
                    column.primary_key = true;
                    column.nullable = false;
                }
                Some(Keyword::Not) => {
                    self.advance();
                    self.expect_keyword(Keyword::Null)?;
                    column.nullable = false;
                }
                Some(Keyword::Unique) => {
                    self.advance();
                    column.unique = true;
                }
                Some(Keyword::Default) => {
                    self.advance();
                    column.default = Some(self.parse_default_value()?);
                }
                Some(Keyword::References) => {
                    column.references = Some(self.parse_references()?);
                }
                _ => break,
            }
        }

        column.span = Span::new(start.start, self.prev_end());
        Some(column)
    }

    /// Parses the declared type, preserving the exact spelling
    /// including a parenthesized size or precision.
    fn parse_column_type(&mut self) -> Option<ColumnType> {
        let start = self.current().span;
        match &self.current().kind {
            TokenKind::Identifier(_) | TokenKind::Keyword(_) => {
                self.advance();
            }
            _ => {
                self.unexpected("a column type");
                return None;
            }
        }

        if matches!(self.current().kind, TokenKind::LeftParen) {
            self.advance();
            loop {
                match &self.current().kind {
                    TokenKind::RightParen => {
                        self.advance();
                        break;
                    }
                    TokenKind::Number { .. } | TokenKind::Comma => {
                        self.advance();
                    }
                    _ => {
                        self.unexpected("a size");
                        return None;
                    }
                }
            }
        }

        let raw = &self.source[start.start..self.prev_end()];
        Some(ColumnType::from_raw(raw))
    }

    /// Captures a `DEFAULT` value textually: a literal, a signed
    /// number, `NULL`, or a parenthesized expression.
    fn parse_default_value(&mut self) -> Option<String> {
        let start = self.current().span;
        match &self.current().kind {
            TokenKind::Number { .. }
            | TokenKind::StringLiteral { .. }
            | TokenKind::Identifier(_)
            | TokenKind::Keyword(Keyword::Null) => {
                self.advance();
            }
            TokenKind::Minus => {
                self.advance();
                if matches!(self.current().kind, TokenKind::Number { .. }) {
                    self.advance();
                } else {
                    self.unexpected("a number");
                    return None;
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let mut depth = 1_usize;
                loop {
                    match &self.current().kind {
                        TokenKind::LeftParen => {
                            depth += 1;
                            self.advance();
                        }
                        TokenKind::RightParen => {
                            depth -= 1;
                            self.advance();
                            if depth == 0 {
                                break;
                            }
                        }
                        TokenKind::Eof => {
                            self.unexpected("`)`");
                            return None;
                        }
                        _ => {
                            self.advance();
                        }
                    }
                }
            }
            TokenKind::NamedVariable(name) => {
                let message = format!("`${name}` cannot be a column default");
                let span = self.current().span;
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::InvalidPlaceholder,
                    span,
                    message,
                ));
                return None;
            }
            _ => {
                self.unexpected("a default value");
                return None;
            }
        }
        Some(String::from(&self.source[start.start..self.prev_end()]))
    }

    fn parse_references(&mut self) -> Option<ForeignKeyClause> {
        self.expect_keyword(Keyword::References)?;
        let table = self.expect_name()?;
        let columns = if matches!(self.current().kind, TokenKind::LeftParen) {
            self.parse_name_list()?
        } else {
            Vec::new()
        };

        let mut clause = ForeignKeyClause {
            table,
            columns,
            on_delete: None,
            on_update: None,
        };

        while self.eat_keyword(Keyword::On) {
            if self.eat_keyword(Keyword::Delete) {
                clause.on_delete = Some(self.parse_reference_action()?);
            } else if self.eat_keyword(Keyword::Update) {
                clause.on_update = Some(self.parse_reference_action()?);
            } else {
                self.unexpected("DELETE or UPDATE");
                return None;
            }
        }

        Some(clause)
    }

    fn parse_reference_action(&mut self) -> Option<ReferenceAction> {
        if self.eat_keyword(Keyword::Cascade) {
            Some(ReferenceAction::Cascade)
        } else if self.eat_keyword(Keyword::Restrict) {
            Some(ReferenceAction::Restrict)
        } else if self.eat_keyword(Keyword::Set) {
            if self.eat_keyword(Keyword::Null) {
                Some(ReferenceAction::SetNull)
            } else if self.eat_keyword(Keyword::Default) {
                Some(ReferenceAction::SetDefault)
            } else {
                self.unexpected("NULL or DEFAULT");
                None
            }
        } else if self.eat_keyword(Keyword::No) {
            self.expect_keyword(Keyword::Action)?;
            Some(ReferenceAction::NoAction)
        } else {
            self.unexpected("a reference action");
            None
        }
    }

    fn parse_table_constraint(&mut self, table: &mut Table) -> Option<()> {
        let start = self.current().span;
        match self.current().as_keyword() {
            Some(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                table.primary_key = self.parse_name_list()?;
            }
            Some(Keyword::Unique) => {
                self.advance();
                let columns = self.parse_name_list()?;
                table.unique_constraints.push(columns);
            }
            Some(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let columns = self.parse_name_list()?;
                let target = self.parse_references()?;
                table.foreign_keys.push(ForeignKey {
                    columns,
                    target,
                    span: Span::new(start.start, self.prev_end()),
                });
            }
            _ => {
                self.unexpected("a table constraint");
                return None;
            }
        }
        Some(())
    }

    // ---- named queries --------------------------------------------------

    /// Parses `label: sql…;`, scanning the body verbatim and
    /// classifying every placeholder.
    fn parse_named_query(&mut self) -> Option<NamedQuery> {
        let label_token = self.advance();
        let TokenKind::Identifier(label) = label_token.kind else {
            self.unexpected("a query label");
            self.resync();
            return None;
        };
        let colon = self.advance();

        let mut fragments: Vec<QueryFragment> = Vec::new();
        let mut literal_start = colon.span.end;

        // Placeholder classification state.
        let mut after_in = false;
        let mut in_order_by = false;
        let mut bool_context = false;
        let mut prev_was_order = false;

        loop {
            let token = self.current().clone();
            match &token.kind {
                TokenKind::Eof => {
                    self.unexpected("`;`");
                    break;
                }
                TokenKind::Semicolon => break,
                TokenKind::Positional { index } => {
                    let placeholder = if after_in {
                        Placeholder::InList { name: None }
                    } else {
                        Placeholder::Positional { index: *index }
                    };
                    push_literal(&mut fragments, self.source, literal_start, token.span.start);
                    fragments.push(QueryFragment::Placeholder(placeholder));
                    literal_start = token.span.end;
                    self.advance();
                }
                TokenKind::NamedVariable(name) => {
                    let placeholder = if after_in {
                        Placeholder::InList {
                            name: Some(name.clone()),
                        }
                    } else if in_order_by {
                        Placeholder::DynamicClause {
                            name: name.clone(),
                            kind: ClauseKind::OrderBy,
                        }
                    } else if bool_context && !self.next_starts_operator() {
                        Placeholder::DynamicClause {
                            name: name.clone(),
                            kind: ClauseKind::Predicate,
                        }
                    } else {
                        Placeholder::Value {
                            name: name.clone(),
                            expected: None,
                        }
                    };
                    push_literal(&mut fragments, self.source, literal_start, token.span.start);
                    fragments.push(QueryFragment::Placeholder(placeholder));
                    literal_start = token.span.end;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }

            // The arming keywords act on the very next token.
            after_in = token.is_keyword(Keyword::In);
            bool_context = matches!(
                token.as_keyword(),
                Some(Keyword::Where | Keyword::And | Keyword::Or)
            );
            if token.is_keyword(Keyword::By) && prev_was_order {
                in_order_by = true;
            } else if matches!(
                token.as_keyword(),
                Some(
                    Keyword::Where
                        | Keyword::Group
                        | Keyword::Having
                        | Keyword::Limit
                        | Keyword::Offset
                )
            ) {
                in_order_by = false;
            }
            prev_was_order = token.is_keyword(Keyword::Order);
        }

        push_literal(&mut fragments, self.source, literal_start, self.current().span.start);
        trim_edges(&mut fragments);

        let end = if matches!(self.current().kind, TokenKind::Semicolon) {
            self.advance().span.end
        } else {
            self.prev_end()
        };

        Some(NamedQuery {
            label,
            fragments,
            span: Span::new(label_token.span.start, end),
        })
    }

    /// Returns true when the token after the current one would turn a
    /// `$name` into an operand rather than a free-standing predicate.
    fn next_starts_operator(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Dot => true,
            TokenKind::Keyword(
                Keyword::Is | Keyword::In | Keyword::Like | Keyword::Between,
            ) => true,
            _ => false,
        }
    }
}

fn push_literal(fragments: &mut Vec<QueryFragment>, source: &str, start: usize, end: usize) {
    if end > start {
        fragments.push(QueryFragment::Sql(String::from(&source[start..end])));
    }
}

/// Trims the whitespace left of the label colon and right of the `;`
/// off the outermost literal fragments; everything between
/// placeholders stays verbatim.
fn trim_edges(fragments: &mut [QueryFragment]) {
    if let Some(QueryFragment::Sql(text)) = fragments.first_mut() {
        *text = String::from(text.trim_start());
    }
    if let Some(QueryFragment::Sql(text)) = fragments.last_mut() {
        *text = String::from(text.trim_end());
    }
}
