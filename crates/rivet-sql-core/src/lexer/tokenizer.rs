//! SQL tokenizer for the rivet dialect.
//!
//! A single-pass scanner over UTF-8 source. Malformed input never
//! aborts the scan: problems are collected as [`LexError`]s and the
//! scanner keeps going, so one run reports as many issues as possible.
//! The token stream always ends with [`TokenKind::Eof`].

use super::{Keyword, Span, Token, TokenKind};

/// The kind of tokenizer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    /// A byte outside any tokenizer rule.
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),
    /// EOF inside `'…'`, `x'…'` or `"…"`.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// The numeric-literal grammar was violated.
    #[error("expected a digit")]
    ExpectedDigit,
}

/// A tokenizer error with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct LexError {
    /// What went wrong.
    pub kind: LexErrorKind,
    /// Where in the source.
    pub span: Span,
}

/// Tokenizes the entire input.
///
/// Returns every token (ending with `Eof`) together with the errors
/// encountered along the way.
#[must_use]
pub fn tokenize(input: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut tokenizer = Tokenizer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let is_eof = token.is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    (tokens, tokenizer.into_errors())
}

/// A tokenizer over SQL input in the rivet dialect.
pub struct Tokenizer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
    /// Errors collected so far.
    errors: Vec<LexError>,
    /// End offset of the previous token when it was an identifier.
    /// A `:` starting exactly there is a plain colon (statement label
    /// position), not a `:name` variable.
    last_identifier_end: Option<usize>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a new tokenizer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            errors: Vec::new(),
            last_identifier_end: None,
        }
    }

    /// Consumes the tokenizer, returning the collected errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the character after the current one without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes the current character if it equals `expected`.
    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn record_error(&mut self, kind: LexErrorKind) {
        self.errors.push(LexError {
            kind,
            span: self.make_span(),
        });
    }

    /// Skips whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self
                .peek()
                .is_some_and(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
            {
                self.advance();
            }

            // Line comments: -- to end of line.
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                self.advance();
                self.advance();
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // Block comments: /* ... */, non-nesting like SQLite.
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    /// Creates a span from start to current position.
    const fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Creates a token with the current span.
    const fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        let token = self.scan_token();
        self.last_identifier_end = match token.kind {
            TokenKind::Identifier(_) => Some(token.span.end),
            _ => None,
        };
        token
    }

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_whitespace_and_comments();
            self.start = self.pos;

            let Some(c) = self.peek() else {
                return self.make_token(TokenKind::Eof);
            };

            match c {
                '(' => return self.single(TokenKind::LeftParen),
                ')' => return self.single(TokenKind::RightParen),
                ',' => return self.single(TokenKind::Comma),
                '+' => return self.single(TokenKind::Plus),
                '-' => return self.single(TokenKind::Minus),
                '*' => return self.single(TokenKind::Star),
                '/' => return self.single(TokenKind::Slash),
                ';' => return self.single(TokenKind::Semicolon),
                '=' => return self.single(TokenKind::Eq),
                '<' => {
                    self.advance();
                    let kind = if self.matches('=') {
                        TokenKind::LtEq
                    } else if self.matches('>') {
                        TokenKind::NotEq
                    } else {
                        TokenKind::Lt
                    };
                    return self.make_token(kind);
                }
                '>' => {
                    self.advance();
                    let kind = if self.matches('=') {
                        TokenKind::GtEq
                    } else {
                        TokenKind::Gt
                    };
                    return self.make_token(kind);
                }
                '!' => {
                    self.advance();
                    if self.matches('=') {
                        return self.make_token(TokenKind::NotEq);
                    }
                    self.record_error(LexErrorKind::UnexpectedCharacter('!'));
                }
                '.' => {
                    if self.peek_next().is_some_and(|n| n.is_ascii_digit()) {
                        return self.scan_number();
                    }
                    return self.single(TokenKind::Dot);
                }
                '\'' => return self.scan_string(false),
                'x' | 'X' if self.peek_next() == Some('\'') => {
                    self.advance();
                    return self.scan_string(true);
                }
                '"' => return self.scan_quoted_identifier(),
                '?' => return self.scan_positional(),
                '$' | '@' => {
                    self.advance();
                    if self.peek().is_some_and(is_identifier_start) {
                        return self.scan_named_variable();
                    }
                    self.record_error(LexErrorKind::UnexpectedCharacter(c));
                }
                ':' => {
                    let colon_pos = self.pos;
                    self.advance();
                    // A colon glued to the preceding identifier belongs
                    // to a statement label; the parser classifies it.
                    if self.last_identifier_end == Some(colon_pos) {
                        return self.make_token(TokenKind::Colon);
                    }
                    if self.peek().is_some_and(is_identifier_start) {
                        return self.scan_named_variable();
                    }
                    return self.make_token(TokenKind::Colon);
                }
                _ if c.is_ascii_digit() => return self.scan_number(),
                _ if is_identifier_start(c) => return self.scan_identifier(),
                _ => {
                    self.advance();
                    self.record_error(LexErrorKind::UnexpectedCharacter(c));
                }
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        self.advance();
        self.make_token(kind)
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(is_identifier_continue) {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Identifier(String::from(text)))
        }
    }

    /// Scans a `"…"` identifier; a doubled `""` is a literal quote.
    fn scan_quoted_identifier(&mut self) -> Token {
        self.advance();
        let mut value = String::new();

        loop {
            match self.peek() {
                Some('"') => {
                    if self.peek_next() == Some('"') {
                        value.push('"');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    self.record_error(LexErrorKind::UnterminatedString);
                    break;
                }
            }
        }

        self.make_token(TokenKind::Identifier(value))
    }

    /// Scans a `'…'` string or `x'…'` binary string; a doubled `''`
    /// is a literal quote. On EOF the text read so far still becomes
    /// a token.
    fn scan_string(&mut self, binary: bool) -> Token {
        self.advance();
        let mut value = String::new();

        loop {
            match self.peek() {
                Some('\'') => {
                    if self.peek_next() == Some('\'') {
                        value.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    self.record_error(LexErrorKind::UnterminatedString);
                    break;
                }
            }
        }

        self.make_token(TokenKind::StringLiteral { value, binary })
    }

    /// Scans a numeric literal following SQLite's grammar.
    fn scan_number(&mut self) -> Token {
        // Hex: 0x followed by one or more hex digits.
        if self.peek() == Some('0')
            && matches!(self.peek_next(), Some('x' | 'X'))
        {
            self.advance();
            self.advance();
            let mut any = false;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
                any = true;
            }
            if !any {
                self.record_error(LexErrorKind::ExpectedDigit);
            }
            return self.make_number();
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // Optional fraction. The caller guarantees that a leading dot
        // has a digit after it, so consuming here is always part of the
        // literal.
        if self.peek() == Some('.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Optional exponent: (e|E)(+|-)? digits.
        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            let mut any = false;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                any = true;
            }
            if !any {
                self.record_error(LexErrorKind::ExpectedDigit);
            }
        }

        self.make_number()
    }

    fn make_number(&self) -> Token {
        let lexeme = String::from(&self.input[self.start..self.pos]);
        self.make_token(TokenKind::Number { lexeme })
    }

    /// Scans `?` with an optional explicit index (`?3`).
    fn scan_positional(&mut self) -> Token {
        self.advance();
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let index = if self.pos > digits_start {
            self.input[digits_start..self.pos].parse().ok()
        } else {
            None
        };
        self.make_token(TokenKind::Positional { index })
    }

    /// Scans the name after a `$`, `:` or `@` sigil.
    fn scan_named_variable(&mut self) -> Token {
        let name_start = self.pos;
        while self.peek().is_some_and(is_identifier_continue) {
            self.advance();
        }
        let name = String::from(&self.input[name_start..self.pos]);
        self.make_token(TokenKind::NamedVariable(name))
    }
}

/// Letters, `_` and anything outside ASCII start an identifier.
const fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

const fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let (tokens, errors) = tokenize(input);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    fn kinds_with_errors(input: &str) -> (Vec<TokenKind>, Vec<LexError>) {
        let (tokens, errors) = tokenize(input);
        (tokens.into_iter().map(|t| t.kind).collect(), errors)
    }

    fn number(lexeme: &str) -> TokenKind {
        TokenKind::Number {
            lexeme: String::from(lexeme),
        }
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(String::from(name))
    }

    #[test]
    fn test_empty_input() {
        let (tokens, errors) = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
        assert_eq!(tokens[0].span, Span::new(0, 0));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_eof_span_at_input_length() {
        let (tokens, _) = tokenize("SELECT");
        let eof = tokens.last().unwrap();
        assert!(eof.is_eof());
        assert_eq!(eof.span, Span::new(6, 6));
    }

    #[test]
    fn test_whitespace_and_comments() {
        assert_eq!(
            kinds("SELECT -- trailing comment\nFROM"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("SELECT /* block */ FROM"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_block_comments_do_not_nest() {
        // The first */ closes the comment; the rest is tokenized.
        assert_eq!(
            kinds("/* a /* b */ c */"),
            vec![ident("c"), TokenKind::Star, TokenKind::Slash, TokenKind::Eof]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("select FROM wHeRe"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("foo bar_baz _qux änderung"),
            vec![
                ident("foo"),
                ident("bar_baz"),
                ident("_qux"),
                ident("änderung"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_identifier_with_doubled_quote() {
        assert_eq!(kinds("\"a\"\"b\""), vec![ident("a\"b"), TokenKind::Eof]);
    }

    #[test]
    fn test_quoted_identifier_keyword_stays_identifier() {
        assert_eq!(kinds("\"order\""), vec![ident("order"), TokenKind::Eof]);
    }

    #[test]
    fn test_string_with_doubled_quote() {
        assert_eq!(
            kinds("'it''s'"),
            vec![
                TokenKind::StringLiteral {
                    value: String::from("it's"),
                    binary: false,
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_round_trip() {
        let (tokens, _) = tokenize("'it''s'");
        let TokenKind::StringLiteral { value, .. } = &tokens[0].kind else {
            panic!("expected string literal");
        };
        // Re-quote and re-tokenize: same token.
        let requoted = format!("'{}'", value.replace('\'', "''"));
        let (tokens2, errors2) = tokenize(&requoted);
        assert!(errors2.is_empty());
        assert_eq!(tokens2[0].kind, tokens[0].kind);
    }

    #[test]
    fn test_binary_string() {
        assert_eq!(
            kinds("x'48454C'"),
            vec![
                TokenKind::StringLiteral {
                    value: String::from("48454C"),
                    binary: true,
                },
                TokenKind::Eof,
            ]
        );
        // Upper-case marker works too.
        assert_eq!(
            kinds("X'00'"),
            vec![
                TokenKind::StringLiteral {
                    value: String::from("00"),
                    binary: true,
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_x_without_quote_is_identifier() {
        assert_eq!(kinds("x1"), vec![ident("x1"), TokenKind::Eof]);
    }

    #[test]
    fn test_unterminated_string_still_emits_token() {
        let (kinds, errors) = kinds_with_errors("'oops");
        assert_eq!(
            kinds,
            vec![
                TokenKind::StringLiteral {
                    value: String::from("oops"),
                    binary: false,
                },
                TokenKind::Eof,
            ]
        );
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("0x1F 12.5e+3 .25"),
            vec![
                number("0x1F"),
                number("12.5e+3"),
                number(".25"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_leading_dot_scientific() {
        assert_eq!(kinds(".5e-3"), vec![number(".5e-3"), TokenKind::Eof]);
    }

    #[test]
    fn test_trailing_dot_number() {
        assert_eq!(kinds("12."), vec![number("12."), TokenKind::Eof]);
    }

    #[test]
    fn test_dot_alone_is_punctuation() {
        assert_eq!(
            kinds("t.col"),
            vec![ident("t"), TokenKind::Dot, ident("col"), TokenKind::Eof]
        );
    }

    #[test]
    fn test_hex_without_digits() {
        let (kinds, errors) = kinds_with_errors("0x");
        assert_eq!(kinds, vec![number("0x"), TokenKind::Eof]);
        assert_eq!(errors[0].kind, LexErrorKind::ExpectedDigit);
    }

    #[test]
    fn test_exponent_without_digits() {
        let (kinds, errors) = kinds_with_errors("1e");
        assert_eq!(kinds, vec![number("1e"), TokenKind::Eof]);
        assert_eq!(errors[0].kind, LexErrorKind::ExpectedDigit);
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("( ) , . + - * / < <= > >= = != <> ;"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            kinds("? ?3 $name :name @name"),
            vec![
                TokenKind::Positional { index: None },
                TokenKind::Positional { index: Some(3) },
                TokenKind::NamedVariable(String::from("name")),
                TokenKind::NamedVariable(String::from("name")),
                TokenKind::NamedVariable(String::from("name")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_label_colon_after_identifier() {
        // Glued to the preceding identifier: label position, plain colon.
        assert_eq!(
            kinds("readAll: SELECT"),
            vec![
                ident("readAll"),
                TokenKind::Colon,
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Eof,
            ]
        );
        // Even with no space before the statement.
        assert_eq!(
            kinds("readAll:SELECT"),
            vec![
                ident("readAll"),
                TokenKind::Colon,
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Eof,
            ]
        );
        // Detached colon followed by a name is a variable.
        assert_eq!(
            kinds("x = :name"),
            vec![
                ident("x"),
                TokenKind::Eq,
                TokenKind::NamedVariable(String::from("name")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bang_alone_is_error() {
        let (kinds, errors) = kinds_with_errors("a ! b");
        assert_eq!(kinds, vec![ident("a"), ident("b"), TokenKind::Eof]);
        assert_eq!(errors[0].kind, LexErrorKind::UnexpectedCharacter('!'));
    }

    #[test]
    fn test_totality_on_garbage() {
        // Scanning never panics and always ends with Eof.
        let (tokens, errors) = tokenize("# ~ ^ { } 'open");
        assert!(tokens.last().unwrap().is_eof());
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_span_tracking() {
        let (tokens, _) = tokenize("SELECT id");
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(7, 9));
        assert_eq!(tokens[0].span.lexeme("SELECT id"), "SELECT");
    }
}
