//! Diagnostics produced by parsing and schema checking.
//!
//! Malformed input never raises: every pass collects [`Diagnostic`]s
//! and keeps going, so one run reports as many problems as possible.
//! A consumer treats [`Severity::CriticalError`] as fatal for code
//! generation but still gets the partial model for tooling.

use serde::{Deserialize, Serialize};

use crate::lexer::{LexError, LexErrorKind, Span};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Suspicious but usable.
    Warning,
    /// Wrong, but the surrounding item could still be understood.
    Error,
    /// The model is unusable for code generation.
    CriticalError,
}

/// The kind of problem found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// The tokenizer met a byte outside any rule.
    UnexpectedCharacter,
    /// EOF inside a string or binary string literal.
    UnterminatedString,
    /// The numeric-literal grammar was violated.
    ExpectedDigit,
    /// The parser required a specific token and saw another.
    UnexpectedToken,
    /// Two tables share a name (case-insensitive).
    DuplicateTable,
    /// Two columns of one table share a name.
    DuplicateColumn,
    /// A foreign key or mapping refers to an unknown target.
    UnresolvedReference,
    /// A `$name` in a position with no defined interpretation.
    InvalidPlaceholder,
    /// `WITHOUT ROWID` on a table without a primary key.
    MissingPrimaryKey,
}

/// A problem with its location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{message} at {span}")]
pub struct Diagnostic {
    /// The kind of problem.
    pub kind: DiagnosticKind,
    /// How bad it is.
    pub severity: Severity,
    /// Where in the source.
    pub span: Span,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic with [`Severity::Error`].
    #[must_use]
    pub fn error(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            span,
            message: message.into(),
        }
    }

    /// Creates a diagnostic with [`Severity::CriticalError`].
    #[must_use]
    pub fn critical(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::CriticalError,
            span,
            message: message.into(),
        }
    }

    /// Returns true if this diagnostic is fatal for code generation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::CriticalError
    }
}

impl From<LexError> for Diagnostic {
    fn from(error: LexError) -> Self {
        let kind = match error.kind {
            LexErrorKind::UnexpectedCharacter(_) => DiagnosticKind::UnexpectedCharacter,
            LexErrorKind::UnterminatedString => DiagnosticKind::UnterminatedString,
            LexErrorKind::ExpectedDigit => DiagnosticKind::ExpectedDigit,
        };
        Self::error(kind, error.span, error.kind.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::CriticalError);
    }

    #[test]
    fn test_lex_error_conversion() {
        let lex = LexError {
            kind: LexErrorKind::UnterminatedString,
            span: Span::new(3, 8),
        };
        let diagnostic = Diagnostic::from(lex);
        assert_eq!(diagnostic.kind, DiagnosticKind::UnterminatedString);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.span, Span::new(3, 8));
    }

    #[test]
    fn test_is_fatal() {
        let span = Span::new(0, 1);
        assert!(Diagnostic::critical(DiagnosticKind::DuplicateTable, span, "dup").is_fatal());
        assert!(!Diagnostic::error(DiagnosticKind::InvalidPlaceholder, span, "bad").is_fatal());
    }
}
