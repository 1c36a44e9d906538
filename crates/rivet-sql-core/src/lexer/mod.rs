//! SQL tokenizer for the rivet dialect.
//!
//! A hand-written scanner producing a token stream with byte spans.
//! Beyond plain SQL it knows the dialect markers: `$name`-style
//! variables, `?`/`?N` positionals, and the colon that attaches a
//! label to a statement.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::{tokenize, LexError, LexErrorKind, Tokenizer};
