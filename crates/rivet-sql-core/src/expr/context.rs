//! The accumulator threaded through SQL generation.

use crate::dialect::{Dialect, SqliteDialect};
use crate::types::{BoundValue, DefaultValueSerializer, SqlType, SqlValue, ValueSerializer};

/// Collects the SQL text and the ordered bound parameters of one
/// render.
///
/// Created per render and consumed by [`finalize`](Self::finalize).
/// Parameters are appended in emission order, so the `?` placeholders
/// in the finished SQL correspond positionally to the parameter
/// vector.
pub struct GenerationContext {
    buffer: String,
    params: Vec<BoundValue>,
    dialect: Box<dyn Dialect>,
    serializer: Box<dyn ValueSerializer>,
}

impl GenerationContext {
    /// Creates a context for the default SQLite-flavored dialect.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            params: Vec::new(),
            dialect: Box::new(SqliteDialect::new()),
            serializer: Box::new(DefaultValueSerializer),
        }
    }

    /// Replaces the dialect used for identifier quoting.
    #[must_use]
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Box::new(dialect);
        self
    }

    /// Replaces the codec applied to introduced values.
    #[must_use]
    pub fn with_serializer(mut self, serializer: impl ValueSerializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    /// Appends text to the output buffer.
    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Appends a single space unless the buffer already ends in one
    /// (or in an opening parenthesis, or is empty).
    pub fn write_whitespace_if_needed(&mut self) {
        match self.buffer.chars().last() {
            None | Some(' ' | '\n' | '(') => {}
            Some(_) => self.buffer.push(' '),
        }
    }

    /// Registers a bound value and returns its zero-based slot index.
    ///
    /// The value passes through the context's [`ValueSerializer`]
    /// before it is stored.
    pub fn introduce_variable(&mut self, value: SqlValue, ty: SqlType) -> usize {
        let value = self.serializer.map_to_bound(value, ty);
        self.params.push(BoundValue { value, ty });
        self.params.len() - 1
    }

    /// Quotes an identifier according to the dialect.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    /// Writes an identifier, quoting it when required.
    pub fn write_identifier(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.buffer.push_str(&quoted);
    }

    /// Returns the number of parameters introduced so far.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Consumes the context, returning the SQL text and the bound
    /// parameters in placeholder order.
    #[must_use]
    pub fn finalize(self) -> (String, Vec<BoundValue>) {
        (self.buffer, self.params)
    }
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::new()
    }
}
