//! Compile-time typed expression wrappers.
//!
//! [`Expr`] carries its storage class as a runtime tag, which is what
//! the emitter needs. Generated code prefers a compile-time pairing of
//! the Rust value type with the storage class; [`TypedExpr`] adds that
//! as a zero-cost phantom wrapper, so mixing a text column with an
//! integer value fails to compile instead of erroring at construction.

use core::marker::PhantomData;

use chrono::{DateTime, Utc};

use super::{col, ComparisonOp, Expr, Precedence};
use crate::types::{SqlType, SqlValue, ToSqlValue};

/// Rust value types that map onto a storage class.
pub trait HasSqlType {
    /// The storage class values of this type are bound to.
    const SQL_TYPE: SqlType;
}

impl HasSqlType for i64 {
    const SQL_TYPE: SqlType = SqlType::Integer;
}

impl HasSqlType for f64 {
    const SQL_TYPE: SqlType = SqlType::Real;
}

impl HasSqlType for String {
    const SQL_TYPE: SqlType = SqlType::Text;
}

impl HasSqlType for Vec<u8> {
    const SQL_TYPE: SqlType = SqlType::Blob;
}

impl HasSqlType for bool {
    const SQL_TYPE: SqlType = SqlType::Boolean;
}

impl HasSqlType for DateTime<Utc> {
    const SQL_TYPE: SqlType = SqlType::DateTime;
}

/// An expression whose Rust-side value type is known statically.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr<T> {
    expr: Expr,
    _marker: PhantomData<T>,
}

impl<T> TypedExpr<T> {
    const fn wrap(expr: Expr) -> Self {
        Self {
            expr,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped expression for emission.
    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.expr
    }

    /// Borrows the untyped expression.
    #[must_use]
    pub const fn as_expr(&self) -> &Expr {
        &self.expr
    }
}

impl<T: HasSqlType> TypedExpr<T> {
    /// An unqualified column of this type.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::wrap(col(name, T::SQL_TYPE))
    }

    /// A table-qualified column of this type.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::wrap(Expr::column(table, name, T::SQL_TYPE))
    }

    /// Re-tags an untyped expression. The caller asserts the pairing.
    #[must_use]
    pub fn from_expr(expr: Expr) -> Self {
        Self::wrap(expr.cast(T::SQL_TYPE))
    }

    /// `self IS NULL`.
    #[must_use]
    pub fn is_null(self) -> TypedExpr<bool> {
        TypedExpr::wrap(self.expr.is_null())
    }

    /// `self IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(self) -> TypedExpr<bool> {
        TypedExpr::wrap(self.expr.is_not_null())
    }
}

impl<T: HasSqlType + ToSqlValue> TypedExpr<T> {
    /// A bound value of this type.
    #[must_use]
    pub fn value(value: T) -> Self {
        Self::wrap(Expr::Variable {
            value: value.to_sql_value(),
            ty: T::SQL_TYPE,
        })
    }

    /// `self = value`. The pairing is proven by the type parameter, so
    /// no mismatch is possible.
    #[must_use]
    pub fn eq(self, value: T) -> TypedExpr<bool> {
        self.compare(ComparisonOp::Eq, value)
    }

    /// `self < value`.
    #[must_use]
    pub fn lt(self, value: T) -> TypedExpr<bool> {
        self.compare(ComparisonOp::Lt, value)
    }

    /// `self <= value`.
    #[must_use]
    pub fn le(self, value: T) -> TypedExpr<bool> {
        self.compare(ComparisonOp::LtEq, value)
    }

    /// `self >= value`.
    #[must_use]
    pub fn ge(self, value: T) -> TypedExpr<bool> {
        self.compare(ComparisonOp::GtEq, value)
    }

    /// `self > value`.
    #[must_use]
    pub fn gt(self, value: T) -> TypedExpr<bool> {
        self.compare(ComparisonOp::Gt, value)
    }

    /// `self IN (…)`.
    #[must_use]
    pub fn is_in(self, values: Vec<T>) -> TypedExpr<bool> {
        self.in_impl(values, false)
    }

    /// `self NOT IN (…)`.
    #[must_use]
    pub fn is_not_in(self, values: Vec<T>) -> TypedExpr<bool> {
        self.in_impl(values, true)
    }

    fn compare(self, op: ComparisonOp, value: T) -> TypedExpr<bool> {
        // Both sides share T::SQL_TYPE by construction.
        TypedExpr::wrap(Expr::Comparison {
            left: Box::new(self.expr),
            op,
            right: Box::new(Expr::Variable {
                value: value.to_sql_value(),
                ty: T::SQL_TYPE,
            }),
        })
    }

    fn in_impl(self, values: Vec<T>, negated: bool) -> TypedExpr<bool> {
        let values: Vec<SqlValue> =
            values.into_iter().map(ToSqlValue::to_sql_value).collect();
        TypedExpr::wrap(Expr::In {
            inner: Box::new(self.expr),
            values,
            negated,
        })
    }
}

impl TypedExpr<bool> {
    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::wrap(self.expr.and(other.expr))
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::wrap(self.expr.or(other.expr))
    }

    /// `NOT self`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::wrap(self.expr.not())
    }
}

impl TypedExpr<String> {
    /// `self || other`.
    #[must_use]
    pub fn concat(self, other: Self) -> Self {
        Self::wrap(self.expr.concat(other.expr))
    }

    /// `self LIKE pattern`; infallible on a text expression.
    #[must_use]
    pub fn like(self, pattern: impl Into<String>) -> TypedExpr<bool> {
        TypedExpr::wrap(Expr::infix(
            self.expr,
            "LIKE",
            Expr::variable(pattern.into(), SqlType::Text),
            Precedence::ComparisonEq,
            SqlType::Boolean,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::render;

    #[test]
    fn test_typed_equality() {
        let expr = TypedExpr::<String>::qualified_column("config", "config_key").eq(String::from("k"));
        let (sql, params) = render(expr.as_expr());
        assert_eq!(sql, "config.config_key = ?");
        assert_eq!(params[0].ty, SqlType::Text);
    }

    #[test]
    fn test_typed_in_and_logic() {
        let expr = TypedExpr::<i64>::column("id")
            .is_in(vec![1, 2])
            .and(TypedExpr::<bool>::column("active").eq(true));
        let (sql, params) = render(expr.as_expr());
        assert_eq!(sql, "id IN (?, ?) AND active = ?");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_typed_column_types() {
        assert_eq!(
            TypedExpr::<DateTime<Utc>>::column("created_at")
                .as_expr()
                .sql_type(),
            SqlType::DateTime
        );
        assert_eq!(
            TypedExpr::<Vec<u8>>::column("payload").as_expr().sql_type(),
            SqlType::Blob
        );
    }
}
