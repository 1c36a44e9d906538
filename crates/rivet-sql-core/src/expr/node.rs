//! The typed SQL expression tree.
//!
//! Expressions are immutable. Checked constructors reject operand
//! combinations whose storage classes cannot be combined; everything
//! past construction is infallible, including emission.

use super::Precedence;
use crate::types::{BoundValue, SqlType, SqlValue, ToSqlValue};

/// Error raised when an expression cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// The operand storage classes are incompatible.
    #[error("type mismatch: cannot combine {left:?} with {right:?}")]
    TypeMismatch {
        /// Storage class of the left operand.
        left: SqlType,
        /// Storage class of the right operand.
        right: SqlType,
    },
}

/// Comparison operators producing a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `=`
    Eq,
    /// `>=`
    GtEq,
    /// `>`
    Gt,
}

impl ComparisonOp {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Eq => "=",
            Self::GtEq => ">=",
            Self::Gt => ">",
        }
    }

    /// Returns the operator's precedence rank.
    #[must_use]
    pub const fn precedence(self) -> Precedence {
        match self {
            Self::Eq => Precedence::ComparisonEq,
            Self::Lt | Self::LtEq | Self::GtEq | Self::Gt => Precedence::ComparisonRel,
        }
    }
}

/// An SQL expression carrying the storage class of its result.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A value bound through a parameter slot, rendered as `?`.
    Variable {
        /// The value to bind.
        value: SqlValue,
        /// The storage class of the slot.
        ty: SqlType,
    },

    /// An inline literal, written into the SQL text verbatim.
    Literal {
        /// The literal SQL text.
        sql: String,
        /// The storage class of the literal.
        ty: SqlType,
    },

    /// A column reference, optionally qualified with its table.
    Column {
        /// Table name or alias.
        table: Option<String>,
        /// Column name.
        name: String,
        /// The column's storage class.
        ty: SqlType,
    },

    /// A function call, `name(arg, …)`.
    Function {
        /// The function name.
        name: String,
        /// The arguments.
        args: Vec<Expr>,
        /// The storage class of the result.
        ty: SqlType,
    },

    /// A binary operator between two sub-expressions.
    Infix {
        /// Left operand.
        left: Box<Expr>,
        /// Operator spelling, e.g. `AND` or `||`.
        op: String,
        /// Right operand.
        right: Box<Expr>,
        /// The operator's precedence rank.
        precedence: Precedence,
        /// The storage class of the result.
        ty: SqlType,
    },

    /// A comparison producing a boolean.
    Comparison {
        /// Left operand.
        left: Box<Expr>,
        /// The operator.
        op: ComparisonOp,
        /// Right operand.
        right: Box<Expr>,
    },

    /// Arithmetic negation, `-inner`.
    UnaryMinus {
        /// The negated expression.
        inner: Box<Expr>,
    },

    /// Boolean negation, `NOT inner`.
    Not {
        /// The negated expression.
        inner: Box<Expr>,
    },

    /// `inner IS [NOT] NULL`.
    IsNull {
        /// The tested expression.
        inner: Box<Expr>,
        /// True for `IS NOT NULL`.
        negated: bool,
    },

    /// `inner [NOT] IN (…)`; every element is bound as a parameter.
    In {
        /// The tested expression.
        inner: Box<Expr>,
        /// The values of the list.
        values: Vec<SqlValue>,
        /// True for `NOT IN`.
        negated: bool,
    },

    /// Changes the storage-class tag without touching the generated
    /// SQL. No `CAST` is emitted.
    Cast {
        /// The wrapped expression.
        inner: Box<Expr>,
        /// The new storage class.
        ty: SqlType,
    },

    /// An opaque SQL fragment supplied by the caller.
    Custom {
        /// The raw SQL text.
        sql: String,
        /// Parameters referenced by `?` slots inside the text.
        params: Vec<BoundValue>,
        /// The storage class of the result.
        ty: SqlType,
    },
}

/// Creates an unqualified column reference.
#[must_use]
pub fn col(name: impl Into<String>, ty: SqlType) -> Expr {
    Expr::Column {
        table: None,
        name: name.into(),
        ty,
    }
}

impl Expr {
    /// Creates a bound variable expression.
    #[must_use]
    pub fn variable(value: impl ToSqlValue, ty: SqlType) -> Self {
        Self::Variable {
            value: value.to_sql_value(),
            ty,
        }
    }

    /// Creates an inline literal expression.
    #[must_use]
    pub fn literal(sql: impl Into<String>, ty: SqlType) -> Self {
        Self::Literal {
            sql: sql.into(),
            ty,
        }
    }

    /// Creates a qualified column reference.
    #[must_use]
    pub fn column(table: impl Into<String>, name: impl Into<String>, ty: SqlType) -> Self {
        Self::Column {
            table: Some(table.into()),
            name: name.into(),
            ty,
        }
    }

    /// Creates a function-call expression.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<Expr>, ty: SqlType) -> Self {
        Self::Function {
            name: name.into(),
            args,
            ty,
        }
    }

    /// Creates a raw infix expression with an explicit precedence.
    #[must_use]
    pub fn infix(left: Self, op: impl Into<String>, right: Self, precedence: Precedence, ty: SqlType) -> Self {
        Self::Infix {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
            precedence,
            ty,
        }
    }

    /// Creates a comparison between two expressions.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] unless both sides share a
    /// storage class or one of them is a NULL literal.
    pub fn compare(left: Self, op: ComparisonOp, right: Self) -> Result<Self, ExprError> {
        let (lt, rt) = (left.sql_type(), right.sql_type());
        if lt != rt && !left.is_null_value() && !right.is_null_value() {
            return Err(ExprError::TypeMismatch { left: lt, right: rt });
        }
        Ok(Self::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// Creates an `IN` expression over a list of values.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] if any value does not fit
    /// the storage class of `inner`.
    pub fn in_list(
        inner: Self,
        values: Vec<SqlValue>,
        negated: bool,
    ) -> Result<Self, ExprError> {
        let ty = inner.sql_type();
        for value in &values {
            if !value.matches(ty) {
                return Err(ExprError::TypeMismatch {
                    left: ty,
                    right: value.default_type().unwrap_or(ty),
                });
            }
        }
        Ok(Self::In {
            inner: Box::new(inner),
            values,
            negated,
        })
    }

    /// Creates an opaque expression from caller-supplied SQL.
    #[must_use]
    pub fn custom(sql: impl Into<String>, params: Vec<BoundValue>, ty: SqlType) -> Self {
        Self::Custom {
            sql: sql.into(),
            params,
            ty,
        }
    }

    /// Re-tags the expression with a new storage class. The generated
    /// SQL is unchanged.
    #[must_use]
    pub fn cast(self, ty: SqlType) -> Self {
        Self::Cast {
            inner: Box::new(self),
            ty,
        }
    }

    /// Returns the storage class of the expression's result.
    #[must_use]
    pub fn sql_type(&self) -> SqlType {
        match self {
            Self::Variable { ty, .. }
            | Self::Literal { ty, .. }
            | Self::Column { ty, .. }
            | Self::Function { ty, .. }
            | Self::Infix { ty, .. }
            | Self::Cast { ty, .. }
            | Self::Custom { ty, .. } => *ty,
            Self::Comparison { .. } | Self::Not { .. } | Self::IsNull { .. } | Self::In { .. } => {
                SqlType::Boolean
            }
            Self::UnaryMinus { inner } => inner.sql_type(),
        }
    }

    /// Returns the expression's precedence rank.
    #[must_use]
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Variable { .. }
            | Self::Literal { .. }
            | Self::Column { .. }
            | Self::Function { .. } => Precedence::Primary,
            Self::Infix { precedence, .. } => *precedence,
            Self::Comparison { op, .. } => op.precedence(),
            Self::UnaryMinus { .. } | Self::Not { .. } => Precedence::Unary,
            Self::IsNull { .. } => Precedence::Postfix,
            Self::In { .. } => Precedence::ComparisonEq,
            Self::Cast { inner, .. } => inner.precedence(),
            Self::Custom { .. } => Precedence::Unknown,
        }
    }

    /// Returns true if the expression is a constant (a literal or a
    /// bound variable) rather than something computed per row.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Variable { .. } | Self::Literal { .. } => true,
            Self::Cast { inner, .. } => inner.is_literal(),
            _ => false,
        }
    }

    fn is_null_value(&self) -> bool {
        match self {
            Self::Variable {
                value: SqlValue::Null,
                ..
            } => true,
            Self::Literal { sql, .. } => sql.eq_ignore_ascii_case("NULL"),
            Self::Cast { inner, .. } => inner.is_null_value(),
            _ => false,
        }
    }

    /// Compares for equality against a bound value.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] if the value does not fit
    /// this expression's storage class.
    pub fn eq(self, value: impl ToSqlValue) -> Result<Self, ExprError> {
        self.compare_value(ComparisonOp::Eq, value)
    }

    /// `self < value`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] on an incompatible value.
    pub fn lt(self, value: impl ToSqlValue) -> Result<Self, ExprError> {
        self.compare_value(ComparisonOp::Lt, value)
    }

    /// `self <= value`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] on an incompatible value.
    pub fn le(self, value: impl ToSqlValue) -> Result<Self, ExprError> {
        self.compare_value(ComparisonOp::LtEq, value)
    }

    /// `self >= value`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] on an incompatible value.
    pub fn ge(self, value: impl ToSqlValue) -> Result<Self, ExprError> {
        self.compare_value(ComparisonOp::GtEq, value)
    }

    /// `self > value`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] on an incompatible value.
    pub fn gt(self, value: impl ToSqlValue) -> Result<Self, ExprError> {
        self.compare_value(ComparisonOp::Gt, value)
    }

    fn compare_value(self, op: ComparisonOp, value: impl ToSqlValue) -> Result<Self, ExprError> {
        let ty = self.sql_type();
        let value = value.to_sql_value();
        if !value.matches(ty) {
            return Err(ExprError::TypeMismatch {
                left: ty,
                right: value.default_type().unwrap_or(ty),
            });
        }
        Self::compare(self, op, Self::Variable { value, ty })
    }

    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::infix(self, "AND", other, Precedence::And, SqlType::Boolean)
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::infix(self, "OR", other, Precedence::Or, SqlType::Boolean)
    }

    /// `NOT self`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not {
            inner: Box::new(self),
        }
    }

    /// `-self`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn neg(self) -> Self {
        Self::UnaryMinus {
            inner: Box::new(self),
        }
    }

    /// `self IS NULL`.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            inner: Box::new(self),
            negated: false,
        }
    }

    /// `self IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            inner: Box::new(self),
            negated: true,
        }
    }

    /// `self IN (…)`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] on an incompatible element.
    pub fn is_in<T: ToSqlValue>(self, values: Vec<T>) -> Result<Self, ExprError> {
        let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        Self::in_list(self, values, false)
    }

    /// `self NOT IN (…)`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] on an incompatible element.
    pub fn is_not_in<T: ToSqlValue>(self, values: Vec<T>) -> Result<Self, ExprError> {
        let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        Self::in_list(self, values, true)
    }

    /// `self LIKE pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::TypeMismatch`] unless this is a text
    /// expression.
    pub fn like(self, pattern: impl Into<String>) -> Result<Self, ExprError> {
        let ty = self.sql_type();
        if ty != SqlType::Text {
            return Err(ExprError::TypeMismatch {
                left: ty,
                right: SqlType::Text,
            });
        }
        Ok(Self::infix(
            self,
            "LIKE",
            Self::variable(pattern.into(), SqlType::Text),
            Precedence::ComparisonEq,
            SqlType::Boolean,
        ))
    }

    /// `self || other`.
    #[must_use]
    pub fn concat(self, other: Self) -> Self {
        Self::infix(self, "||", other, Precedence::StringConcat, SqlType::Text)
    }

    /// `self + other`.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        let ty = self.sql_type();
        Self::infix(self, "+", other, Precedence::PlusMinus, ty)
    }

    /// `self - other`.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        let ty = self.sql_type();
        Self::infix(self, "-", other, Precedence::PlusMinus, ty)
    }

    /// `self * other`.
    #[must_use]
    pub fn mul(self, other: Self) -> Self {
        let ty = self.sql_type();
        Self::infix(self, "*", other, Precedence::MulDiv, ty)
    }

    /// `self / other`.
    #[must_use]
    pub fn div(self, other: Self) -> Self {
        let ty = self.sql_type();
        Self::infix(self, "/", other, Precedence::MulDiv, ty)
    }

    /// `COALESCE(self, other)`.
    #[must_use]
    pub fn coalesce(self, other: Self) -> Self {
        let ty = self.sql_type();
        Self::function("COALESCE", vec![self, other], ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_requires_matching_types() {
        let key = col("config_key", SqlType::Text);
        assert!(key.clone().eq("k").is_ok());
        assert_eq!(
            key.eq(5_i64),
            Err(ExprError::TypeMismatch {
                left: SqlType::Text,
                right: SqlType::Integer,
            })
        );
    }

    #[test]
    fn test_comparison_accepts_null_side() {
        let age = col("age", SqlType::Integer);
        assert!(age.eq(SqlValue::Null).is_ok());
    }

    #[test]
    fn test_compare_two_columns() {
        let a = col("a", SqlType::Integer);
        let b = col("b", SqlType::Integer);
        let cmp = Expr::compare(a.clone(), ComparisonOp::Lt, b).unwrap();
        assert_eq!(cmp.sql_type(), SqlType::Boolean);
        assert_eq!(cmp.precedence(), Precedence::ComparisonRel);

        let text = col("t", SqlType::Text);
        assert!(Expr::compare(a, ComparisonOp::Eq, text).is_err());
    }

    #[test]
    fn test_in_list_checks_elements() {
        let id = col("id", SqlType::Integer);
        assert!(id.clone().is_in(vec![1_i64, 2, 3]).is_ok());
        assert!(id.is_in(vec!["a"]).is_err());
    }

    #[test]
    fn test_result_types() {
        let flag = col("flag", SqlType::Boolean);
        assert_eq!(flag.clone().not().sql_type(), SqlType::Boolean);
        assert_eq!(flag.is_null().sql_type(), SqlType::Boolean);
        let n = col("n", SqlType::Integer);
        assert_eq!(n.clone().neg().sql_type(), SqlType::Integer);
        assert_eq!(n.add(Expr::variable(1_i64, SqlType::Integer)).sql_type(), SqlType::Integer);
    }

    #[test]
    fn test_cast_is_transparent() {
        let n = col("n", SqlType::Integer).cast(SqlType::Boolean);
        assert_eq!(n.sql_type(), SqlType::Boolean);
        assert_eq!(n.precedence(), Precedence::Primary);
        assert!(!n.is_literal());
        assert!(Expr::variable(1_i64, SqlType::Integer)
            .cast(SqlType::Boolean)
            .is_literal());
    }

    #[test]
    fn test_custom_has_unknown_precedence() {
        let custom = Expr::custom("random() > 0.5", vec![], SqlType::Boolean);
        assert_eq!(custom.precedence(), Precedence::Unknown);
    }

    #[test]
    fn test_like_requires_text() {
        assert!(col("name", SqlType::Text).like("a%").is_ok());
        assert!(col("id", SqlType::Integer).like("a%").is_err());
    }
}
