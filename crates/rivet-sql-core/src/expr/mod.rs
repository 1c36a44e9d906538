//! Typed expression tree and SQL generation.
//!
//! Expressions carry the storage class of their result and an
//! intrinsic precedence rank. Rendering walks the tree through a
//! [`GenerationContext`], parenthesizing sub-expressions only when
//! precedence demands it and collecting bound parameters in
//! placeholder order.

mod context;
mod emit;
mod node;
mod precedence;
mod typed;

pub use context::GenerationContext;
pub use emit::{emit, render, render_with};
pub use node::{col, ComparisonOp, Expr, ExprError};
pub use precedence::Precedence;
pub use typed::{HasSqlType, TypedExpr};
