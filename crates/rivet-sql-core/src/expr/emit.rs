//! Precedence-aware SQL emission.
//!
//! A single `match` walks the expression tree. Sub-expressions are
//! parenthesized exactly when their precedence rank is strictly lower
//! than the enclosing expression's.

use super::{Expr, GenerationContext, Precedence};
use crate::types::BoundValue;

/// Renders an expression with a fresh default context.
#[must_use]
pub fn render(expr: &Expr) -> (String, Vec<BoundValue>) {
    render_with(expr, GenerationContext::new())
}

/// Renders an expression into the given context and finalizes it.
///
/// The returned SQL contains exactly one `?` per entry of the
/// parameter vector, in order.
#[must_use]
pub fn render_with(expr: &Expr, mut ctx: GenerationContext) -> (String, Vec<BoundValue>) {
    emit(&mut ctx, expr, Precedence::Unknown);
    let (sql, params) = ctx.finalize();
    tracing::trace!(sql = %sql, params = params.len(), "rendered expression");
    (sql, params)
}

/// Writes `expr` into the context, parenthesizing it if its
/// precedence is strictly lower than `outer`.
pub fn emit(ctx: &mut GenerationContext, expr: &Expr, outer: Precedence) {
    if expr.precedence() < outer {
        ctx.write("(");
        write_into(ctx, expr);
        ctx.write(")");
    } else {
        write_into(ctx, expr);
    }
}

fn write_into(ctx: &mut GenerationContext, expr: &Expr) {
    match expr {
        Expr::Variable { value, ty } => {
            let _slot = ctx.introduce_variable(value.clone(), *ty);
            ctx.write("?");
        }
        Expr::Literal { sql, .. } => ctx.write(sql),
        Expr::Column { table, name, .. } => {
            if let Some(table) = table {
                ctx.write_identifier(table);
                ctx.write(".");
            }
            ctx.write_identifier(name);
        }
        Expr::Function { name, args, .. } => {
            ctx.write(name);
            ctx.write("(");
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    ctx.write(", ");
                }
                // Commas separate arguments; they never need parens
                // beyond their own.
                emit(ctx, arg, Precedence::Unknown);
            }
            ctx.write(")");
        }
        Expr::Infix {
            left,
            op,
            right,
            precedence,
            ..
        } => {
            emit(ctx, left, *precedence);
            ctx.write(" ");
            ctx.write(op);
            ctx.write(" ");
            emit(ctx, right, *precedence);
        }
        Expr::Comparison { left, op, right } => {
            let precedence = op.precedence();
            emit(ctx, left, precedence);
            ctx.write(" ");
            ctx.write(op.as_str());
            ctx.write(" ");
            emit(ctx, right, precedence);
        }
        Expr::UnaryMinus { inner } => {
            ctx.write("-");
            emit(ctx, inner, Precedence::Unary);
        }
        Expr::Not { inner } => {
            ctx.write("NOT ");
            emit(ctx, inner, Precedence::Unary);
        }
        Expr::IsNull { inner, negated } => {
            emit(ctx, inner, Precedence::Postfix);
            ctx.write(if *negated { " IS NOT NULL" } else { " IS NULL" });
        }
        Expr::In {
            inner,
            values,
            negated,
        } => {
            emit(ctx, inner, expr.precedence());
            ctx.write(if *negated { " NOT IN (" } else { " IN (" });
            if values.is_empty() {
                // IN () is not valid SQL; NULL keeps the boolean
                // result constant (false for IN, true for NOT IN).
                ctx.write("NULL");
            } else {
                let ty = inner.sql_type();
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        ctx.write(", ");
                    }
                    let _slot = ctx.introduce_variable(value.clone(), ty);
                    ctx.write("?");
                }
            }
            ctx.write(")");
        }
        // Type-only: delegate straight to the inner rendering.
        Expr::Cast { inner, .. } => write_into(ctx, inner),
        Expr::Custom { sql, params, .. } => {
            for param in params {
                let _slot = ctx.introduce_variable(param.value.clone(), param.ty);
            }
            ctx.write(sql);
        }
    }
}
