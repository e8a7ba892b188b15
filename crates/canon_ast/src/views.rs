//! Read-only structural queries over pooled nodes.
//!
//! These are the accessors the printer and the linear-algebra layer consume:
//! kind tests, operand access, and numeric evaluation. "Not numerically
//! evaluable" is a routine outcome and is reported as `None`, never as a
//! panic or an error value.

use crate::expression::{Context, Expr, ExprId};
use canon_num::Rational;

/// The numeric payload of a `Number` node.
#[inline]
pub fn as_number(ctx: &Context, id: ExprId) -> Option<Rational> {
    match ctx.get(id) {
        Expr::Number(r) => Some(*r),
        _ => None,
    }
}

/// Exact machine integer behind a `Number` node.
#[inline]
pub fn as_integer(ctx: &Context, id: ExprId) -> Option<i64> {
    as_number(ctx, id).and_then(|r| r.as_integer())
}

pub fn is_numeric_zero(ctx: &Context, id: ExprId) -> bool {
    as_number(ctx, id).is_some_and(|r| r.is_zero())
}

pub fn is_numeric_one(ctx: &Context, id: ExprId) -> bool {
    as_number(ctx, id).is_some_and(|r| r.is_one())
}

/// Operand list of a `Sum` or `Product`.
pub fn operands(ctx: &Context, id: ExprId) -> Option<&[ExprId]> {
    match ctx.get(id) {
        Expr::Sum(ops) | Expr::Product(ops) => Some(ops),
        _ => None,
    }
}

/// Base and exponent of a `Pow` node.
pub fn as_pow(ctx: &Context, id: ExprId) -> Option<(ExprId, ExprId)> {
    match ctx.get(id) {
        Expr::Pow(b, e) => Some((*b, *e)),
        _ => None,
    }
}

/// Display name of a symbol, constant, or function node.
pub fn node_name<'a>(ctx: &'a Context, id: ExprId) -> Option<&'a str> {
    match ctx.get(id) {
        Expr::Symbol(s) => Some(ctx.symbol_record(*s).name.as_str()),
        Expr::Constant(c) => Some(c.name()),
        Expr::Function(f, _) => Some(f.name()),
        _ => None,
    }
}

/// True when the node is known positive: positive numbers, positive-flagged
/// symbols, and Euler's constant / pi.
pub fn is_known_positive(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Number(r) => !r.is_undefined() && !r.is_negative() && !r.is_zero(),
        Expr::Constant(_) => true,
        Expr::Symbol(s) => ctx.symbol_record(*s).positive,
        _ => false,
    }
}

/// True when the subtree contains no symbols: such a factor is genuinely
/// constant and may be distributed over a sum without loss of structure.
pub fn is_const(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Number(_) | Expr::Constant(_) => true,
        Expr::Symbol(_) | Expr::Undefined => false,
        Expr::Function(_, arg) => is_const(ctx, *arg),
        Expr::Pow(b, e) => is_const(ctx, *b) && is_const(ctx, *e),
        Expr::Sum(ops) | Expr::Product(ops) => ops.iter().all(|&op| is_const(ctx, op)),
    }
}

/// Evaluate a tree to a number where possible. Symbols and undefined
/// results yield `None`; constants and functions evaluate in floating
/// point, exact subtrees stay exact.
pub fn numeric_eval(ctx: &Context, id: ExprId) -> Option<Rational> {
    let result = match ctx.get(id) {
        Expr::Number(r) => *r,
        Expr::Constant(c) => Rational::Float(c.to_f64()),
        Expr::Symbol(_) | Expr::Undefined => return None,
        Expr::Function(f, arg) => {
            let x = numeric_eval(ctx, *arg)?;
            Rational::Float(f.eval_f64(x.to_f64()))
        }
        Expr::Sum(ops) => {
            let mut acc = Rational::ZERO;
            for &op in ops {
                acc = acc + numeric_eval(ctx, op)?;
            }
            acc
        }
        Expr::Product(ops) => {
            let mut acc = Rational::ONE;
            for &op in ops {
                acc = acc * numeric_eval(ctx, op)?;
            }
            acc
        }
        Expr::Pow(b, e) => {
            let base = numeric_eval(ctx, *b)?;
            let exp = numeric_eval(ctx, *e)?;
            base.to_the(exp)
        }
    };
    if result.is_undefined() {
        None
    } else {
        Some(result)
    }
}

/// Number of nodes in the tree rooted at `id` (shared subtrees counted per
/// occurrence). Used by the expand-vs-normal simplicity policy.
pub fn node_count(ctx: &Context, id: ExprId) -> usize {
    match ctx.get(id) {
        Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) | Expr::Undefined => 1,
        Expr::Function(_, arg) => 1 + node_count(ctx, *arg),
        Expr::Pow(b, e) => 1 + node_count(ctx, *b) + node_count(ctx, *e),
        Expr::Sum(ops) | Expr::Product(ops) => {
            1 + ops.iter().map(|&op| node_count(ctx, op)).sum::<usize>()
        }
    }
}

/// Collect the distinct symbol nodes under `id`, in first-encounter order.
pub fn collect_symbols(ctx: &Context, id: ExprId, out: &mut Vec<ExprId>) {
    match ctx.get(id) {
        Expr::Symbol(_) => {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        Expr::Function(_, arg) => collect_symbols(ctx, *arg, out),
        Expr::Pow(b, e) => {
            collect_symbols(ctx, *b, out);
            collect_symbols(ctx, *e, out);
        }
        Expr::Sum(ops) | Expr::Product(ops) => {
            for &op in ops {
                collect_symbols(ctx, op, out);
            }
        }
        _ => {}
    }
}
