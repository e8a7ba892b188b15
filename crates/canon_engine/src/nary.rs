//! Term and factor decomposition helpers shared by the merge algorithms.

use canon_ast::{Context, Expr, ExprId};
use canon_num::Rational;

/// Split a term into its numeric coefficient and the remaining part.
///
/// `3*x*y` gives `(3, x*y)`, `x` gives `(1, x)`, and a bare number `n`
/// gives `(n, 1)`. Only a literal numeric leading factor counts as
/// coefficient; constant factors like `pi` or `2^(1/2)` stay in the rest,
/// which is what keeps `2*a` and `2^(1/2)*a` from collecting.
pub fn split_coefficient(ctx: &mut Context, id: ExprId) -> (Rational, ExprId) {
    match ctx.get(id).clone() {
        Expr::Number(r) => {
            let one = ctx.num(1);
            (r, one)
        }
        Expr::Product(ops) => {
            if let Expr::Number(r) = ctx.get(ops[0]).clone() {
                let rest = if ops.len() == 2 {
                    ops[1]
                } else {
                    // Dropping the numeric head keeps the list canonical.
                    ctx.add(Expr::Product(ops[1..].to_vec()))
                };
                (r, rest)
            } else {
                (Rational::ONE, id)
            }
        }
        _ => (Rational::ONE, id),
    }
}

/// Rebuild a term from coefficient and rest without re-running the merge.
pub fn join_coefficient(ctx: &mut Context, coeff: Rational, rest: ExprId) -> ExprId {
    if coeff.is_zero() {
        return ctx.num(0);
    }
    if canon_ast::views::is_numeric_one(ctx, rest) {
        return ctx.rat(coeff);
    }
    if coeff.is_one() {
        return rest;
    }
    let c = ctx.rat(coeff);
    match ctx.get(rest).clone() {
        Expr::Product(mut ops) => {
            ops.insert(0, c);
            ctx.add(Expr::Product(ops))
        }
        _ => ctx.add(Expr::Product(vec![c, rest])),
    }
}

/// View a factor as `(base, exponent)`: powers split, everything else has
/// the implicit exponent one.
pub fn split_exponent(ctx: &mut Context, id: ExprId) -> (ExprId, ExprId) {
    match ctx.get(id) {
        Expr::Pow(b, e) => (*b, *e),
        _ => {
            let one = ctx.num(1);
            (id, one)
        }
    }
}
