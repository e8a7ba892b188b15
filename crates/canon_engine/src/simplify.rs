//! Re-canonicalization and the top-level simplicity policy.

use crate::build::apply;
use crate::expand::expand;
use crate::normal::normal;
use crate::power::pow;
use crate::product::product;
use crate::sum::sum;
use canon_ast::views::node_count;
use canon_ast::{Context, Expr, ExprId};

/// Rebuild a tree bottom-up through the canonicalizing factories.
///
/// Trees built through the factories are already canonical, so this is a
/// fixed point for them; it exists for trees assembled from raw nodes and
/// as the re-entry point after substitution.
pub fn simplify(ctx: &mut Context, id: ExprId) -> ExprId {
    match ctx.get(id).clone() {
        Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) | Expr::Undefined => id,
        Expr::Function(kind, arg) => {
            let arg = simplify(ctx, arg);
            apply(ctx, kind, arg)
        }
        Expr::Sum(ops) => {
            let ops: Vec<ExprId> = ops.iter().map(|&op| simplify(ctx, op)).collect();
            sum(ctx, &ops)
        }
        Expr::Product(ops) => {
            let ops: Vec<ExprId> = ops.iter().map(|&op| simplify(ctx, op)).collect();
            product(ctx, &ops)
        }
        Expr::Pow(base, exp) => {
            let base = simplify(ctx, base);
            let exp = simplify(ctx, exp);
            pow(ctx, base, exp)
        }
    }
}

/// The expanded and the normalized form of `id`, whichever reads simpler
/// (fewer nodes; the normal form wins ties).
pub fn simplest_form(ctx: &mut Context, id: ExprId) -> ExprId {
    let expanded = expand(ctx, id);
    let normalized = normal(ctx, id);
    if node_count(ctx, expanded) < node_count(ctx, normalized) {
        expanded
    } else {
        normalized
    }
}

/// Value equality: two trees are equivalent when their rational normal
/// forms pool to the same node. Stronger than structural equality (which
/// is plain `ExprId` comparison) but still conservative for values the
/// normalizer keeps opaque.
pub fn are_equivalent(ctx: &mut Context, a: ExprId, b: ExprId) -> bool {
    if a == b {
        return true;
    }
    normal(ctx, a) == normal(ctx, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_ast::views::as_integer;

    #[test]
    fn raw_tree_canonicalizes() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let two = ctx.num(2);
        let raw = ctx.add(Expr::Sum(vec![one, two]));
        let s = simplify(&mut ctx, raw);
        assert_eq!(as_integer(&ctx, s), Some(3));
    }

    #[test]
    fn simplify_is_idempotent() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let two = ctx.num(2);
        let raw_pow = ctx.add(Expr::Pow(x, one));
        let raw = ctx.add(Expr::Product(vec![two, raw_pow]));
        let once = simplify(&mut ctx, raw);
        let twice = simplify(&mut ctx, once);
        assert_eq!(once, twice);
    }

    #[test]
    fn equivalence_sees_through_denominators() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let two = ctx.num(2);
        let xp1 = crate::sum::sum2(&mut ctx, x, one);
        // x/(x+1) + 1/(x+1) vs 1
        let f1 = crate::build::div(&mut ctx, x, xp1);
        let f2 = crate::build::div(&mut ctx, one, xp1);
        let s = crate::sum::sum2(&mut ctx, f1, f2);
        assert!(are_equivalent(&mut ctx, s, one));
        assert!(!are_equivalent(&mut ctx, s, two));
    }

    #[test]
    fn policy_prefers_cancelled_normal_form() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let one = ctx.num(1);
        let x2 = pow(&mut ctx, x, two);
        let num = crate::build::sub(&mut ctx, x2, one);
        let den = crate::build::sub(&mut ctx, x, one);
        let q = crate::build::div(&mut ctx, num, den);
        let best = simplest_form(&mut ctx, q);
        let expected = crate::sum::sum2(&mut ctx, x, one);
        assert_eq!(best, expected);
    }
}
