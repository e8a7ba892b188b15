//! Canonicalizing sum construction.
//!
//! Implements the classical two-list merge over already-canonical operand
//! lists: heads are either combined (yielding zero or one replacement
//! nodes) or emitted in canonical order. Combination rules: numeric leaves
//! add; terms with an equal non-numeric part collect their coefficients;
//! a numeric leaf absorbs any exactly-evaluable opposite; and
//! `c*sin(u)^2 + c*cos(u)^2` contracts to `c`.

use crate::nary::{join_coefficient, split_coefficient};
use canon_ast::ordering::compare_expr;
use canon_ast::views::{as_number, is_const, numeric_eval};
use canon_ast::{Context, Expr, ExprId, FuncKind};
use smallvec::SmallVec;
use std::cmp::Ordering;

type Combined = SmallVec<[ExprId; 2]>;

/// A combined replacement that is itself a sum must contribute its
/// operands, not a nested node.
fn splice(ctx: &Context, id: ExprId) -> Combined {
    match ctx.get(id) {
        Expr::Sum(ops) => Combined::from_slice(ops),
        _ => Combined::from_slice(&[id]),
    }
}

/// Build the canonical sum of `ops`.
///
/// Any undefined operand makes the whole sum undefined. Nested sums are
/// flattened, operands pairwise merged, and the result collapses to its
/// single operand or to zero when everything cancels.
pub fn sum(ctx: &mut Context, ops: &[ExprId]) -> ExprId {
    if ops
        .iter()
        .any(|&op| matches!(ctx.get(op), Expr::Undefined))
    {
        return ctx.undefined();
    }

    let mut flat = Vec::with_capacity(ops.len());
    for &op in ops {
        match ctx.get(op) {
            Expr::Sum(inner) => flat.extend(inner.iter().copied()),
            _ => flat.push(op),
        }
    }

    let merged = simplify_operands(ctx, &flat);
    match merged.len() {
        0 => ctx.num(0),
        1 => merged[0],
        _ => ctx.add(Expr::Sum(merged)),
    }
}

/// Convenience for the two-operand case.
pub fn sum2(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    sum(ctx, &[a, b])
}

fn simplify_operands(ctx: &mut Context, ops: &[ExprId]) -> Vec<ExprId> {
    match ops.len() {
        0 => Vec::new(),
        1 => {
            if canon_ast::views::is_numeric_zero(ctx, ops[0]) {
                Vec::new()
            } else {
                ops.to_vec()
            }
        }
        2 => match try_combine(ctx, ops[0], ops[1]) {
            Some(combined) => combined.into_vec(),
            None => {
                if compare_expr(ctx, ops[1], ops[0]) == Ordering::Less {
                    vec![ops[1], ops[0]]
                } else {
                    vec![ops[0], ops[1]]
                }
            }
        },
        _ => {
            let rest = simplify_operands(ctx, &ops[1..]);
            merge(ctx, &[ops[0]], &rest)
        }
    }
}

/// Merge two sorted operand lists, combining combinable heads.
fn merge(ctx: &mut Context, p: &[ExprId], q: &[ExprId]) -> Vec<ExprId> {
    if p.is_empty() {
        return q.to_vec();
    }
    if q.is_empty() {
        return p.to_vec();
    }
    match try_combine(ctx, p[0], q[0]) {
        Some(combined) => {
            let rest = merge(ctx, &p[1..], &q[1..]);
            merge(ctx, &combined, &rest)
        }
        None => {
            if compare_expr(ctx, q[0], p[0]) == Ordering::Less {
                let mut out = vec![q[0]];
                out.extend(merge(ctx, p, &q[1..]));
                out
            } else {
                let mut out = vec![p[0]];
                out.extend(merge(ctx, &p[1..], q));
                out
            }
        }
    }
}

/// Attempt to combine two summands. `None` means "keep both"; `Some` holds
/// the surviving replacement nodes (possibly none, when they cancel).
fn try_combine(ctx: &mut Context, a: ExprId, b: ExprId) -> Option<Combined> {
    // Two numeric leaves add outright.
    if let (Some(x), Some(y)) = (as_number(ctx, a), as_number(ctx, b)) {
        let s = x + y;
        return Some(if s.is_zero() {
            Combined::new()
        } else {
            let node = ctx.rat(s);
            Combined::from_slice(&[node])
        });
    }

    // The zero identity against a non-numeric term.
    if canon_ast::views::is_numeric_zero(ctx, a) {
        return Some(Combined::from_slice(&[b]));
    }
    if canon_ast::views::is_numeric_zero(ctx, b) {
        return Some(Combined::from_slice(&[a]));
    }

    // A numeric leaf and a term that still evaluates to an exact rational
    // (a not-yet-canonical numeric power) combine arithmetically.
    for (num, other) in [(a, b), (b, a)] {
        if let Some(x) = as_number(ctx, num) {
            if !matches!(ctx.get(other), Expr::Number(_)) {
                if let Some(y) = numeric_eval(ctx, other) {
                    if y.is_exact() {
                        let s = x + y;
                        return Some(if s.is_zero() {
                            Combined::new()
                        } else {
                            let node = ctx.rat(s);
                            Combined::from_slice(&[node])
                        });
                    }
                }
            }
        }
    }

    // c*sin(u)^2 + c*cos(u)^2 -> c
    if let Some(node) = try_pythagorean(ctx, a, b) {
        return Some(splice(ctx, node));
    }

    // Like terms: equal non-numeric part, coefficients add.
    let (ca, ra) = split_coefficient(ctx, a);
    let (cb, rb) = split_coefficient(ctx, b);
    if ra == rb {
        let c = ca + cb;
        return Some(if c.is_zero() {
            Combined::new()
        } else {
            let node = join_coefficient(ctx, c, ra);
            splice(ctx, node)
        });
    }

    None
}

/// Decompose a term as `constants * trig(arg)^2`, for `trig` sin or cos.
fn split_trig_square(
    ctx: &Context,
    id: ExprId,
) -> Option<(Vec<ExprId>, FuncKind, ExprId)> {
    fn trig_square(ctx: &Context, id: ExprId) -> Option<(FuncKind, ExprId)> {
        if let Expr::Pow(base, exp) = ctx.get(id) {
            if as_number(ctx, *exp).is_some_and(|e| e == canon_num::Rational::int(2)) {
                if let Expr::Function(kind @ (FuncKind::Sin | FuncKind::Cos), arg) =
                    ctx.get(*base)
                {
                    return Some((*kind, *arg));
                }
            }
        }
        None
    }

    if let Some((kind, arg)) = trig_square(ctx, id) {
        return Some((Vec::new(), kind, arg));
    }
    if let Expr::Product(ops) = ctx.get(id) {
        let mut consts = Vec::new();
        let mut found = None;
        for &op in ops {
            if let Some(hit) = trig_square(ctx, op) {
                if found.is_some() {
                    return None;
                }
                found = Some(hit);
            } else if is_const(ctx, op) {
                consts.push(op);
            } else {
                return None;
            }
        }
        let (kind, arg) = found?;
        return Some((consts, kind, arg));
    }
    None
}

/// `c*sin(u)^2 + c*cos(u)^2` contracts to `c` for any shared constant
/// coefficient `c` (including the implicit one).
fn try_pythagorean(ctx: &mut Context, a: ExprId, b: ExprId) -> Option<ExprId> {
    let (consts_a, kind_a, arg_a) = split_trig_square(ctx, a)?;
    let (consts_b, kind_b, arg_b) = split_trig_square(ctx, b)?;
    if arg_a != arg_b || kind_a == kind_b || consts_a != consts_b {
        return None;
    }
    Some(match consts_a.len() {
        0 => ctx.num(1),
        1 => consts_a[0],
        _ => crate::product::product(ctx, &consts_a),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_num::Rational;

    #[test]
    fn numeric_leaves_add() {
        let mut ctx = Context::new();
        let a = ctx.num(2);
        let b = ctx.rat(Rational::fraction(1, 2));
        let s = sum2(&mut ctx, a, b);
        assert_eq!(as_number(&ctx, s), Some(Rational::fraction(5, 2)));
    }

    #[test]
    fn empty_sum_is_zero() {
        let mut ctx = Context::new();
        let s = sum(&mut ctx, &[]);
        assert!(canon_ast::views::is_numeric_zero(&ctx, s));
    }

    #[test]
    fn single_operand_collapses() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        assert_eq!(sum(&mut ctx, &[x]), x);
    }

    #[test]
    fn nested_sums_flatten() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let z = ctx.var("z");
        let inner = sum2(&mut ctx, x, y);
        let outer = sum2(&mut ctx, inner, z);
        match ctx.get(outer) {
            Expr::Sum(ops) => assert_eq!(ops.len(), 3),
            other => panic!("expected flattened sum, got {:?}", other),
        }
    }

    #[test]
    fn like_terms_collect() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let two_x = crate::product::product(&mut ctx, &[two, x]);
        let s = sum2(&mut ctx, two_x, x);
        let (c, rest) = split_coefficient(&mut ctx, s);
        assert_eq!(c, Rational::int(3));
        assert_eq!(rest, x);
    }

    #[test]
    fn opposite_terms_cancel_to_zero() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let minus_one = ctx.num(-1);
        let neg_x = crate::product::product(&mut ctx, &[minus_one, x]);
        let s = sum2(&mut ctx, x, neg_x);
        assert!(canon_ast::views::is_numeric_zero(&ctx, s));
    }

    #[test]
    fn undefined_operand_poisons_sum() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let u = ctx.undefined();
        let s = sum2(&mut ctx, x, u);
        assert!(matches!(ctx.get(s), Expr::Undefined));
    }

    #[test]
    fn operands_come_out_ordered() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let s = sum2(&mut ctx, x, two);
        match ctx.get(s) {
            Expr::Sum(ops) => {
                assert_eq!(ops[0], two);
                assert_eq!(ops[1], x);
            }
            other => panic!("expected sum, got {:?}", other),
        }
    }

    #[test]
    fn construction_is_commutative() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let two = ctx.num(2);
        let a = sum(&mut ctx, &[x, y, two]);
        let b = sum(&mut ctx, &[two, y, x]);
        assert_eq!(a, b);
    }
}
