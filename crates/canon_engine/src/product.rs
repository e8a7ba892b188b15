//! Canonicalizing product construction.
//!
//! The same two-list merge as sums, with product-specific combination
//! rules: numeric leaves multiply into a single coefficient; equal bases
//! add exponents; numeric powers collect when their exponents (or exponent
//! denominators) match, within the factorization resolution limit;
//! adjacent powers of sin/cos/tan of one argument contract. A product
//! holding a sum next to a genuinely constant factor distributes the
//! constant, so every value keeps one normal form.

use crate::nary::split_exponent;
use crate::power::pow;
use crate::sum::{sum, sum2};
use canon_ast::ordering::compare_expr;
use canon_ast::views::{as_number, is_const, is_numeric_one, is_numeric_zero};
use canon_ast::{Context, Expr, ExprId, FuncKind};
use canon_num::{simplify_numeric_power, NumericPower, Rational};
use smallvec::SmallVec;
use std::cmp::Ordering;

type Combined = SmallVec<[ExprId; 2]>;

/// A combined replacement that is itself a product must contribute its
/// factors, not a nested node.
fn splice(ctx: &Context, id: ExprId) -> Combined {
    match ctx.get(id) {
        Expr::Product(ops) => Combined::from_slice(ops),
        _ => Combined::from_slice(&[id]),
    }
}

/// Build the canonical product of `ops`.
///
/// Undefined wins over zero: an undefined operand poisons the product even
/// when another operand is zero. Nested products flatten, factors pairwise
/// merge, and a constant factor next to a sum distributes.
pub fn product(ctx: &mut Context, ops: &[ExprId]) -> ExprId {
    if ops
        .iter()
        .any(|&op| matches!(ctx.get(op), Expr::Undefined))
    {
        return ctx.undefined();
    }
    if ops.iter().any(|&op| is_numeric_zero(ctx, op)) {
        return ctx.num(0);
    }

    let mut flat = Vec::with_capacity(ops.len());
    for &op in ops {
        match ctx.get(op) {
            Expr::Product(inner) => flat.extend(inner.iter().copied()),
            _ => flat.push(op),
        }
    }

    let merged = simplify_factors(ctx, &flat);
    if merged.iter().any(|&op| is_numeric_zero(ctx, op)) {
        return ctx.num(0);
    }
    if let Some(distributed) = try_distribute(ctx, &merged) {
        return distributed;
    }
    match merged.len() {
        0 => ctx.num(1),
        1 => merged[0],
        _ => ctx.add(Expr::Product(merged)),
    }
}

/// Convenience for the two-operand case.
pub fn product2(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    product(ctx, &[a, b])
}

/// Negate by prefixing the factor `-1`.
pub fn negate(ctx: &mut Context, id: ExprId) -> ExprId {
    let minus_one = ctx.num(-1);
    product2(ctx, minus_one, id)
}

fn simplify_factors(ctx: &mut Context, ops: &[ExprId]) -> Vec<ExprId> {
    match ops.len() {
        0 => Vec::new(),
        1 => {
            if is_numeric_one(ctx, ops[0]) {
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
            let rest = simplify_factors(ctx, &ops[1..]);
            merge(ctx, &[ops[0]], &rest)
        }
    }
}

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

/// Turn a numeric-power triple back into 0, 1, or 2 canonical factors.
fn rebuild_numeric_power(ctx: &mut Context, np: NumericPower) -> Combined {
    if np.prefactor.is_undefined() {
        let u = ctx.undefined();
        return Combined::from_slice(&[u]);
    }
    if np.is_collapsed() {
        return if np.prefactor.is_one() {
            Combined::new()
        } else {
            let n = ctx.rat(np.prefactor);
            Combined::from_slice(&[n])
        };
    }
    let base = ctx.rat(np.base);
    let exp = ctx.rat(np.exponent);
    let power = ctx.add(Expr::Pow(base, exp));
    if np.prefactor.is_one() {
        Combined::from_slice(&[power])
    } else {
        let n = ctx.rat(np.prefactor);
        Combined::from_slice(&[n, power])
    }
}

/// Numeric `Pow` node payload, when both base and exponent are exact.
fn exact_numeric_pow(ctx: &Context, id: ExprId) -> Option<(Rational, Rational)> {
    if let Expr::Pow(b, e) = ctx.get(id) {
        let b = as_number(ctx, *b)?;
        let e = as_number(ctx, *e)?;
        if b.is_exact() && e.is_exact() {
            return Some((b, e));
        }
    }
    None
}

fn try_combine(ctx: &mut Context, a: ExprId, b: ExprId) -> Option<Combined> {
    // Numeric leaves multiply.
    if let (Some(x), Some(y)) = (as_number(ctx, a), as_number(ctx, b)) {
        let m = x * y;
        return Some(if m.is_one() {
            Combined::new()
        } else {
            let node = ctx.rat(m);
            Combined::from_slice(&[node])
        });
    }

    // The unit identity.
    if is_numeric_one(ctx, a) {
        return Some(Combined::from_slice(&[b]));
    }
    if is_numeric_one(ctx, b) {
        return Some(Combined::from_slice(&[a]));
    }

    // A numeric leaf against a numeric power: run the canonicalizer with
    // the leaf as prefactor; combine only when it actually reduces.
    for (num, other) in [(a, b), (b, a)] {
        if let Some(c) = as_number(ctx, num) {
            if let Some((base, exp)) = exact_numeric_pow(ctx, other) {
                if c.is_exact() {
                    let np = simplify_numeric_power(c, base, exp, ctx.resolution_limit());
                    if np.prefactor == c && np.base == base && np.exponent == exp {
                        return None;
                    }
                    return Some(rebuild_numeric_power(ctx, np));
                }
            }
            // A bare number only combines through the rules above.
            return None;
        }
    }

    // Two numeric powers: equal exponents merge bases; equal exponent
    // denominators merge after raising each base to its numerator.
    if let (Some((ba, ea)), Some((bb, eb))) = (exact_numeric_pow(ctx, a), exact_numeric_pow(ctx, b))
    {
        if ea == eb {
            let merged = ba * bb;
            if merged.is_exact() {
                let np = simplify_numeric_power(
                    Rational::ONE,
                    merged,
                    ea,
                    ctx.resolution_limit(),
                );
                return Some(rebuild_numeric_power(ctx, np));
            }
        }
        if let (Some((pa, qa)), Some((pb, qb))) = (ea.parts(), eb.parts()) {
            if qa == qb && qa >= 2 {
                let va = ba.to_the(Rational::int(pa));
                let vb = bb.to_the(Rational::int(pb));
                let merged = va * vb;
                if va.is_exact() && vb.is_exact() && merged.is_exact() {
                    let np = simplify_numeric_power(
                        Rational::ONE,
                        merged,
                        Rational::fraction(1, qa),
                        ctx.resolution_limit(),
                    );
                    return Some(rebuild_numeric_power(ctx, np));
                }
            }
        }
    }

    // Adjacent powers of sin/cos/tan of the same argument.
    if let Some(node) = try_trig_contract(ctx, a, b) {
        return Some(if is_numeric_one(ctx, node) {
            Combined::new()
        } else {
            Combined::from_slice(&[node])
        });
    }

    // Equal bases add exponents.
    let (base_a, exp_a) = split_exponent(ctx, a);
    let (base_b, exp_b) = split_exponent(ctx, b);
    if base_a == base_b {
        let exp = sum2(ctx, exp_a, exp_b);
        let combined = pow(ctx, base_a, exp);
        return Some(if is_numeric_one(ctx, combined) {
            Combined::new()
        } else {
            splice(ctx, combined)
        });
    }

    None
}

/// Trig factor shape: `(head, argument, numeric exponent)`.
fn trig_power(ctx: &mut Context, id: ExprId) -> Option<(FuncKind, ExprId, Rational)> {
    let (base, exp) = split_exponent(ctx, id);
    let e = as_number(ctx, exp)?;
    if let Expr::Function(kind @ (FuncKind::Sin | FuncKind::Cos | FuncKind::Tan), arg) =
        ctx.get(base)
    {
        Some((*kind, *arg, e))
    } else {
        None
    }
}

/// Contractions among sin/cos/tan of one argument:
/// `sin^n * cos^-n -> tan^n`, `tan^n * cos^n -> sin^n`,
/// `sin^n * tan^-n -> cos^n`.
fn try_trig_contract(ctx: &mut Context, a: ExprId, b: ExprId) -> Option<ExprId> {
    let (ka, arg_a, ea) = trig_power(ctx, a)?;
    let (kb, arg_b, eb) = trig_power(ctx, b)?;
    if arg_a != arg_b {
        return None;
    }
    let arg = arg_a;
    let build = |ctx: &mut Context, kind: FuncKind, e: Rational| {
        let f = ctx.add(Expr::Function(kind, arg));
        let en = ctx.rat(e);
        pow(ctx, f, en)
    };
    match (ka, kb) {
        (FuncKind::Sin, FuncKind::Cos) if ea.equals(&-eb) => Some(build(ctx, FuncKind::Tan, ea)),
        (FuncKind::Cos, FuncKind::Sin) if eb.equals(&-ea) => Some(build(ctx, FuncKind::Tan, eb)),
        (FuncKind::Tan, FuncKind::Cos) if ea.equals(&eb) => Some(build(ctx, FuncKind::Sin, ea)),
        (FuncKind::Cos, FuncKind::Tan) if ea.equals(&eb) => Some(build(ctx, FuncKind::Sin, ea)),
        (FuncKind::Sin, FuncKind::Tan) if ea.equals(&-eb) => Some(build(ctx, FuncKind::Cos, ea)),
        (FuncKind::Tan, FuncKind::Sin) if eb.equals(&-ea) => Some(build(ctx, FuncKind::Cos, eb)),
        _ => None,
    }
}

/// Distribute constant factors over a sum factor, keeping one normal form
/// per value.
fn try_distribute(ctx: &mut Context, ops: &[ExprId]) -> Option<ExprId> {
    let sum_pos = ops
        .iter()
        .position(|&op| matches!(ctx.get(op), Expr::Sum(_)))?;
    let consts: Vec<ExprId> = ops
        .iter()
        .enumerate()
        .filter(|&(i, &op)| i != sum_pos && is_const(ctx, op))
        .map(|(_, &op)| op)
        .collect();
    if consts.is_empty() {
        return None;
    }
    let sum_ops = match ctx.get(ops[sum_pos]) {
        Expr::Sum(inner) => inner.clone(),
        _ => unreachable!(),
    };

    let mut terms = Vec::with_capacity(sum_ops.len());
    for &t in &sum_ops {
        let mut factors = consts.clone();
        factors.push(t);
        terms.push(product(ctx, &factors));
    }
    let distributed = sum(ctx, &terms);

    let mut rest: Vec<ExprId> = ops
        .iter()
        .enumerate()
        .filter(|&(i, &op)| i != sum_pos && !(is_const(ctx, op)))
        .map(|(_, &op)| op)
        .collect();
    rest.push(distributed);
    Some(product(ctx, &rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_leaves_multiply() {
        let mut ctx = Context::new();
        let a = ctx.num(6);
        let b = ctx.rat(Rational::fraction(1, 2));
        let p = product2(&mut ctx, a, b);
        assert_eq!(as_number(&ctx, p), Some(Rational::int(3)));
    }

    #[test]
    fn empty_product_is_one() {
        let mut ctx = Context::new();
        let p = product(&mut ctx, &[]);
        assert!(is_numeric_one(&ctx, p));
    }

    #[test]
    fn zero_short_circuits() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let zero = ctx.num(0);
        let p = product2(&mut ctx, x, zero);
        assert!(is_numeric_zero(&ctx, p));
    }

    #[test]
    fn undefined_wins_over_zero() {
        let mut ctx = Context::new();
        let zero = ctx.num(0);
        let u = ctx.undefined();
        let p = product2(&mut ctx, zero, u);
        assert!(matches!(ctx.get(p), Expr::Undefined));
    }

    #[test]
    fn equal_bases_add_exponents() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let p = product2(&mut ctx, x, x);
        match ctx.get(p) {
            Expr::Pow(base, exp) => {
                assert_eq!(*base, x);
                assert_eq!(as_number(&ctx, *exp), Some(Rational::int(2)));
            }
            other => panic!("expected power, got {:?}", other),
        }
    }

    #[test]
    fn reciprocal_cancels() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let minus_one = ctx.num(-1);
        let inv = pow(&mut ctx, x, minus_one);
        let p = product2(&mut ctx, x, inv);
        assert!(is_numeric_one(&ctx, p));
    }

    #[test]
    fn square_roots_of_same_radicand_collapse() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let half = ctx.rat(Rational::fraction(1, 2));
        let r1 = pow(&mut ctx, two, half);
        let r2 = pow(&mut ctx, two, half);
        let p = product2(&mut ctx, r1, r2);
        assert_eq!(as_number(&ctx, p), Some(Rational::int(2)));
    }

    #[test]
    fn numeric_powers_with_equal_exponent_merge() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let eight = ctx.num(8);
        let half = ctx.rat(Rational::fraction(1, 2));
        let r2 = pow(&mut ctx, two, half);
        let r8 = pow(&mut ctx, eight, half);
        // sqrt(2)*sqrt(8) = sqrt(16) = 4
        let p = product2(&mut ctx, r2, r8);
        assert_eq!(as_number(&ctx, p), Some(Rational::int(4)));
    }

    #[test]
    fn sin_over_cos_contracts_to_tan() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let sin = ctx.add(Expr::Function(FuncKind::Sin, x));
        let cos = ctx.add(Expr::Function(FuncKind::Cos, x));
        let minus_one = ctx.num(-1);
        let inv_cos = pow(&mut ctx, cos, minus_one);
        let p = product2(&mut ctx, sin, inv_cos);
        match ctx.get(p) {
            Expr::Function(FuncKind::Tan, arg) => assert_eq!(*arg, x),
            other => panic!("expected tan, got {:?}", other),
        }
    }

    #[test]
    fn tan_times_cos_contracts_to_sin() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let tan = ctx.add(Expr::Function(FuncKind::Tan, x));
        let cos = ctx.add(Expr::Function(FuncKind::Cos, x));
        let p = product2(&mut ctx, tan, cos);
        match ctx.get(p) {
            Expr::Function(FuncKind::Sin, arg) => assert_eq!(*arg, x),
            other => panic!("expected sin, got {:?}", other),
        }
    }

    #[test]
    fn constant_distributes_over_sum() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let x = ctx.var("x");
        let y = ctx.var("y");
        let s = sum2(&mut ctx, x, y);
        let p = product2(&mut ctx, two, s);
        // 2*(x+y) -> 2x + 2y
        match ctx.get(p).clone() {
            Expr::Sum(ops) => {
                assert_eq!(ops.len(), 2);
                let expected_x = product2(&mut ctx, two, x);
                let expected_y = product2(&mut ctx, two, y);
                assert!(ops.contains(&expected_x));
                assert!(ops.contains(&expected_y));
            }
            other => panic!("expected distributed sum, got {:?}", other),
        }
    }

    #[test]
    fn symbolic_factor_does_not_distribute() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let x = ctx.var("x");
        let y = ctx.var("y");
        let s = sum2(&mut ctx, x, y);
        let p = product2(&mut ctx, a, s);
        assert!(matches!(ctx.get(p), Expr::Product(_)));
    }

    #[test]
    fn construction_is_commutative() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let three = ctx.num(3);
        let p1 = product(&mut ctx, &[x, y, three]);
        let p2 = product(&mut ctx, &[three, y, x]);
        assert_eq!(p1, p2);
    }
}
