//! Canonicalizing power construction.
//!
//! Trivial cases resolve first (zero/one exponent, zero/one base), a
//! negative base with a numerically evaluable non-integer exponent is
//! rejected as undefined, and the remaining work dispatches on the base
//! kind: numeric powers run through the numeric canonicalizer, powers of
//! powers contract when the sign rules allow, product bases distribute the
//! exponent, and `e^log(u)` collapses.

use crate::product::{product, product2};
use canon_ast::views::{
    as_number, is_known_positive, is_numeric_one, is_numeric_zero, numeric_eval,
};
use canon_ast::{Constant, Context, Expr, ExprId, FuncKind};
use canon_num::{simplify_numeric_power, Rational};
use tracing::warn;

/// Build the canonical power `base^exponent`.
pub fn pow(ctx: &mut Context, base: ExprId, exponent: ExprId) -> ExprId {
    if matches!(ctx.get(base), Expr::Undefined) || matches!(ctx.get(exponent), Expr::Undefined) {
        return ctx.undefined();
    }

    // Trivial ladder, in order: x^0 = 1, 1^x = 1, 0^x, x^1 = x.
    if is_numeric_zero(ctx, exponent) {
        return ctx.num(1);
    }
    if is_numeric_one(ctx, base) {
        return ctx.num(1);
    }
    if is_numeric_zero(ctx, base) {
        if let Some(e) = numeric_eval(ctx, exponent) {
            if e.is_negative() {
                warn!("zero base with negative exponent is undefined");
                return ctx.undefined();
            }
        }
        return ctx.num(0);
    }
    if is_numeric_one(ctx, exponent) {
        return base;
    }

    // A negative base with a non-integer evaluable exponent has a complex
    // value, which this core does not represent.
    if let (Some(b), Some(e)) = (numeric_eval(ctx, base), numeric_eval(ctx, exponent)) {
        if b.is_negative() && !e.is_integer() {
            warn!(
                "negative base with non-integer exponent {} yields a complex value",
                e
            );
            return ctx.undefined();
        }
    }

    match (ctx.get(base).clone(), ctx.get(exponent).clone()) {
        (Expr::Number(b), Expr::Number(e)) => numeric_pow(ctx, b, e),

        // (b^e2)^e contracts when exponent arithmetic cannot change the
        // value: integer outer exponent, known-positive inner base, or a
        // fractional inner exponent (whose domain is already restricted).
        (Expr::Pow(inner_base, inner_exp), _) => {
            let outer_integer =
                as_number(ctx, exponent).is_some_and(|e| e.is_exact() && e.is_integer());
            let inner_fractional =
                as_number(ctx, inner_exp).is_some_and(|e| e.is_exact() && !e.is_integer());
            if outer_integer || inner_fractional || is_known_positive(ctx, inner_base) {
                let merged = product2(ctx, inner_exp, exponent);
                pow(ctx, inner_base, merged)
            } else {
                ctx.add(Expr::Pow(base, exponent))
            }
        }

        // (x*y)^n distributes over every factor for integer n, and over
        // the known-positive factors otherwise.
        (Expr::Product(ops), _) => {
            let integer_exp =
                as_number(ctx, exponent).is_some_and(|e| e.is_exact() && e.is_integer());
            if integer_exp {
                let powered: Vec<ExprId> =
                    ops.iter().map(|&f| pow(ctx, f, exponent)).collect();
                return product(ctx, &powered);
            }
            let (positive, rest): (Vec<ExprId>, Vec<ExprId>) = ops
                .iter()
                .copied()
                .partition(|&f| is_known_positive(ctx, f));
            if positive.is_empty() {
                return ctx.add(Expr::Pow(base, exponent));
            }
            let mut factors: Vec<ExprId> =
                positive.iter().map(|&f| pow(ctx, f, exponent)).collect();
            if !rest.is_empty() {
                let opaque = if rest.len() == 1 {
                    rest[0]
                } else {
                    ctx.add(Expr::Product(rest))
                };
                factors.push(ctx.add(Expr::Pow(opaque, exponent)));
            }
            product(ctx, &factors)
        }

        // e^log(u) = u and e^(k*log(u)) = u^k.
        (Expr::Constant(Constant::E), Expr::Function(FuncKind::Log, arg)) => arg,
        (Expr::Constant(Constant::E), Expr::Product(ops)) => {
            let log_pos = ops
                .iter()
                .position(|&f| matches!(ctx.get(f), Expr::Function(FuncKind::Log, _)));
            match log_pos {
                Some(i) => {
                    let log_arg = match ctx.get(ops[i]) {
                        Expr::Function(FuncKind::Log, arg) => *arg,
                        _ => unreachable!(),
                    };
                    let others: Vec<ExprId> = ops
                        .iter()
                        .enumerate()
                        .filter(|&(j, _)| j != i)
                        .map(|(_, &f)| f)
                        .collect();
                    let k = product(ctx, &others);
                    pow(ctx, log_arg, k)
                }
                None => ctx.add(Expr::Pow(base, exponent)),
            }
        }

        _ => ctx.add(Expr::Pow(base, exponent)),
    }
}

/// Numeric base and exponent: exact fractional exponents run through the
/// prime-structure canonicalizer; everything else evaluates directly.
fn numeric_pow(ctx: &mut Context, base: Rational, exp: Rational) -> ExprId {
    if !base.is_exact() || !exp.is_exact() || exp.is_integer() {
        return ctx.rat(base.to_the(exp));
    }
    let np = simplify_numeric_power(Rational::ONE, base, exp, ctx.resolution_limit());
    if np.prefactor.is_undefined() {
        return ctx.undefined();
    }
    if np.is_collapsed() {
        return ctx.rat(np.prefactor);
    }
    let b = ctx.rat(np.base);
    let e = ctx.rat(np.exponent);
    let power = ctx.add(Expr::Pow(b, e));
    if np.prefactor.is_one() {
        power
    } else {
        let c = ctx.rat(np.prefactor);
        ctx.add(Expr::Product(vec![c, power]))
    }
}
