//! Multivariate polynomial GCD.
//!
//! The public entry validates its inputs, resolves trivial cases, reduces
//! the disjoint-symbol case to integer content, and otherwise runs a
//! pluggable strategy over the ordered shared-symbol list. The default
//! strategy is the primitive polynomial remainder sequence: contents are
//! split off recursively, the primitive parts run pseudo-division Euclid
//! in the most significant shared symbol, and the result is normalized so
//! its leading coefficient with respect to that symbol is positive.
//!
//! Failures along the way (coefficient overflow, too many variables) make
//! the GCD degrade to one — a valid divisor — rather than error.

use crate::multipoly::{self, MultiPoly, VarExp};
use crate::polyinfo::{conversion_vars, is_input_valid, shared_symbols};
use canon_ast::views::as_number;
use canon_ast::{Context, ExprId};
use canon_num::Rational;
use num_integer::Integer;
use tracing::warn;

/// Pluggable polynomial-GCD algorithm over a shared variable order. The
/// most significant variable is the last one.
pub trait GcdStrategy {
    fn gcd(&self, u: &MultiPoly, v: &MultiPoly) -> Option<MultiPoly>;
}

/// Primitive polynomial remainder sequence.
pub struct PrimitivePrs;

impl GcdStrategy for PrimitivePrs {
    fn gcd(&self, u: &MultiPoly, v: &MultiPoly) -> Option<MultiPoly> {
        let top = u.vars.len() as isize - 1;
        gcd_rec(u, v, top)
    }
}

/// GCD of two constant polynomials: integer gcd when both are integers,
/// one otherwise.
fn constant_gcd(u: &MultiPoly, v: &MultiPoly) -> Option<MultiPoly> {
    let cu = u.constant_value()?;
    let cv = v.constant_value()?;
    let g = match (cu.as_integer(), cv.as_integer()) {
        (Some(a), Some(b)) => {
            let g = a.gcd(&b);
            if g == 0 {
                Rational::ZERO
            } else {
                Rational::int(g)
            }
        }
        _ => Rational::ONE,
    };
    Some(MultiPoly::constant(u.vars.clone(), g))
}

/// Content of `u` with respect to variable `level`: the recursive GCD of
/// its coefficient polynomials.
fn content_wrt(u: &MultiPoly, level: isize) -> Option<MultiPoly> {
    let i = level as usize;
    let mut acc: Option<MultiPoly> = None;
    for k in 0..=u.degree_in(i) {
        let c = u.coeff_of(i, k as VarExp);
        if c.is_zero() {
            continue;
        }
        acc = Some(match acc {
            None => c,
            Some(prev) => gcd_rec(&prev, &c, level - 1)?,
        });
        if acc.as_ref().is_some_and(|a| a.is_one()) {
            break;
        }
    }
    acc
}

fn primitive_part(u: &MultiPoly, level: isize) -> Option<MultiPoly> {
    if u.is_zero() {
        return Some(u.clone());
    }
    let cont = content_wrt(u, level)?;
    u.div_exact(&cont)
}

/// Pseudo-remainder of `u` by `v` in variable `level`.
fn prem(u: &MultiPoly, v: &MultiPoly, level: isize) -> Option<MultiPoly> {
    let i = level as usize;
    let n = v.degree_in(i);
    let lc_v = v.leading_coeff_in(i);
    let mut r = u.clone();
    while !r.is_zero() && r.degree_in(i) >= n {
        let m = r.degree_in(i);
        let lc_r = r.leading_coeff_in(i);
        let shifted = v
            .mul(&lc_r)
            .ok()?
            .mul_var_pow(i, (m - n) as VarExp)
            .ok()?;
        r = r.mul(&lc_v).ok()?.sub(&shifted).ok()?;
    }
    Some(r)
}

fn gcd_rec(u: &MultiPoly, v: &MultiPoly, level: isize) -> Option<MultiPoly> {
    if u.is_zero() {
        return Some(v.clone());
    }
    if v.is_zero() {
        return Some(u.clone());
    }
    if level < 0 {
        return constant_gcd(u, v);
    }
    let i = level as usize;
    if u.degree_in(i) == 0 && v.degree_in(i) == 0 {
        return gcd_rec(u, v, level - 1);
    }

    let cont_u = content_wrt(u, level)?;
    let cont_v = content_wrt(v, level)?;
    let c = gcd_rec(&cont_u, &cont_v, level - 1)?;
    let mut a = u.div_exact(&cont_u)?;
    let mut b = v.div_exact(&cont_v)?;
    if a.degree_in(i) < b.degree_in(i) {
        std::mem::swap(&mut a, &mut b);
    }

    while !b.is_zero() {
        let r = prem(&a, &b, level)?;
        a = b;
        b = primitive_part(&r, level)?;
    }

    let g = primitive_part(&a, level)?;
    g.mul(&c).ok()
}

/// Sign of the recursively-leading coefficient with respect to the last
/// variable.
fn leading_sign_negative(g: &MultiPoly, level: isize) -> bool {
    if level < 0 {
        return g.constant_value().is_some_and(|c| c.is_negative());
    }
    let i = level as usize;
    leading_sign_negative(&g.leading_coeff_in(i), level - 1)
}

/// GCD of two polynomial expressions with the default strategy.
pub fn gcd(ctx: &mut Context, u: ExprId, v: ExprId) -> ExprId {
    gcd_with(ctx, u, v, &PrimitivePrs)
}

/// GCD with an explicit strategy, memoized per context.
pub fn gcd_with(ctx: &mut Context, u: ExprId, v: ExprId, strategy: &dyn GcdStrategy) -> ExprId {
    if !is_input_valid(ctx, u) || !is_input_valid(ctx, v) {
        warn!("gcd input is not a valid polynomial expression");
        return ctx.undefined();
    }
    let key = (u.min(v), u.max(v));
    if let Some(&hit) = ctx.memo.gcd.get(&key) {
        return hit;
    }
    let result = gcd_impl(ctx, u, v, strategy);
    ctx.memo.gcd.insert(key, result);
    result
}

fn gcd_impl(ctx: &mut Context, u: ExprId, v: ExprId, strategy: &dyn GcdStrategy) -> ExprId {
    // Trivial cases.
    if canon_ast::views::is_numeric_zero(ctx, u) {
        return v;
    }
    if canon_ast::views::is_numeric_zero(ctx, v) {
        return u;
    }
    if canon_ast::views::is_numeric_one(ctx, u) || canon_ast::views::is_numeric_one(ctx, v) {
        return ctx.num(1);
    }
    if u == v {
        return u;
    }
    if let (Some(a), Some(b)) = (as_number(ctx, u), as_number(ctx, v)) {
        let g = match (a.as_integer(), b.as_integer()) {
            (Some(a), Some(b)) => a.gcd(&b).abs(),
            _ => 1,
        };
        return ctx.num(g);
    }

    // Disjoint symbol sets reduce to integer content.
    if shared_symbols(ctx, u, v).is_empty() {
        let cu = crate::polyinfo::content(ctx, u).unwrap_or(Rational::ONE);
        let cv = crate::polyinfo::content(ctx, v).unwrap_or(Rational::ONE);
        let g = match (cu.as_integer(), cv.as_integer()) {
            (Some(a), Some(b)) if a != 0 && b != 0 => a.gcd(&b).abs(),
            _ => 1,
        };
        return ctx.num(g);
    }

    let Some(vars) = conversion_vars(ctx, u, v) else {
        // Too many variables: degrade to the always-valid divisor.
        return ctx.num(1);
    };
    let (Ok(pu), Ok(pv)) = (
        multipoly::from_expr(ctx, u, &vars),
        multipoly::from_expr(ctx, v, &vars),
    ) else {
        return ctx.num(1);
    };

    let Some(mut g) = strategy.gcd(&pu, &pv) else {
        return ctx.num(1);
    };
    if leading_sign_negative(&g, vars.len() as isize - 1) {
        g = g.neg();
    }
    g.to_expr(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::sub;
    use crate::power::pow;
    use crate::product::product;
    use crate::sum::sum2;
    use canon_ast::DisplayExpr;
    use canon_ast::Expr;

    fn render(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn univariate_common_factor() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let one = ctx.num(1);
        let x2 = pow(&mut ctx, x, two);
        // gcd(x^2 - 1, x - 1) = x - 1
        let u = sub(&mut ctx, x2, one);
        let v = sub(&mut ctx, x, one);
        let g = gcd(&mut ctx, u, v);
        assert_eq!(g, v, "got {}", render(&ctx, g));
    }

    #[test]
    fn integer_contents_for_disjoint_symbols() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let six = ctx.num(6);
        let four = ctx.num(4);
        let u = product(&mut ctx, &[six, x]);
        let v = product(&mut ctx, &[four, y]);
        let g = gcd(&mut ctx, u, v);
        assert_eq!(canon_ast::views::as_integer(&ctx, g), Some(2));
    }

    #[test]
    fn multivariate_monomial_factor() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let z = ctx.var("z");
        let xy = product(&mut ctx, &[x, y]);
        let xz = product(&mut ctx, &[x, z]);
        // gcd(x*y + x*z, x) = x
        let u = sum2(&mut ctx, xy, xz);
        let g = gcd(&mut ctx, u, x);
        assert_eq!(g, x, "got {}", render(&ctx, g));
    }

    #[test]
    fn quadratic_pair() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let one = ctx.num(1);
        let x2 = pow(&mut ctx, x, two);
        let u = sub(&mut ctx, x2, one); // (x-1)(x+1)
        let two_x = product(&mut ctx, &[two, x]);
        let x2_minus_2x = sub(&mut ctx, x2, two_x);
        let v = sum2(&mut ctx, x2_minus_2x, one); // (x-1)^2
        let g = gcd(&mut ctx, u, v);
        let expected = sub(&mut ctx, x, one);
        assert_eq!(g, expected, "got {}", render(&ctx, g));
    }

    #[test]
    fn sign_is_normalized() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        // gcd(1 - x, x - 1) should have a positive leading coefficient
        let u = sub(&mut ctx, one, x);
        let v = sub(&mut ctx, x, one);
        let g = gcd(&mut ctx, u, v);
        assert_eq!(g, v, "got {}", render(&ctx, g));
    }

    #[test]
    fn invalid_input_is_undefined() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let sin = crate::build::func(&mut ctx, "sin", &[x]).unwrap();
        let g = gcd(&mut ctx, sin, x);
        assert!(matches!(ctx.get(g), Expr::Undefined));
    }

    #[test]
    fn gcd_is_memoized() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let u = sum2(&mut ctx, x, one);
        let g1 = gcd(&mut ctx, u, x);
        let g2 = gcd(&mut ctx, u, x);
        assert_eq!(g1, g2);
        assert!(!ctx.memo.gcd.is_empty());
    }

    #[test]
    fn divisibility_of_both_operands() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let one = ctx.num(1);
        let xp1 = sum2(&mut ctx, x, one);
        let yp1 = sum2(&mut ctx, y, one);
        let u = product(&mut ctx, &[xp1, yp1]);
        let xm1 = sub(&mut ctx, x, one);
        let v = product(&mut ctx, &[xp1, xm1]);
        let g = gcd(&mut ctx, u, v);
        assert_eq!(g, xp1, "got {}", render(&ctx, g));
    }
}
