//! Rational normal form.
//!
//! `normal` rewrites an expression as a single fraction of two polynomial
//! expressions. Subtrees with no polynomial reading — constants, function
//! applications, powers with non-integer exponents — are swapped for
//! synthesized placeholder symbols for the duration of the call and
//! substituted back at the end, so mixed expressions still cancel through
//! their polynomial skeleton. Denominators combine over GCD-derived least
//! common multiples and every intermediate fraction is reduced.

use crate::build;
use crate::expand::expand;
use crate::gcd::gcd;
use crate::multipoly;
use crate::polyinfo::is_input_valid;
use crate::power::pow;
use crate::product::product2;
use crate::substitute::substitute;
use crate::sum::sum2;
use canon_ast::views::{as_number, collect_symbols, is_numeric_one, is_numeric_zero};
use canon_ast::{Context, Expr, ExprId};
use canon_num::Rational;

/// An unevaluated quotient of two expressions; the denominator defaults to
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub num: ExprId,
    pub den: ExprId,
}

impl Fraction {
    fn whole(ctx: &mut Context, num: ExprId) -> Self {
        let den = ctx.num(1);
        Self { num, den }
    }
}

/// Placeholder symbols introduced by one normalization call, with the
/// subexpressions they stand for. Scoped to that call.
#[derive(Default)]
struct TempMap {
    /// `(original, placeholder)` in insertion order; later placeholders may
    /// reference earlier ones, so back-substitution walks in reverse.
    entries: Vec<(ExprId, ExprId)>,
}

impl TempMap {
    fn temp_for(&mut self, ctx: &mut Context, original: ExprId) -> ExprId {
        if let Some(&(_, temp)) = self.entries.iter().find(|&&(o, _)| o == original) {
            return temp;
        }
        let (_, temp) = ctx.fresh_temp();
        self.entries.push((original, temp));
        temp
    }
}

/// Rational normal form of `id`, memoized on the context.
pub fn normal(ctx: &mut Context, id: ExprId) -> ExprId {
    if let Some(&hit) = ctx.memo.normal.get(&id) {
        return hit;
    }
    let mut map = TempMap::default();
    let frac = normal_fraction(ctx, &mut map, id);
    let combined = if is_numeric_one(ctx, frac.den) {
        frac.num
    } else {
        build::div(ctx, frac.num, frac.den)
    };
    let mut result = combined;
    for i in (0..map.entries.len()).rev() {
        let (original, temp) = map.entries[i];
        result = substitute(ctx, result, temp, original);
    }
    ctx.memo.normal.insert(id, result);
    result
}

fn normal_fraction(ctx: &mut Context, map: &mut TempMap, id: ExprId) -> Fraction {
    match ctx.get(id).clone() {
        Expr::Number(_) | Expr::Symbol(_) | Expr::Undefined => Fraction::whole(ctx, id),
        Expr::Constant(_) | Expr::Function(_, _) => {
            let t = map.temp_for(ctx, id);
            Fraction::whole(ctx, t)
        }
        Expr::Sum(ops) => {
            let mut acc = None;
            for &op in &ops {
                let f = normal_fraction(ctx, map, op);
                acc = Some(match acc {
                    None => f,
                    Some(prev) => add_fractions(ctx, prev, f),
                });
            }
            acc.expect("sums have operands")
        }
        Expr::Product(ops) => {
            let mut acc = None;
            for &op in &ops {
                let f = normal_fraction(ctx, map, op);
                acc = Some(match acc {
                    None => f,
                    Some(prev) => mul_fractions(ctx, prev, f),
                });
            }
            acc.expect("products have operands")
        }
        Expr::Pow(base, exp) => {
            let e = as_number(ctx, exp).filter(|e| e.is_exact());
            match e {
                Some(e) if e.is_integer() => {
                    let k = e.as_integer().unwrap_or(0);
                    let fb = normal_fraction(ctx, map, base);
                    let (num_base, den_base, k) = if k >= 0 {
                        (fb.num, fb.den, k)
                    } else {
                        (fb.den, fb.num, -k)
                    };
                    let kn = ctx.num(k);
                    let num = pow(ctx, num_base, kn);
                    let num = expand(ctx, num);
                    let den = pow(ctx, den_base, kn);
                    let den = expand(ctx, den);
                    reduce(ctx, Fraction { num, den })
                }
                Some(_) => {
                    // Fractional numeric exponent: apply it to both sides
                    // of the base's normal form, atomizing what stays
                    // non-polynomial.
                    let fb = normal_fraction(ctx, map, base);
                    let num = pow(ctx, fb.num, exp);
                    let den = pow(ctx, fb.den, exp);
                    let num = atomize(ctx, map, num);
                    let den = atomize(ctx, map, den);
                    Fraction { num, den }
                }
                None => {
                    let t = map.temp_for(ctx, id);
                    Fraction::whole(ctx, t)
                }
            }
        }
    }
}

/// Keep polynomial nodes, replace anything else with a placeholder.
fn atomize(ctx: &mut Context, map: &mut TempMap, id: ExprId) -> ExprId {
    if is_input_valid(ctx, id) {
        id
    } else if matches!(ctx.get(id), Expr::Undefined) {
        id
    } else {
        map.temp_for(ctx, id)
    }
}

fn add_fractions(ctx: &mut Context, a: Fraction, b: Fraction) -> Fraction {
    if a.den == b.den {
        let num = sum2(ctx, a.num, b.num);
        return reduce(
            ctx,
            Fraction {
                num,
                den: a.den,
            },
        );
    }
    let g = gcd(ctx, a.den, b.den);
    let (bd_over_g, ad_over_g) = if is_numeric_one(ctx, g) {
        (b.den, a.den)
    } else {
        (
            divide_polys(ctx, b.den, g).unwrap_or(b.den),
            divide_polys(ctx, a.den, g).unwrap_or(a.den),
        )
    };
    let lcm = product2(ctx, a.den, bd_over_g);
    let lcm = expand(ctx, lcm);
    let left = product2(ctx, a.num, bd_over_g);
    let left = expand(ctx, left);
    let right = product2(ctx, b.num, ad_over_g);
    let right = expand(ctx, right);
    let num = sum2(ctx, left, right);
    reduce(ctx, Fraction { num, den: lcm })
}

fn mul_fractions(ctx: &mut Context, a: Fraction, b: Fraction) -> Fraction {
    let num = product2(ctx, a.num, b.num);
    let num = expand(ctx, num);
    let den = product2(ctx, a.den, b.den);
    let den = expand(ctx, den);
    reduce(ctx, Fraction { num, den })
}

/// Cancel the GCD of numerator and denominator and absorb numeric
/// denominators into the numerator.
fn reduce(ctx: &mut Context, f: Fraction) -> Fraction {
    if is_numeric_zero(ctx, f.num) {
        return Fraction::whole(ctx, f.num);
    }
    if is_numeric_one(ctx, f.den) {
        return f;
    }
    if let Some(c) = as_number(ctx, f.den) {
        let inv = ctx.rat(Rational::ONE / c);
        let num = product2(ctx, inv, f.num);
        let num = expand(ctx, num);
        return Fraction::whole(ctx, num);
    }
    let g = gcd(ctx, f.num, f.den);
    if is_numeric_one(ctx, g) || matches!(ctx.get(g), Expr::Undefined) {
        return f;
    }
    let (num, den) = match (
        divide_polys(ctx, f.num, g),
        divide_polys(ctx, f.den, g),
    ) {
        (Some(n), Some(d)) => (n, d),
        _ => return f,
    };
    if let Some(c) = as_number(ctx, den) {
        let inv = ctx.rat(Rational::ONE / c);
        let num = product2(ctx, inv, num);
        let num = expand(ctx, num);
        return Fraction::whole(ctx, num);
    }
    Fraction { num, den }
}

/// Exact polynomial quotient at the expression level.
fn divide_polys(ctx: &mut Context, a: ExprId, b: ExprId) -> Option<ExprId> {
    let mut vars = Vec::new();
    collect_symbols(ctx, a, &mut vars);
    collect_symbols(ctx, b, &mut vars);
    if vars.len() > multipoly::MAX_VARS {
        return None;
    }
    let pa = multipoly::from_expr(ctx, a, &vars).ok()?;
    let pb = multipoly::from_expr(ctx, b, &vars).ok()?;
    let q = pa.div_exact(&pb)?;
    Some(q.to_expr(ctx))
}
