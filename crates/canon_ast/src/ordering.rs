//! Total ordering over expression nodes.
//!
//! The relation decides operand placement in canonical sums and products
//! and the merge direction of every simplifier. It is strict and total:
//! distinct pooled nodes never compare `Equal`.
//!
//! Numbers sort first, then constants, then the structural kinds, with
//! undefined last. Structural kinds compare by looking through their
//! shape, following the usual leading-term conventions: a power compares
//! its base against the other node and then its exponent against one, and
//! sums and products compare as reversed operand lists (last-differing
//! operand most significant), treating a lone node as a one-operand list.
//! Names compare reverse-lexicographically (last character most
//! significant); the positive-flagged symbol wins a name tie.

use crate::expression::{Context, Expr, ExprId};
use canon_num::Rational;
use std::cmp::Ordering;

/// Compare two nodes in the canonical total order.
pub fn compare_expr(ctx: &Context, a: ExprId, b: ExprId) -> Ordering {
    if a == b {
        // Pooling makes id equality structural equality.
        return Ordering::Equal;
    }

    let ra = rank(ctx.get(a));
    let rb = rank(ctx.get(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    if ra == STRUCTURAL_RANK {
        return compare_structural(ctx, a, b);
    }

    match (ctx.get(a), ctx.get(b)) {
        (Expr::Number(x), Expr::Number(y)) => x.compare(y),
        (Expr::Constant(x), Expr::Constant(y)) => compare_names(x.name(), y.name()),
        // Both Undefined would have pooled to the same id.
        _ => Ordering::Equal,
    }
}

const STRUCTURAL_RANK: u8 = 2;

fn rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Number(_) => 0,
        Expr::Constant(_) => 1,
        Expr::Symbol(_)
        | Expr::Function(_, _)
        | Expr::Sum(_)
        | Expr::Pow(_, _)
        | Expr::Product(_) => STRUCTURAL_RANK,
        Expr::Undefined => 3,
    }
}

/// Reverse-lexicographic name comparison: the last character is the most
/// significant.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars().rev().cmp(b.chars().rev())
}

/// Reverse-lexicographic comparison of operand lists: the last differing
/// operand decides; a shorter list sorts first on a common suffix.
fn compare_operands_reversed(ctx: &Context, xs: &[ExprId], ys: &[ExprId]) -> Ordering {
    for (x, y) in xs.iter().rev().zip(ys.iter().rev()) {
        match compare_expr(ctx, *x, *y) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    xs.len().cmp(&ys.len())
}

/// Compare a power's exponent against the implicit exponent `1` of a bare
/// node. Non-numeric exponents rank above any number.
fn compare_exponent_to_one(ctx: &Context, exp: ExprId) -> Ordering {
    match ctx.get(exp) {
        Expr::Number(r) => r.compare(&Rational::ONE),
        _ => Ordering::Greater,
    }
}

/// Pairwise rules among symbols, functions, sums, powers, and products.
fn compare_structural(ctx: &Context, a: ExprId, b: ExprId) -> Ordering {
    match (ctx.get(a), ctx.get(b)) {
        (Expr::Pow(b1, e1), Expr::Pow(b2, e2)) => match compare_expr(ctx, *b1, *b2) {
            Ordering::Equal => compare_expr(ctx, *e1, *e2),
            ord => ord,
        },
        (Expr::Symbol(s1), Expr::Symbol(s2)) => {
            let r1 = ctx.symbol_record(*s1);
            let r2 = ctx.symbol_record(*s2);
            match compare_names(&r1.name, &r2.name) {
                // Same name: the positive-flagged symbol sorts first.
                Ordering::Equal => r2.positive.cmp(&r1.positive),
                ord => ord,
            }
        }
        (Expr::Function(f1, x1), Expr::Function(f2, x2)) => {
            match compare_names(f1.name(), f2.name()) {
                Ordering::Equal => compare_expr(ctx, *x1, *x2),
                ord => ord,
            }
        }
        (Expr::Sum(xs), Expr::Sum(ys)) => compare_operands_reversed(ctx, xs, ys),
        (Expr::Product(xs), Expr::Product(ys)) => compare_operands_reversed(ctx, xs, ys),

        // A product compares against any non-product as the one-factor
        // list [other]: its last factor decides, and on a tie the product
        // (which always has at least two factors) sorts after.
        (Expr::Product(xs), _) => {
            match compare_expr(ctx, *xs.last().expect("products have operands"), b) {
                Ordering::Equal => Ordering::Greater,
                ord => ord,
            }
        }
        (_, Expr::Product(_)) => compare_structural(ctx, b, a).reverse(),

        // A power compares through its base, then its exponent against 1.
        // Equal base and unit exponent is a non-canonical tree; the power
        // deterministically sorts after the bare node.
        (Expr::Pow(pb, pe), _) => match compare_expr(ctx, *pb, b) {
            Ordering::Equal => match compare_exponent_to_one(ctx, *pe) {
                Ordering::Equal => Ordering::Greater,
                ord => ord,
            },
            ord => ord,
        },
        (_, Expr::Pow(_, _)) => compare_structural(ctx, b, a).reverse(),

        // A sum against an atom works like the product rule.
        (Expr::Sum(xs), _) => {
            match compare_expr(ctx, *xs.last().expect("sums have operands"), b) {
                Ordering::Equal => Ordering::Greater,
                ord => ord,
            }
        }
        (_, Expr::Sum(_)) => compare_structural(ctx, b, a).reverse(),

        (Expr::Symbol(_), Expr::Function(_, _)) => Ordering::Less,
        (Expr::Function(_, _), Expr::Symbol(_)) => Ordering::Greater,

        _ => unreachable!("non-structural kind in compare_structural"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Constant, FuncKind};

    #[test]
    fn numbers_sort_before_symbols() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let x = ctx.var("x");
        assert_eq!(compare_expr(&ctx, two, x), Ordering::Less);
        assert_eq!(compare_expr(&ctx, x, two), Ordering::Greater);
    }

    #[test]
    fn numbers_sort_by_value() {
        let mut ctx = Context::new();
        let a = ctx.rat(Rational::fraction(1, 2));
        let b = ctx.num(1);
        assert_eq!(compare_expr(&ctx, a, b), Ordering::Less);
    }

    #[test]
    fn constants_sort_between_numbers_and_symbols() {
        let mut ctx = Context::new();
        let pi = ctx.constant(Constant::Pi);
        let e = ctx.constant(Constant::E);
        let x = ctx.var("x");
        let two = ctx.num(2);
        assert_eq!(compare_expr(&ctx, e, pi), Ordering::Less);
        assert_eq!(compare_expr(&ctx, two, e), Ordering::Less);
        assert_eq!(compare_expr(&ctx, pi, x), Ordering::Less);
    }

    #[test]
    fn symbols_sort_by_name() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        assert_eq!(compare_expr(&ctx, a, b), Ordering::Less);
    }

    #[test]
    fn positive_symbol_wins_name_tie() {
        let mut ctx = Context::new();
        let plain = ctx.var("x");
        let positive = ctx.var_positive("x");
        assert_eq!(compare_expr(&ctx, positive, plain), Ordering::Less);
        assert_eq!(compare_expr(&ctx, plain, positive), Ordering::Greater);
    }

    #[test]
    fn power_compares_through_base() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let two = ctx.num(2);
        let x2 = ctx.add(Expr::Pow(x, two));
        // x^2 vs x: equal base, exponent 2 > 1
        assert_eq!(compare_expr(&ctx, x2, x), Ordering::Greater);
        // x^2 vs y: base x < y
        assert_eq!(compare_expr(&ctx, x2, y), Ordering::Less);
        assert_eq!(compare_expr(&ctx, y, x2), Ordering::Greater);
    }

    #[test]
    fn product_compares_by_last_factor() {
        let mut ctx = Context::new();
        let three = ctx.num(3);
        let x = ctx.var("x");
        let two = ctx.num(2);
        let x2 = ctx.add(Expr::Pow(x, two));
        let three_x = ctx.add(Expr::Product(vec![three, x]));
        let three_x2 = ctx.add(Expr::Product(vec![three, x2]));
        // 3x vs x: tie on x, product is longer
        assert_eq!(compare_expr(&ctx, three_x, x), Ordering::Greater);
        // 3x vs x^2: degree decides
        assert_eq!(compare_expr(&ctx, three_x, x2), Ordering::Less);
        // 3x vs 3x^2
        assert_eq!(compare_expr(&ctx, three_x, three_x2), Ordering::Less);
        // x^3 sorts after 3x^2
        let cube = ctx.num(3);
        let x3 = ctx.add(Expr::Pow(x, cube));
        assert_eq!(compare_expr(&ctx, three_x2, x3), Ordering::Less);
    }

    #[test]
    fn sum_compares_by_last_operand() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let c = ctx.var("c");
        let ab = ctx.add(Expr::Sum(vec![a, b]));
        // (a+b) vs c: last operand b < c
        assert_eq!(compare_expr(&ctx, ab, c), Ordering::Less);
        // (a+b) vs b: last operand equal, sum is longer
        assert_eq!(compare_expr(&ctx, ab, b), Ordering::Greater);
    }

    #[test]
    fn sums_compare_last_differing_operand() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let c = ctx.var("c");
        let ac = ctx.add(Expr::Sum(vec![a, c]));
        let bc = ctx.add(Expr::Sum(vec![b, c]));
        // Common last operand c; a < b decides.
        assert_eq!(compare_expr(&ctx, ac, bc), Ordering::Less);
    }

    #[test]
    fn functions_sort_by_name_then_argument() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let sin_x = ctx.add(Expr::Function(FuncKind::Sin, x));
        let sin_y = ctx.add(Expr::Function(FuncKind::Sin, y));
        let cos_x = ctx.add(Expr::Function(FuncKind::Cos, x));
        assert_eq!(compare_expr(&ctx, sin_x, sin_y), Ordering::Less);
        // reverse-lexicographic: "nis" vs "soc"
        assert_eq!(compare_expr(&ctx, sin_x, cos_x), Ordering::Less);
        // symbol < function among atoms
        assert_eq!(compare_expr(&ctx, x, sin_x), Ordering::Less);
        // power of x vs sin(x): base x < sin(x)
        let two = ctx.num(2);
        let x2 = ctx.add(Expr::Pow(x, two));
        assert_eq!(compare_expr(&ctx, x2, sin_x), Ordering::Less);
    }

    #[test]
    fn order_is_antisymmetric_and_strict() {
        let mut ctx = Context::new();
        let two = ctx.num(2);
        let x = ctx.var("x");
        let y = ctx.var("y");
        let sin_x = ctx.add(Expr::Function(FuncKind::Sin, x));
        let x2 = ctx.add(Expr::Pow(x, two));
        let sum = ctx.add(Expr::Sum(vec![x, y]));
        let prod = ctx.add(Expr::Product(vec![two, x]));
        let pi = ctx.constant(Constant::Pi);
        let all = [two, pi, x, y, sin_x, x2, sum, prod];
        for &p in &all {
            for &q in &all {
                let pq = compare_expr(&ctx, p, q);
                let qp = compare_expr(&ctx, q, p);
                assert_eq!(pq, qp.reverse(), "antisymmetry for {:?} {:?}", p, q);
                if p == q {
                    assert_eq!(pq, Ordering::Equal);
                } else {
                    assert_ne!(pq, Ordering::Equal, "distinct nodes compare equal");
                }
            }
        }
    }
}
