//! Full polynomial distribution.
//!
//! `expand` pushes every product over every sum and opens integer powers
//! of sums, memoizing per node. Sums raised to a power take a direct
//! multinomial fast path when the estimated output stays within budget;
//! otherwise expansion falls back to repeated multiplication, and past the
//! exponent budget the power is left closed rather than erroring.

use crate::build::apply;
use crate::power::pow;
use crate::product::{product, product2};
use crate::sum::sum;
use canon_ast::views::as_number;
use canon_ast::{Context, Expr, ExprId};

/// Limits for opening `(sum)^n`.
#[derive(Clone, Copy, Debug)]
pub struct ExpandBudget {
    /// Largest integer exponent opened at all.
    pub max_exp: u32,
    /// Estimated output terms above which the multinomial path falls back
    /// to repeated multiplication.
    pub max_output_terms: usize,
}

impl Default for ExpandBudget {
    fn default() -> Self {
        Self {
            max_exp: 16,
            max_output_terms: 50_000,
        }
    }
}

/// Expand with the default budget, memoized on the context.
pub fn expand(ctx: &mut Context, id: ExprId) -> ExprId {
    expand_with_budget(ctx, id, &ExpandBudget::default())
}

/// Expand with an explicit budget.
pub fn expand_with_budget(ctx: &mut Context, id: ExprId, budget: &ExpandBudget) -> ExprId {
    if let Some(&hit) = ctx.memo.expand.get(&id) {
        return hit;
    }
    let result = match ctx.get(id).clone() {
        Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) | Expr::Undefined => id,
        Expr::Function(kind, arg) => {
            let inner = expand_with_budget(ctx, arg, budget);
            if inner == arg {
                id
            } else {
                apply(ctx, kind, inner)
            }
        }
        Expr::Sum(ops) => {
            let expanded: Vec<ExprId> = ops
                .iter()
                .map(|&op| expand_with_budget(ctx, op, budget))
                .collect();
            sum(ctx, &expanded)
        }
        Expr::Product(ops) => {
            let expanded: Vec<ExprId> = ops
                .iter()
                .map(|&op| expand_with_budget(ctx, op, budget))
                .collect();
            let mut acc = expanded[0];
            for &op in &expanded[1..] {
                acc = expand_product2(ctx, acc, op);
            }
            acc
        }
        Expr::Pow(base, exp) => {
            let base = expand_with_budget(ctx, base, budget);
            let exp = expand_with_budget(ctx, exp, budget);
            let int_exp = as_number(ctx, exp)
                .filter(|e| e.is_exact() && e.is_integer())
                .and_then(|e| e.as_integer());
            match (ctx.get(base).clone(), int_exp) {
                (Expr::Sum(ops), Some(n)) if n >= 2 && n <= i64::from(budget.max_exp) => {
                    expand_sum_power(ctx, base, &ops, n as u32, budget)
                }
                _ => pow(ctx, base, exp),
            }
        }
    };
    ctx.memo.expand.insert(id, result);
    result
}

/// Multiply two expanded operands, distributing over sums.
fn expand_product2(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    if let Expr::Sum(ops) = ctx.get(a).clone() {
        let terms: Vec<ExprId> = ops
            .iter()
            .map(|&t| expand_product2(ctx, t, b))
            .collect();
        return sum(ctx, &terms);
    }
    if let Expr::Sum(ops) = ctx.get(b).clone() {
        let terms: Vec<ExprId> = ops
            .iter()
            .map(|&t| expand_product2(ctx, a, t))
            .collect();
        return sum(ctx, &terms);
    }
    product2(ctx, a, b)
}

/// Estimated number of multinomial terms: C(n+k-1, k-1), saturating.
fn estimate_terms(n: u32, k: usize, cap: usize) -> usize {
    let mut acc: u128 = 1;
    for i in 1..k {
        acc = acc * (n as u128 + i as u128) / i as u128;
        if acc > cap as u128 {
            return cap + 1;
        }
    }
    acc as usize
}

fn factorial_table(n: u32) -> Vec<i64> {
    let mut table = vec![1i64; n as usize + 1];
    for i in 1..=n as usize {
        table[i] = table[i - 1] * i as i64;
    }
    table
}

fn enumerate_compositions(n: u32, k: usize, current: &mut Vec<u32>, f: &mut impl FnMut(&[u32])) {
    if k == 1 {
        current.push(n);
        f(current);
        current.pop();
        return;
    }
    for first in 0..=n {
        current.push(first);
        enumerate_compositions(n - first, k - 1, current, f);
        current.pop();
    }
}

/// Open `(t_1 + ... + t_k)^n` with multinomial coefficients, falling back
/// to repeated multiplication when the term estimate exceeds the budget.
fn expand_sum_power(
    ctx: &mut Context,
    base: ExprId,
    ops: &[ExprId],
    n: u32,
    budget: &ExpandBudget,
) -> ExprId {
    let k = ops.len();
    if estimate_terms(n, k, budget.max_output_terms) > budget.max_output_terms {
        let mut acc = base;
        for _ in 1..n {
            acc = expand_product2(ctx, acc, base);
        }
        return acc;
    }

    let fact = factorial_table(n);
    let mut terms = Vec::new();
    let mut composition = Vec::with_capacity(k);
    enumerate_compositions(n, k, &mut composition, &mut |comp| {
        let mut coeff = fact[n as usize];
        for &c in comp {
            coeff /= fact[c as usize];
        }
        let mut factors = Vec::with_capacity(k + 1);
        factors.push(ctx.num(coeff));
        for (i, &c) in comp.iter().enumerate() {
            if c > 0 {
                let e = ctx.num(i64::from(c));
                factors.push(pow(ctx, ops[i], e));
            }
        }
        terms.push(product(ctx, &factors));
    });
    sum(ctx, &terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sum::sum2;
    use canon_ast::DisplayExpr;

    fn render(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn binomial_square_opens() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let two = ctx.num(2);
        let s = sum2(&mut ctx, a, b);
        let p = pow(&mut ctx, s, two);
        let e = expand(&mut ctx, p);
        match ctx.get(e) {
            Expr::Sum(ops) => assert_eq!(ops.len(), 3),
            other => panic!("expected three-term sum, got {:?}", other),
        }
        assert_eq!(render(&ctx, e), "a^2 + 2*a*b + b^2");
    }

    #[test]
    fn product_of_sums_distributes() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let c = ctx.var("c");
        let d = ctx.var("d");
        let ab = sum2(&mut ctx, a, b);
        let cd = sum2(&mut ctx, c, d);
        let p = product2(&mut ctx, ab, cd);
        let e = expand(&mut ctx, p);
        match ctx.get(e) {
            Expr::Sum(ops) => assert_eq!(ops.len(), 4),
            other => panic!("expected four-term sum, got {:?}", other),
        }
    }

    #[test]
    fn expansion_cancels_constructed_difference() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let two = ctx.num(2);
        let s = sum2(&mut ctx, a, b);
        let squared = pow(&mut ctx, s, two);
        let opened = expand(&mut ctx, squared);
        let diff = crate::build::sub(&mut ctx, opened, squared);
        // (a+b)^2 expanded minus itself expands to zero
        let r = expand(&mut ctx, diff);
        assert!(canon_ast::views::is_numeric_zero(&ctx, r));
    }

    #[test]
    fn expand_is_memoized() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let three = ctx.num(3);
        let s = sum2(&mut ctx, a, b);
        let p = pow(&mut ctx, s, three);
        let first = expand(&mut ctx, p);
        let again = expand(&mut ctx, p);
        assert_eq!(first, again);
        assert!(ctx.memo.expand.contains_key(&p));
    }

    #[test]
    fn expand_is_idempotent() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let two = ctx.num(2);
        let s = sum2(&mut ctx, a, b);
        let p = pow(&mut ctx, s, two);
        let once = expand(&mut ctx, p);
        let twice = expand(&mut ctx, once);
        assert_eq!(once, twice);
    }

    #[test]
    fn cube_uses_multinomial_coefficients() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let three = ctx.num(3);
        let s = sum2(&mut ctx, x, one);
        let p = pow(&mut ctx, s, three);
        let e = expand(&mut ctx, p);
        assert_eq!(render(&ctx, e), "1 + 3*x + 3*x^2 + x^3");
    }
}
