//! Structural polynomial queries over expression trees.
//!
//! Input validation and the symbol ordering used by the multivariate GCD,
//! plus degree/coefficient/content accessors for downstream consumers.
//! Kinds with no polynomial meaning answer with the usual defaults (degree
//! zero, coefficient absent) instead of erroring.

use crate::multipoly::{self, MAX_VARS};
use canon_ast::views::{as_number, collect_symbols};
use canon_ast::{Context, Expr, ExprId};
use canon_num::Rational;

/// True when the tree is built only from exact numerics, symbols, sums,
/// products, and non-negative-integer-exponent powers.
pub fn is_input_valid(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Number(r) => r.is_exact(),
        Expr::Symbol(_) => true,
        Expr::Sum(ops) | Expr::Product(ops) => ops.iter().all(|&op| is_input_valid(ctx, op)),
        Expr::Pow(base, exp) => {
            let ok_exp = as_number(ctx, *exp)
                .filter(|e| e.is_exact())
                .and_then(|e| e.as_integer())
                .is_some_and(|e| e >= 0);
            ok_exp && is_input_valid(ctx, *base)
        }
        Expr::Constant(_) | Expr::Function(_, _) | Expr::Undefined => false,
    }
}

/// Minimum degree of `sym` across the terms of `id` (zero when absent).
pub fn min_degree(ctx: &Context, id: ExprId, sym: ExprId) -> u32 {
    match ctx.get(id) {
        Expr::Symbol(_) => u32::from(id == sym),
        Expr::Sum(ops) => ops
            .iter()
            .map(|&op| min_degree(ctx, op, sym))
            .min()
            .unwrap_or(0),
        Expr::Product(ops) => ops.iter().map(|&op| min_degree(ctx, op, sym)).sum(),
        Expr::Pow(base, exp) => {
            let k = as_number(ctx, *exp)
                .and_then(|e| e.as_integer())
                .unwrap_or(0)
                .max(0) as u32;
            k * min_degree(ctx, *base, sym)
        }
        _ => 0,
    }
}

/// Maximum degree of `sym` in `id` (zero when absent or non-polynomial).
pub fn degree(ctx: &Context, id: ExprId, sym: ExprId) -> u32 {
    match ctx.get(id) {
        Expr::Symbol(_) => u32::from(id == sym),
        Expr::Sum(ops) => ops
            .iter()
            .map(|&op| degree(ctx, op, sym))
            .max()
            .unwrap_or(0),
        Expr::Product(ops) => ops.iter().map(|&op| degree(ctx, op, sym)).sum(),
        Expr::Pow(base, exp) => {
            let k = as_number(ctx, *exp)
                .and_then(|e| e.as_integer())
                .unwrap_or(0)
                .max(0) as u32;
            k * degree(ctx, *base, sym)
        }
        _ => 0,
    }
}

/// Shared symbols of `u` and `v`, ordered by increasing minimum degree
/// (the smaller of the two sides), ties broken by name.
pub fn shared_symbols(ctx: &Context, u: ExprId, v: ExprId) -> Vec<ExprId> {
    let mut su = Vec::new();
    collect_symbols(ctx, u, &mut su);
    let mut sv = Vec::new();
    collect_symbols(ctx, v, &mut sv);
    let mut shared: Vec<ExprId> = su.into_iter().filter(|s| sv.contains(s)).collect();
    shared.sort_by(|&a, &b| {
        let da = min_degree(ctx, u, a).min(min_degree(ctx, v, a));
        let db = min_degree(ctx, u, b).min(min_degree(ctx, v, b));
        da.cmp(&db).then_with(|| {
            let na = symbol_name(ctx, a);
            let nb = symbol_name(ctx, b);
            na.cmp(nb)
        })
    });
    shared
}

fn symbol_name<'a>(ctx: &'a Context, id: ExprId) -> &'a str {
    match ctx.get(id) {
        Expr::Symbol(s) => ctx.symbol_record(*s).name.as_str(),
        _ => "",
    }
}

/// Variable order for converting the pair: symbols exclusive to either
/// side first, shared symbols last so the most significant shared symbol
/// is the final one. `None` when the union exceeds the polynomial layer's
/// variable capacity.
pub fn conversion_vars(ctx: &Context, u: ExprId, v: ExprId) -> Option<Vec<ExprId>> {
    let shared = shared_symbols(ctx, u, v);
    let mut all = Vec::new();
    collect_symbols(ctx, u, &mut all);
    collect_symbols(ctx, v, &mut all);
    let mut vars: Vec<ExprId> = all
        .into_iter()
        .filter(|s| !shared.contains(s))
        .collect();
    vars.dedup();
    vars.extend(shared);
    if vars.len() > MAX_VARS {
        None
    } else {
        Some(vars)
    }
}

/// Coefficient of `sym^k` in `id`, when `id` is valid polynomial input.
pub fn coeff(ctx: &mut Context, id: ExprId, sym: ExprId, k: u32) -> Option<ExprId> {
    if !is_input_valid(ctx, id) {
        return None;
    }
    let mut vars = Vec::new();
    collect_symbols(ctx, id, &mut vars);
    if !vars.contains(&sym) {
        vars.push(sym);
    }
    if vars.len() > MAX_VARS {
        return None;
    }
    let i = vars.iter().position(|&s| s == sym)?;
    let p = multipoly::from_expr(ctx, id, &vars).ok()?;
    if k > p.degree_in(i) {
        let zero = ctx.num(0);
        return Some(zero);
    }
    Some(p.coeff_of(i, k as u16).to_expr(ctx))
}

/// Integer content of a valid polynomial input.
pub fn content(ctx: &Context, id: ExprId) -> Option<Rational> {
    if !is_input_valid(ctx, id) {
        return None;
    }
    let mut vars = Vec::new();
    collect_symbols(ctx, id, &mut vars);
    if vars.len() > MAX_VARS {
        return None;
    }
    let p = multipoly::from_expr(ctx, id, &vars).ok()?;
    Some(p.integer_content())
}
