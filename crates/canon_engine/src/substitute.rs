//! Structural substitution.

use crate::build::apply;
use crate::power::pow;
use crate::product::product;
use crate::sum::sum;
use canon_ast::{Context, Expr, ExprId};

/// Replace every occurrence of `target` in `id` by `replacement`,
/// rebuilding through the canonicalizing factories on the way out.
pub fn substitute(
    ctx: &mut Context,
    id: ExprId,
    target: ExprId,
    replacement: ExprId,
) -> ExprId {
    if id == target {
        return replacement;
    }
    match ctx.get(id).clone() {
        Expr::Number(_) | Expr::Constant(_) | Expr::Symbol(_) | Expr::Undefined => id,
        Expr::Function(kind, arg) => {
            let new_arg = substitute(ctx, arg, target, replacement);
            if new_arg == arg {
                id
            } else {
                apply(ctx, kind, new_arg)
            }
        }
        Expr::Sum(ops) => {
            let new_ops: Vec<ExprId> = ops
                .iter()
                .map(|&op| substitute(ctx, op, target, replacement))
                .collect();
            if new_ops == ops {
                id
            } else {
                sum(ctx, &new_ops)
            }
        }
        Expr::Product(ops) => {
            let new_ops: Vec<ExprId> = ops
                .iter()
                .map(|&op| substitute(ctx, op, target, replacement))
                .collect();
            if new_ops == ops {
                id
            } else {
                product(ctx, &new_ops)
            }
        }
        Expr::Pow(base, exp) => {
            let new_base = substitute(ctx, base, target, replacement);
            let new_exp = substitute(ctx, exp, target, replacement);
            if new_base == base && new_exp == exp {
                id
            } else {
                pow(ctx, new_base, new_exp)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sum::sum2;
    use canon_ast::views::as_integer;

    #[test]
    fn replaces_symbol_and_resimplifies() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let one = ctx.num(1);
        let s = sum2(&mut ctx, x, one);
        let two = ctx.num(2);
        let r = substitute(&mut ctx, s, x, two);
        assert_eq!(as_integer(&ctx, r), Some(3));
    }

    #[test]
    fn untouched_tree_keeps_its_id() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let z = ctx.var("z");
        let s = sum2(&mut ctx, x, y);
        assert_eq!(substitute(&mut ctx, s, z, x), s);
    }

    #[test]
    fn substitutes_inside_functions() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let sin = crate::build::func(&mut ctx, "sin", &[x]).unwrap();
        let r = substitute(&mut ctx, sin, x, y);
        match ctx.get(r) {
            Expr::Function(_, arg) => assert_eq!(*arg, y),
            other => panic!("expected function, got {:?}", other),
        }
    }
}
