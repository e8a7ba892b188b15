//! Parser-facing construction surface.
//!
//! Everything the parser produces — literals, named symbols, function
//! applications, and the arithmetic spellings `a-b`, `a/b`, `-a` — routes
//! through the canonicalizing factories. The parser itself performs no
//! simplification.

use crate::error::EngineError;
use crate::power::pow;
use crate::product::{negate, product2};
use crate::sum::sum2;
use canon_ast::{Context, Expr, ExprId, FuncKind};
use canon_num::Rational;

/// Integer literal.
pub fn int(ctx: &mut Context, n: i64) -> ExprId {
    ctx.num(n)
}

/// Floating literal; snaps to a nearby fraction on construction.
pub fn float(ctx: &mut Context, x: f64) -> ExprId {
    ctx.rat(Rational::from_f64(x))
}

/// Named symbol, optionally carrying a positivity assumption.
pub fn symbol(ctx: &mut Context, name: &str, positive: bool) -> ExprId {
    if positive {
        ctx.var_positive(name)
    } else {
        ctx.var(name)
    }
}

/// Apply a function head to a canonical argument. Undefined arguments
/// propagate.
pub fn apply(ctx: &mut Context, kind: FuncKind, arg: ExprId) -> ExprId {
    if matches!(ctx.get(arg), Expr::Undefined) {
        return ctx.undefined();
    }
    ctx.add(Expr::Function(kind, arg))
}

/// `a - b` as `a + (-1)*b`.
pub fn sub(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    let neg_b = negate(ctx, b);
    sum2(ctx, a, neg_b)
}

/// `a / b` as `a * b^(-1)`.
pub fn div(ctx: &mut Context, a: ExprId, b: ExprId) -> ExprId {
    let minus_one = ctx.num(-1);
    let inv = pow(ctx, b, minus_one);
    product2(ctx, a, inv)
}

/// `sqrt(x)` as `x^(1/2)`.
pub fn sqrt(ctx: &mut Context, arg: ExprId) -> ExprId {
    let half = ctx.rat(Rational::fraction(1, 2));
    pow(ctx, arg, half)
}

/// Function application by name, covering the full parser surface:
/// sin/cos/tan/asin/acos/atan/log take one argument, `sqrt` lowers to a
/// half power, `pow` to the power factory, and `atan2(y, x)` to
/// `atan(y/x)`.
pub fn func(ctx: &mut Context, name: &str, args: &[ExprId]) -> Result<ExprId, EngineError> {
    let arity = |expected: usize| -> Result<(), EngineError> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidArity {
                name: name.to_string(),
                expected,
                got: args.len(),
            })
        }
    };

    match name {
        "sqrt" => {
            arity(1)?;
            Ok(sqrt(ctx, args[0]))
        }
        "pow" => {
            arity(2)?;
            Ok(pow(ctx, args[0], args[1]))
        }
        "atan2" => {
            arity(2)?;
            let q = div(ctx, args[0], args[1]);
            Ok(apply(ctx, FuncKind::Atan, q))
        }
        _ => match FuncKind::from_name(name) {
            Some(kind) => {
                arity(1)?;
                Ok(apply(ctx, kind, args[0]))
            }
            None => Err(EngineError::UnknownFunction(name.to_string())),
        },
    }
}
