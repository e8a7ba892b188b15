//! Diagnostic formatter for expression trees.
//!
//! Renders a pooled tree as infix text with minimal parentheses. This is
//! the ambient debug surface used by warnings and test assertions; the
//! user-facing pretty-printer is a separate layer.

use crate::expression::{Context, Expr, ExprId};
use canon_num::Rational;
use std::fmt;

/// Borrow of a context plus the node to render.
pub struct DisplayExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Sum(_) => 1,
        Expr::Product(_) => 2,
        Expr::Pow(_, _) => 3,
        Expr::Number(Rational::Fraction { .. }) => 2,
        Expr::Number(r) if r.is_negative() => 1,
        _ => 5,
    }
}

impl DisplayExpr<'_> {
    fn write(&self, f: &mut fmt::Formatter<'_>, id: ExprId, parent_prec: u8) -> fmt::Result {
        let ctx = self.context;
        let expr = ctx.get(id);
        let prec = precedence(expr);
        let parens = prec < parent_prec;
        if parens {
            write!(f, "(")?;
        }
        match expr {
            Expr::Number(r) => write!(f, "{}", r)?,
            Expr::Constant(c) => write!(f, "{}", c.name())?,
            Expr::Symbol(s) => write!(f, "{}", ctx.symbol_record(*s).name)?,
            Expr::Undefined => write!(f, "undefined")?,
            Expr::Function(func, arg) => {
                write!(f, "{}(", func.name())?;
                self.write(f, *arg, 0)?;
                write!(f, ")")?;
            }
            Expr::Sum(ops) => {
                for (i, &op) in ops.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    self.write(f, op, 1)?;
                }
            }
            Expr::Product(ops) => {
                for (i, &op) in ops.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    self.write(f, op, 2)?;
                }
            }
            Expr::Pow(base, exp) => {
                self.write(f, *base, 4)?;
                write!(f, "^")?;
                self.write(f, *exp, 4)?;
            }
        }
        if parens {
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, self.id, 0)
    }
}
