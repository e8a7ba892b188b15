//! Expression arena for CanonCAS.
//!
//! Defines the closed set of node kinds, the pooling [`Context`] arena that
//! owns them (plus the symbol table, memo caches, and the factorization
//! resolution limit), the canonical total [`ordering`] over nodes, and
//! read-only [`views`] for downstream consumers.
//!
//! This crate pools but does not simplify; the canonicalizing construction
//! surface lives in `canon_engine`.

pub mod cache;
pub mod display;
pub mod expression;
pub mod ordering;
pub mod views;

pub use cache::MemoCache;
pub use display::DisplayExpr;
pub use expression::{Constant, Context, Expr, ExprId, FuncKind, SymbolId, SymbolRecord, SymbolTable};
pub use ordering::compare_expr;
