//! Expression nodes and the owning arena.
//!
//! All nodes live in a [`Context`]: an append-only arena addressed by
//! [`ExprId`]. Structurally identical nodes are pooled (hash-consed), so
//! `ExprId` equality coincides with structural equality and subtree sharing
//! is free. Nodes are immutable once added; the arena only grows.
//!
//! Construction through [`Context::add`] pools but does not simplify.
//! Canonicalizing factories (sums, products, powers) live in the engine
//! crate and are the only construction surface exposed to library users;
//! everything observable through them is already in canonical form.

use crate::cache::MemoCache;
use canon_num::{Rational, DEFAULT_RESOLUTION_LIMIT};
use rustc_hash::FxHashMap;

/// Unique identifier of an interned symbol (name + positivity).
pub type SymbolId = usize;

/// One interned symbol: its name and whether it is assumed positive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolRecord {
    pub name: String,
    pub positive: bool,
}

/// Symbol table interning `(name, positivity)` pairs.
///
/// The same name with different positivity interns to distinct ids; the
/// ordering relation breaks that tie in favor of the positive one.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    records: Vec<SymbolRecord>,
    lookup: FxHashMap<(String, bool), SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a symbol, returning the existing id when already present.
    pub fn intern(&mut self, name: &str, positive: bool) -> SymbolId {
        if let Some(&id) = self.lookup.get(&(name.to_string(), positive)) {
            return id;
        }
        let id = self.records.len();
        self.records.push(SymbolRecord {
            name: name.to_string(),
            positive,
        });
        self.lookup.insert((name.to_string(), positive), id);
        id
    }

    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn resolve(&self, id: SymbolId) -> &SymbolRecord {
        &self.records[id]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Index of a pooled node inside its [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn name(&self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

/// Closed family of single-argument function heads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncKind {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log,
}

impl FuncKind {
    pub fn name(&self) -> &'static str {
        match self {
            FuncKind::Sin => "sin",
            FuncKind::Cos => "cos",
            FuncKind::Tan => "tan",
            FuncKind::Asin => "asin",
            FuncKind::Acos => "acos",
            FuncKind::Atan => "atan",
            FuncKind::Log => "log",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => FuncKind::Sin,
            "cos" => FuncKind::Cos,
            "tan" => FuncKind::Tan,
            "asin" => FuncKind::Asin,
            "acos" => FuncKind::Acos,
            "atan" => FuncKind::Atan,
            "log" => FuncKind::Log,
            _ => return None,
        })
    }

    pub fn eval_f64(&self, x: f64) -> f64 {
        match self {
            FuncKind::Sin => x.sin(),
            FuncKind::Cos => x.cos(),
            FuncKind::Tan => x.tan(),
            FuncKind::Asin => x.asin(),
            FuncKind::Acos => x.acos(),
            FuncKind::Atan => x.atan(),
            FuncKind::Log => x.ln(),
        }
    }
}

/// The closed set of node kinds.
///
/// Invariants maintained by the canonicalizing factories:
/// - `Number` never wraps `Rational::Undefined` (that is the `Undefined`
///   node).
/// - `Sum`/`Product` hold at least two operands, none of the same kind as
///   the parent, ordered by [`crate::ordering::compare_expr`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(Rational),
    Constant(Constant),
    Symbol(SymbolId),
    Function(FuncKind, ExprId),
    Sum(Vec<ExprId>),
    Product(Vec<ExprId>),
    Pow(ExprId, ExprId),
    Undefined,
}

/// Owning arena: node pool, symbol table, memo caches, and the numeric
/// resolution limit. All per-process mutable state of the core lives here,
/// threaded through calls as `&mut Context`; there are no globals.
#[derive(Debug)]
pub struct Context {
    nodes: Vec<Expr>,
    pool: FxHashMap<Expr, ExprId>,
    symbols: SymbolTable,
    resolution_limit: i64,
    temp_counter: u32,
    /// Memo tables for normalization, expansion, and GCD results.
    pub memo: MemoCache,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            pool: FxHashMap::default(),
            symbols: SymbolTable::new(),
            resolution_limit: DEFAULT_RESOLUTION_LIMIT,
            temp_counter: 0,
            memo: MemoCache::default(),
        }
    }

    /// Resolve an id to its node.
    ///
    /// # Panics
    /// Panics if `id` came from a different context.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.index()]
    }

    /// Pool a node, returning the existing id for structural duplicates.
    pub fn add(&mut self, expr: Expr) -> ExprId {
        if let Some(&id) = self.pool.get(&expr) {
            return id;
        }
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr.clone());
        self.pool.insert(expr, id);
        id
    }

    /// Number node for a machine integer.
    #[inline]
    pub fn num(&mut self, n: i64) -> ExprId {
        self.add(Expr::Number(Rational::int(n)))
    }

    /// Number node for a rational; an undefined rational becomes the
    /// `Undefined` node so that undefinedness stays a node kind, not a
    /// numeric payload.
    pub fn rat(&mut self, r: Rational) -> ExprId {
        if r.is_undefined() {
            self.undefined()
        } else {
            self.add(Expr::Number(r))
        }
    }

    /// Symbol node without a positivity assumption.
    pub fn var(&mut self, name: &str) -> ExprId {
        let id = self.symbols.intern(name, false);
        self.add(Expr::Symbol(id))
    }

    /// Symbol node carrying a positivity assumption.
    pub fn var_positive(&mut self, name: &str) -> ExprId {
        let id = self.symbols.intern(name, true);
        self.add(Expr::Symbol(id))
    }

    pub fn constant(&mut self, c: Constant) -> ExprId {
        self.add(Expr::Constant(c))
    }

    pub fn undefined(&mut self) -> ExprId {
        self.add(Expr::Undefined)
    }

    /// Synthesize a fresh placeholder symbol. The `#` prefix keeps the name
    /// outside anything the parser can produce.
    pub fn fresh_temp(&mut self) -> (SymbolId, ExprId) {
        self.temp_counter += 1;
        let name = format!("#t{}", self.temp_counter);
        let sym = self.symbols.intern(&name, false);
        let id = self.add(Expr::Symbol(sym));
        (sym, id)
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Name of a symbol node's record.
    pub fn symbol_record(&self, id: SymbolId) -> &SymbolRecord {
        self.symbols.resolve(id)
    }

    /// Magnitude ceiling for eager prime factorization.
    #[inline]
    pub fn resolution_limit(&self) -> i64 {
        self.resolution_limit
    }

    /// Adjust the factorization ceiling. Raising it trades computation cost
    /// for completeness of numeric-power simplification.
    pub fn set_resolution_limit(&mut self, limit: i64) {
        self.resolution_limit = limit.max(1);
    }

    /// Number of pooled nodes (diagnostics and tests).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_duplicates_are_pooled() {
        let mut ctx = Context::new();
        let a = ctx.var("x");
        let b = ctx.var("x");
        assert_eq!(a, b);
        let s1 = ctx.num(2);
        let s2 = ctx.num(2);
        assert_eq!(s1, s2);
    }

    #[test]
    fn positivity_distinguishes_symbols() {
        let mut ctx = Context::new();
        let plain = ctx.var("x");
        let positive = ctx.var_positive("x");
        assert_ne!(plain, positive);
    }

    #[test]
    fn composite_nodes_pool_by_structure() {
        let mut ctx = Context::new();
        let x = ctx.var("x");
        let two = ctx.num(2);
        let p1 = ctx.add(Expr::Pow(x, two));
        let p2 = ctx.add(Expr::Pow(x, two));
        assert_eq!(p1, p2);
    }

    #[test]
    fn undefined_rational_becomes_undefined_node() {
        let mut ctx = Context::new();
        let id = ctx.rat(Rational::Undefined);
        assert!(matches!(ctx.get(id), Expr::Undefined));
    }

    #[test]
    fn temp_symbols_are_fresh_and_reserved() {
        let mut ctx = Context::new();
        let (s1, t1) = ctx.fresh_temp();
        let (s2, t2) = ctx.fresh_temp();
        assert_ne!(s1, s2);
        assert_ne!(t1, t2);
        assert!(ctx.symbol_record(s1).name.starts_with('#'));
    }

    #[test]
    fn resolution_limit_is_tunable() {
        let mut ctx = Context::new();
        assert_eq!(ctx.resolution_limit(), 1000);
        ctx.set_resolution_limit(50);
        assert_eq!(ctx.resolution_limit(), 50);
        ctx.set_resolution_limit(0);
        assert_eq!(ctx.resolution_limit(), 1);
    }
}
