//! Exact sparse multivariate polynomials over the rational scalars.
//!
//! Monomials are fixed-size exponent arrays (up to [`MAX_VARS`] variables),
//! which keeps hashing and comparison cheap. Coefficients must stay exact:
//! any operation whose coefficient arithmetic degrades to floating point
//! reports [`PolyError::Overflow`] and the caller treats the input as
//! opaque.

use crate::error::PolyError;
use canon_ast::views::as_number;
use canon_ast::{Context, Expr, ExprId};
use canon_num::Rational;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Maximum distinct variables per polynomial.
pub const MAX_VARS: usize = 8;

/// Exponent type; degrees beyond `u16` are rejected long before this caps.
pub type VarExp = u16;

/// Largest single exponent accepted during conversion.
const MAX_CONVERT_EXP: i64 = 512;

/// Compact monomial: one exponent per variable slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Mono(pub [VarExp; MAX_VARS]);

impl Mono {
    /// The constant monomial.
    #[inline]
    pub const fn unit() -> Self {
        Mono([0; MAX_VARS])
    }

    /// `x_i` as a monomial.
    #[inline]
    pub fn var(i: usize) -> Self {
        debug_assert!(i < MAX_VARS);
        let mut m = [0; MAX_VARS];
        m[i] = 1;
        Mono(m)
    }

    /// Multiply monomials; `None` on exponent overflow.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let mut out = [0; MAX_VARS];
        for (dst, (&a, &b)) in out.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *dst = a.checked_add(b)?;
        }
        Some(Mono(out))
    }

    /// Divide monomials; `None` when `other` does not divide `self`.
    pub fn try_sub(&self, other: &Self) -> Option<Self> {
        let mut out = [0; MAX_VARS];
        for (dst, (&a, &b)) in out.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *dst = a.checked_sub(b)?;
        }
        Some(Mono(out))
    }

    #[inline]
    pub fn total_degree(&self) -> u32 {
        self.0.iter().map(|&e| e as u32).sum()
    }

    #[inline]
    pub fn deg_var(&self, i: usize) -> VarExp {
        self.0[i]
    }

    #[inline]
    pub fn is_unit(&self) -> bool {
        self.0.iter().all(|&e| e == 0)
    }

    /// Copy with variable `i` zeroed out.
    pub fn without_var(&self, i: usize) -> Self {
        let mut m = self.0;
        m[i] = 0;
        Mono(m)
    }

    /// Copy with variable `i` raised by `k`.
    pub fn with_var_raised(&self, i: usize, k: VarExp) -> Option<Self> {
        let mut m = self.0;
        m[i] = m[i].checked_add(k)?;
        Some(Mono(m))
    }
}

/// Sparse polynomial: terms sorted by descending monomial, coefficients
/// exact and nonzero.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPoly {
    pub vars: Vec<ExprId>,
    pub terms: Vec<(Mono, Rational)>,
}

fn exact(r: Rational) -> Result<Rational, PolyError> {
    if r.is_exact() {
        Ok(r)
    } else {
        Err(PolyError::Overflow)
    }
}

impl MultiPoly {
    pub fn zero(vars: Vec<ExprId>) -> Self {
        Self {
            vars,
            terms: Vec::new(),
        }
    }

    pub fn constant(vars: Vec<ExprId>, c: Rational) -> Self {
        if c.is_zero() {
            Self::zero(vars)
        } else {
            Self {
                vars,
                terms: vec![(Mono::unit(), c)],
            }
        }
    }

    pub fn one(vars: Vec<ExprId>) -> Self {
        Self::constant(vars, Rational::ONE)
    }

    fn from_map(
        vars: Vec<ExprId>,
        map: FxHashMap<Mono, Rational>,
    ) -> Result<Self, PolyError> {
        let mut terms: Vec<(Mono, Rational)> = Vec::with_capacity(map.len());
        for (m, c) in map {
            let c = exact(c)?;
            if !c.is_zero() {
                terms.push((m, c));
            }
        }
        terms.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(Self { vars, terms })
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|(m, _)| m.is_unit())
    }

    pub fn constant_value(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::ZERO),
            1 if self.terms[0].0.is_unit() => Some(self.terms[0].1),
            _ => None,
        }
    }

    pub fn is_one(&self) -> bool {
        self.constant_value().is_some_and(|c| c.is_one())
    }

    pub fn total_degree(&self) -> u32 {
        self.terms
            .iter()
            .map(|(m, _)| m.total_degree())
            .max()
            .unwrap_or(0)
    }

    pub fn add(&self, other: &Self) -> Result<Self, PolyError> {
        debug_assert_eq!(self.vars, other.vars);
        let mut map: FxHashMap<Mono, Rational> = FxHashMap::default();
        for &(m, c) in self.terms.iter().chain(other.terms.iter()) {
            let slot = map.entry(m).or_insert(Rational::ZERO);
            *slot = exact(*slot + c)?;
        }
        Self::from_map(self.vars.clone(), map)
    }

    pub fn neg(&self) -> Self {
        Self {
            vars: self.vars.clone(),
            terms: self.terms.iter().map(|&(m, c)| (m, -c)).collect(),
        }
    }

    pub fn sub(&self, other: &Self) -> Result<Self, PolyError> {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Result<Self, PolyError> {
        debug_assert_eq!(self.vars, other.vars);
        let mut map: FxHashMap<Mono, Rational> = FxHashMap::default();
        for &(ma, ca) in &self.terms {
            for &(mb, cb) in &other.terms {
                let m = ma.checked_add(&mb).ok_or(PolyError::ExponentTooLarge)?;
                let c = exact(ca * cb)?;
                let slot = map.entry(m).or_insert(Rational::ZERO);
                *slot = exact(*slot + c)?;
            }
        }
        Self::from_map(self.vars.clone(), map)
    }

    pub fn mul_scalar(&self, c: Rational) -> Result<Self, PolyError> {
        if c.is_zero() {
            return Ok(Self::zero(self.vars.clone()));
        }
        let mut terms = Vec::with_capacity(self.terms.len());
        for &(m, tc) in &self.terms {
            terms.push((m, exact(tc * c)?));
        }
        Ok(Self {
            vars: self.vars.clone(),
            terms,
        })
    }

    pub fn pow(&self, n: u32) -> Result<Self, PolyError> {
        let mut acc = Self::one(self.vars.clone());
        for _ in 0..n {
            acc = acc.mul(self)?;
        }
        Ok(acc)
    }

    /// Degree in variable `i`.
    pub fn degree_in(&self, i: usize) -> u32 {
        self.terms
            .iter()
            .map(|(m, _)| m.deg_var(i) as u32)
            .max()
            .unwrap_or(0)
    }

    /// Minimum degree of variable `i` over all terms.
    pub fn min_degree_in(&self, i: usize) -> u32 {
        self.terms
            .iter()
            .map(|(m, _)| m.deg_var(i) as u32)
            .min()
            .unwrap_or(0)
    }

    /// Coefficient of `x_i^k`, a polynomial with `x_i` removed.
    pub fn coeff_of(&self, i: usize, k: VarExp) -> Self {
        let terms: Vec<(Mono, Rational)> = self
            .terms
            .iter()
            .filter(|(m, _)| m.deg_var(i) == k)
            .map(|&(m, c)| (m.without_var(i), c))
            .collect();
        let mut out = Self {
            vars: self.vars.clone(),
            terms,
        };
        out.terms.sort_by(|a, b| b.0.cmp(&a.0));
        out
    }

    /// Leading coefficient with respect to variable `i`.
    pub fn leading_coeff_in(&self, i: usize) -> Self {
        self.coeff_of(i, self.degree_in(i) as VarExp)
    }

    /// Multiply by `x_i^k`.
    pub fn mul_var_pow(&self, i: usize, k: VarExp) -> Result<Self, PolyError> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for &(m, c) in &self.terms {
            let m = m
                .with_var_raised(i, k)
                .ok_or(PolyError::ExponentTooLarge)?;
            terms.push((m, c));
        }
        Ok(Self {
            vars: self.vars.clone(),
            terms,
        })
    }

    /// Sign of the lexicographically leading coefficient.
    pub fn leading_sign_negative(&self) -> bool {
        self.terms.first().is_some_and(|(_, c)| c.is_negative())
    }

    /// Exact division; `None` when `div` does not divide `self` (or the
    /// coefficient arithmetic leaves machine range).
    pub fn div_exact(&self, div: &Self) -> Option<Self> {
        debug_assert_eq!(self.vars, div.vars);
        if div.is_zero() {
            return None;
        }
        let (d_mono, d_coeff) = div.terms[0];
        let mut rem: BTreeMap<Mono, Rational> =
            self.terms.iter().map(|&(m, c)| (m, c)).collect();
        let mut quot: FxHashMap<Mono, Rational> = FxHashMap::default();

        while let Some((&r_mono, &r_coeff)) = rem.last_key_value() {
            let t_mono = r_mono.try_sub(&d_mono)?;
            let t_coeff = r_coeff / d_coeff;
            if !t_coeff.is_exact() {
                return None;
            }
            let slot = quot.entry(t_mono).or_insert(Rational::ZERO);
            *slot = *slot + t_coeff;
            for &(m, c) in &div.terms {
                let target = t_mono.checked_add(&m)?;
                let updated = *rem.get(&target).unwrap_or(&Rational::ZERO) - t_coeff * c;
                if !updated.is_exact() {
                    return None;
                }
                if updated.is_zero() {
                    rem.remove(&target);
                } else {
                    rem.insert(target, updated);
                }
            }
        }
        Self::from_map(self.vars.clone(), quot).ok()
    }

    /// Rational content: gcd of integer coefficients, one when any
    /// coefficient is non-integer. Always non-negative.
    pub fn integer_content(&self) -> Rational {
        use num_integer::Integer;
        let mut acc: i64 = 0;
        for &(_, c) in &self.terms {
            match c.as_integer() {
                Some(n) => acc = acc.gcd(&n),
                None => return Rational::ONE,
            }
        }
        if acc == 0 {
            Rational::ZERO
        } else {
            Rational::int(acc.abs())
        }
    }

    /// Convert back to a canonical expression tree.
    pub fn to_expr(&self, ctx: &mut Context) -> ExprId {
        if self.is_zero() {
            return ctx.num(0);
        }
        let mut term_nodes = Vec::with_capacity(self.terms.len());
        // Ascending order reads naturally once the sum factory re-sorts.
        for &(m, c) in self.terms.iter().rev() {
            let mut factors = Vec::new();
            if !c.is_one() || m.is_unit() {
                factors.push(ctx.rat(c));
            }
            for (i, &var) in self.vars.iter().enumerate() {
                let e = m.deg_var(i);
                if e == 0 {
                    continue;
                }
                if e == 1 {
                    factors.push(var);
                } else {
                    let en = ctx.num(e as i64);
                    factors.push(crate::power::pow(ctx, var, en));
                }
            }
            term_nodes.push(crate::product::product(ctx, &factors));
        }
        crate::sum::sum(ctx, &term_nodes)
    }
}

/// Convert an expression to a polynomial over the given variable order.
pub fn from_expr(ctx: &Context, id: ExprId, vars: &[ExprId]) -> Result<MultiPoly, PolyError> {
    if vars.len() > MAX_VARS {
        return Err(PolyError::TooManyVariables);
    }
    convert(ctx, id, vars)
}

fn convert(ctx: &Context, id: ExprId, vars: &[ExprId]) -> Result<MultiPoly, PolyError> {
    match ctx.get(id) {
        Expr::Number(r) => {
            if r.is_exact() {
                Ok(MultiPoly::constant(vars.to_vec(), *r))
            } else {
                Err(PolyError::NotPolynomial)
            }
        }
        Expr::Symbol(_) => {
            let i = vars
                .iter()
                .position(|&v| v == id)
                .ok_or(PolyError::NotPolynomial)?;
            Ok(MultiPoly {
                vars: vars.to_vec(),
                terms: vec![(Mono::var(i), Rational::ONE)],
            })
        }
        Expr::Sum(ops) => {
            let mut acc = MultiPoly::zero(vars.to_vec());
            for &op in ops {
                acc = acc.add(&convert(ctx, op, vars)?)?;
            }
            Ok(acc)
        }
        Expr::Product(ops) => {
            let mut acc = MultiPoly::one(vars.to_vec());
            for &op in ops {
                acc = acc.mul(&convert(ctx, op, vars)?)?;
            }
            Ok(acc)
        }
        Expr::Pow(base, exp) => {
            let e = as_number(ctx, *exp)
                .filter(|e| e.is_exact())
                .and_then(|e| e.as_integer())
                .ok_or(PolyError::NotPolynomial)?;
            if e < 0 {
                return Err(PolyError::NotPolynomial);
            }
            if e > MAX_CONVERT_EXP {
                return Err(PolyError::ExponentTooLarge);
            }
            convert(ctx, *base, vars)?.pow(e as u32)
        }
        _ => Err(PolyError::NotPolynomial),
    }
}
