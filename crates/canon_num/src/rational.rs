//! Hybrid exact/floating numbers.
//!
//! A [`Rational`] is one of: machine integer, reduced fraction, floating
//! value, or undefined. Arithmetic stays exact as long as the machine-width
//! [`BoundedInt`] operations do not overflow; on overflow the operation is
//! retried in `f64` (the overflow itself is already logged by the integer
//! layer). Division by zero and NaN-producing operations yield `Undefined`,
//! which is terminal: it propagates through every operator.
//!
//! # Structural vs. semantic equality
//!
//! `PartialEq`/`Hash` are bit-exact so the type can serve as a node-pooling
//! key. The tolerant comparison described by the numeric model (exact for
//! two exact values, relative-tolerance when a float is involved) is
//! [`Rational::equals`] / [`Rational::compare`].

use crate::bounded::BoundedInt;
use num_integer::Integer;
use std::cmp::Ordering;
use tracing::warn;

/// Relative tolerance for float comparison and float→fraction snapping.
pub const REL_TOL: f64 = 1e-9;

/// Largest denominator tried when snapping a float back to a fraction.
pub const SNAP_DEN_MAX: i64 = 1000;

/// Exact rational / floating hybrid scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rational {
    /// Machine integer.
    Integer(i64),
    /// Reduced fraction: `den >= 2`, `gcd(|num|, den) == 1`.
    Fraction { num: i64, den: i64 },
    /// Finite floating value (never NaN or infinite).
    Float(f64),
    /// Result of division by zero or a NaN-producing operation. Terminal.
    Undefined,
}

impl Eq for Rational {}

impl std::hash::Hash for Rational {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Rational::Integer(n) => {
                0u8.hash(state);
                n.hash(state);
            }
            Rational::Fraction { num, den } => {
                1u8.hash(state);
                num.hash(state);
                den.hash(state);
            }
            Rational::Float(f) => {
                2u8.hash(state);
                f.to_bits().hash(state);
            }
            Rational::Undefined => 3u8.hash(state),
        }
    }
}

impl Rational {
    pub const ZERO: Rational = Rational::Integer(0);
    pub const ONE: Rational = Rational::Integer(1);
    pub const MINUS_ONE: Rational = Rational::Integer(-1);

    /// Wrap a machine integer.
    #[inline]
    pub fn int(n: i64) -> Self {
        Rational::Integer(n)
    }

    /// Construct `num/den` in lowest terms with positive denominator.
    ///
    /// A zero denominator yields `Undefined` with a warning. Values whose
    /// reduced parts do not fit in `i64` degrade to `Float`.
    pub fn fraction(num: i64, den: i64) -> Self {
        if den == 0 {
            warn!("rational division of {} by zero denominator", num);
            return Rational::Undefined;
        }
        let mut n = num as i128;
        let mut d = den as i128;
        if d < 0 {
            n = -n;
            d = -d;
        }
        let g = n.abs().gcd(&d);
        if g > 1 {
            n /= g;
            d /= g;
        }
        match (i64::try_from(n), i64::try_from(d)) {
            (Ok(n), Ok(1)) => Rational::Integer(n),
            (Ok(n), Ok(d)) => Rational::Fraction { num: n, den: d },
            _ => {
                warn!("rational {}/{} does not fit machine width", num, den);
                Rational::Float(n as f64 / d as f64)
            }
        }
    }

    /// Construct from a float, snapping to a nearby low-denominator
    /// fraction when the reconstruction matches within [`REL_TOL`].
    pub fn from_f64(x: f64) -> Self {
        if x.is_nan() || x.is_infinite() {
            warn!("non-finite float {} becomes undefined", x);
            return Rational::Undefined;
        }
        if x == 0.0 {
            return Rational::Integer(0);
        }
        for den in 1..=SNAP_DEN_MAX {
            let scaled = x * den as f64;
            let num = scaled.round();
            if num.abs() > i64::MAX as f64 {
                break;
            }
            if (num / den as f64 - x).abs() <= REL_TOL * x.abs() {
                return Rational::fraction(num as i64, den);
            }
        }
        Rational::Float(x)
    }

    fn from_float_result(x: f64) -> Self {
        if x.is_nan() || x.is_infinite() {
            Rational::Undefined
        } else {
            Rational::Float(x)
        }
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Rational::Undefined)
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Rational::Float(_))
    }

    /// True for `Integer` and `Fraction` values.
    #[inline]
    pub fn is_exact(&self) -> bool {
        matches!(self, Rational::Integer(_) | Rational::Fraction { .. })
    }

    /// True when the value is a mathematical integer (a float with zero
    /// fractional part counts).
    pub fn is_integer(&self) -> bool {
        match self {
            Rational::Integer(_) => true,
            Rational::Fraction { .. } => false,
            Rational::Float(f) => f.fract() == 0.0,
            Rational::Undefined => false,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Rational::Integer(n) => *n == 0,
            Rational::Fraction { .. } => false,
            Rational::Float(f) => *f == 0.0,
            Rational::Undefined => false,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Rational::Integer(n) => *n == 1,
            Rational::Float(f) => *f == 1.0,
            _ => false,
        }
    }

    pub fn is_minus_one(&self) -> bool {
        match self {
            Rational::Integer(n) => *n == -1,
            Rational::Float(f) => *f == -1.0,
            _ => false,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Rational::Integer(n) => *n < 0,
            Rational::Fraction { num, .. } => *num < 0,
            Rational::Float(f) => *f < 0.0,
            Rational::Undefined => false,
        }
    }

    /// Numerator and positive denominator of an exact value.
    pub fn parts(&self) -> Option<(i64, i64)> {
        match self {
            Rational::Integer(n) => Some((*n, 1)),
            Rational::Fraction { num, den } => Some((*num, *den)),
            _ => None,
        }
    }

    /// Exact integer value, when the value is an exact integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Rational::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Lossy conversion; `Undefined` maps to NaN.
    pub fn to_f64(&self) -> f64 {
        match self {
            Rational::Integer(n) => *n as f64,
            Rational::Fraction { num, den } => *num as f64 / *den as f64,
            Rational::Float(f) => *f,
            Rational::Undefined => f64::NAN,
        }
    }

    pub fn abs(&self) -> Self {
        if self.is_negative() {
            -*self
        } else {
            *self
        }
    }

    /// Semantic equality: exact between two exact values, relative-tolerance
    /// when a float is involved. `Undefined` equals nothing.
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Rational::Undefined, _) | (_, Rational::Undefined) => false,
            (a, b) if a.is_exact() && b.is_exact() => a == b,
            (a, b) => {
                let (x, y) = (a.to_f64(), b.to_f64());
                (x - y).abs() <= REL_TOL * x.abs().max(y.abs()).max(1.0)
            }
        }
    }

    /// Total numeric order. Exact pairs compare by cross-multiplication in
    /// `i128`; floats by value. `Undefined` sorts after every number.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Rational::Undefined, Rational::Undefined) => Ordering::Equal,
            (Rational::Undefined, _) => Ordering::Greater,
            (_, Rational::Undefined) => Ordering::Less,
            (a, b) if a.is_exact() && b.is_exact() => {
                let (an, ad) = a.parts().unwrap();
                let (bn, bd) = b.parts().unwrap();
                (an as i128 * bd as i128).cmp(&(bn as i128 * ad as i128))
            }
            (a, b) => a
                .to_f64()
                .partial_cmp(&b.to_f64())
                .unwrap_or(Ordering::Equal),
        }
    }

    fn exact_binary(
        an: i64,
        ad: i64,
        bn: i64,
        bd: i64,
        num: impl FnOnce(BoundedInt, BoundedInt, BoundedInt, BoundedInt) -> BoundedInt,
        den: impl FnOnce(BoundedInt, BoundedInt) -> BoundedInt,
        fallback: impl FnOnce() -> f64,
    ) -> Rational {
        let (an, ad) = (BoundedInt::new(an), BoundedInt::new(ad));
        let (bn, bd) = (BoundedInt::new(bn), BoundedInt::new(bd));
        let n = num(an, ad, bn, bd);
        let d = den(ad, bd);
        match (n.value(), d.value()) {
            (Some(n), Some(d)) => Rational::fraction(n, d),
            _ => Rational::from_float_result(fallback()),
        }
    }
}

impl std::ops::Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        match self {
            Rational::Integer(n) => {
                if n == i64::MIN {
                    Rational::Float(-(n as f64))
                } else {
                    Rational::Integer(-n)
                }
            }
            Rational::Fraction { num, den } => Rational::fraction(-num, den),
            Rational::Float(f) => Rational::Float(-f),
            Rational::Undefined => Rational::Undefined,
        }
    }
}

impl std::ops::Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        match (self, rhs) {
            (Rational::Undefined, _) | (_, Rational::Undefined) => Rational::Undefined,
            (a, b) if a.is_exact() && b.is_exact() => {
                let (an, ad) = a.parts().unwrap();
                let (bn, bd) = b.parts().unwrap();
                Rational::exact_binary(
                    an,
                    ad,
                    bn,
                    bd,
                    |an, ad, bn, bd| an.mul(bd).add(bn.mul(ad)),
                    |ad, bd| ad.mul(bd),
                    || a.to_f64() + b.to_f64(),
                )
            }
            (a, b) => Rational::from_float_result(a.to_f64() + b.to_f64()),
        }
    }
}

impl std::ops::Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        self + (-rhs)
    }
}

impl std::ops::Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        match (self, rhs) {
            (Rational::Undefined, _) | (_, Rational::Undefined) => Rational::Undefined,
            (a, b) if a.is_exact() && b.is_exact() => {
                let (an, ad) = a.parts().unwrap();
                let (bn, bd) = b.parts().unwrap();
                Rational::exact_binary(
                    an,
                    ad,
                    bn,
                    bd,
                    |an, _, bn, _| an.mul(bn),
                    |ad, bd| ad.mul(bd),
                    || a.to_f64() * b.to_f64(),
                )
            }
            (a, b) => Rational::from_float_result(a.to_f64() * b.to_f64()),
        }
    }
}

impl std::ops::Div for Rational {
    type Output = Rational;

    fn div(self, rhs: Rational) -> Rational {
        match (self, rhs) {
            (Rational::Undefined, _) | (_, Rational::Undefined) => Rational::Undefined,
            (_, b) if b.is_zero() => {
                warn!("rational division by zero");
                Rational::Undefined
            }
            (a, b) if a.is_exact() && b.is_exact() => {
                let (an, ad) = a.parts().unwrap();
                let (bn, bd) = b.parts().unwrap();
                Rational::exact_binary(
                    an,
                    ad,
                    bn,
                    bd,
                    |an, _, _, bd| an.mul(bd),
                    // denominator ad*bn; sign is normalized by `fraction`
                    |ad, _| ad,
                    || a.to_f64() / b.to_f64(),
                )
                .fix_div_denominator(bn)
            }
            (a, b) => Rational::from_float_result(a.to_f64() / b.to_f64()),
        }
    }
}

impl Rational {
    /// Second half of exact division: multiply the denominator by `bn`.
    fn fix_div_denominator(self, bn: i64) -> Rational {
        match self {
            Rational::Integer(n) => Rational::fraction(n, bn),
            Rational::Fraction { num, den } => {
                let d = BoundedInt::new(den).mul(BoundedInt::new(bn));
                match d.value() {
                    Some(d) => Rational::fraction(num, d),
                    None => Rational::from_float_result(num as f64 / (den as f64 * bn as f64)),
                }
            }
            other => other,
        }
    }

    /// Find `b` with `b^q == n`, searching around the floating `q`-th root.
    fn try_get_base(n: i64, q: i64) -> Option<i64> {
        if q < 2 {
            return None;
        }
        if n == 0 {
            return Some(0);
        }
        let negative = n < 0;
        if negative && q % 2 == 0 {
            return None;
        }
        let mag = (n as f64).abs().powf(1.0 / q as f64).round() as i64;
        for cand in mag.saturating_sub(1)..=mag.saturating_add(1) {
            if cand < 0 {
                continue;
            }
            let mut acc: i128 = 1;
            for _ in 0..q {
                acc = acc.saturating_mul(cand as i128);
                if acc > i64::MAX as i128 {
                    break;
                }
            }
            if acc == (n as i128).abs() {
                return Some(if negative { -cand } else { cand });
            }
        }
        None
    }

    /// Integer-exponent power of an exact value; `exp` may be negative.
    fn exact_int_pow(self, exp: i64) -> Rational {
        let (n, d) = match self.parts() {
            Some(p) => p,
            None => return Rational::Undefined,
        };
        let neg = exp < 0;
        let (n, d, exp) = if neg { (d, n, -exp) } else { (n, d, exp) };
        let pn = BoundedInt::new(n).pow(exp);
        let pd = BoundedInt::new(d).pow(exp);
        match (pn.value(), pd.value()) {
            (Some(pn), Some(pd)) => Rational::fraction(pn, pd),
            _ => {
                let e = if neg { -(exp as f64) } else { exp as f64 };
                Rational::from_float_result(self.to_f64().powf(e))
            }
        }
    }

    /// Exponentiation.
    ///
    /// Special cases in order: undefined propagation; zero exponent gives
    /// one; zero base gives zero (undefined for negative exponents); unit
    /// base gives one; unit exponent is the identity. Exact bases with
    /// fractional exponents search for an exact integer root of numerator
    /// and denominator separately and fall back to floating evaluation when
    /// none exists. A negative base with an even-denominator exponent is
    /// undefined; odd denominators follow `(-1)^p` parity.
    pub fn to_the(self, exp: Rational) -> Rational {
        if self.is_undefined() || exp.is_undefined() {
            return Rational::Undefined;
        }
        if exp.is_zero() {
            return Rational::ONE;
        }
        if self.is_zero() {
            if exp.is_negative() {
                warn!("zero base with negative exponent is undefined");
                return Rational::Undefined;
            }
            return Rational::ZERO;
        }
        if self.is_one() {
            return Rational::ONE;
        }
        if exp.is_one() {
            return self;
        }

        if self.is_float() || exp.is_float() {
            let (b, e) = (self.to_f64(), exp.to_f64());
            if b < 0.0 && e.fract() != 0.0 {
                warn!("negative base {} with fractional exponent {}", b, e);
                return Rational::Undefined;
            }
            return Rational::from_float_result(b.powf(e));
        }

        let (p, q) = exp.parts().unwrap();
        if q == 1 {
            return self.exact_int_pow(p);
        }

        // Fractional exponent p/q of an exact base.
        if self.is_negative() && q % 2 == 0 {
            warn!("negative base {:?} with even-denominator exponent", self);
            return Rational::Undefined;
        }
        let sign = if self.is_negative() && p % 2 != 0 {
            Rational::MINUS_ONE
        } else {
            Rational::ONE
        };
        let (n, d) = self.abs().parts().unwrap();
        match (Rational::try_get_base(n, q), Rational::try_get_base(d, q)) {
            (Some(rn), Some(rd)) => sign * Rational::fraction(rn, rd).exact_int_pow(p),
            _ => {
                let mag = self.abs().to_f64().powf(p as f64 / q as f64);
                sign * Rational::from_float_result(mag)
            }
        }
    }
}

impl num_traits::Zero for Rational {
    fn zero() -> Self {
        Rational::ZERO
    }

    fn is_zero(&self) -> bool {
        Rational::is_zero(self)
    }
}

impl num_traits::One for Rational {
    fn one() -> Self {
        Rational::ONE
    }

    fn is_one(&self) -> bool {
        Rational::is_one(self)
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rational::Integer(n) => write!(f, "{}", n),
            Rational::Fraction { num, den } => write!(f, "{}/{}", num, den),
            Rational::Float(x) => write!(f, "{}", x),
            Rational::Undefined => write!(f, "undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_reduces_to_lowest_terms() {
        assert_eq!(
            Rational::fraction(4, 6),
            Rational::Fraction { num: 2, den: 3 }
        );
        assert_eq!(Rational::fraction(4, 2), Rational::Integer(2));
        assert_eq!(
            Rational::fraction(3, -6),
            Rational::Fraction { num: -1, den: 2 }
        );
    }

    #[test]
    fn zero_denominator_is_undefined() {
        assert!(Rational::fraction(5, 0).is_undefined());
    }

    #[test]
    fn float_snaps_to_low_denominator_fraction() {
        assert_eq!(
            Rational::from_f64(0.5),
            Rational::Fraction { num: 1, den: 2 }
        );
        assert_eq!(Rational::from_f64(3.0), Rational::Integer(3));
        assert_eq!(
            Rational::from_f64(1.0 / 3.0),
            Rational::Fraction { num: 1, den: 3 }
        );
        // pi has no low-denominator representation within tolerance
        assert!(Rational::from_f64(std::f64::consts::PI).is_float());
    }

    #[test]
    fn arithmetic_stays_exact_in_range() {
        let a = Rational::fraction(1, 2);
        let b = Rational::fraction(1, 3);
        assert_eq!(a + b, Rational::Fraction { num: 5, den: 6 });
        assert_eq!(a * b, Rational::Fraction { num: 1, den: 6 });
        assert_eq!(a - b, Rational::Fraction { num: 1, den: 6 });
        assert_eq!(a / b, Rational::Fraction { num: 3, den: 2 });
    }

    #[test]
    fn overflow_degrades_to_float() {
        let big = Rational::int(i64::MAX);
        let r = big * Rational::int(2);
        assert!(r.is_float());
        assert!((r.to_f64() - 2.0 * i64::MAX as f64).abs() < 1e4);
    }

    #[test]
    fn undefined_is_terminal() {
        let u = Rational::int(1) / Rational::ZERO;
        assert!(u.is_undefined());
        assert!((u + Rational::ONE).is_undefined());
        assert!((u * Rational::ZERO).is_undefined());
    }

    #[test]
    fn float_equality_uses_tolerance() {
        let a = Rational::Float(0.1 + 0.2);
        let b = Rational::Float(0.3);
        assert!(a.equals(&b));
        let half = Rational::fraction(1, 2);
        assert!(half.equals(&Rational::Float(0.5)));
        assert!(!half.equals(&Rational::Float(0.5001)));
    }

    #[test]
    fn pow_special_cases() {
        let two = Rational::int(2);
        assert_eq!(two.to_the(Rational::ZERO), Rational::ONE);
        assert_eq!(Rational::ZERO.to_the(two), Rational::ZERO);
        assert!(Rational::ZERO.to_the(Rational::int(-1)).is_undefined());
        assert_eq!(two.to_the(Rational::int(10)), Rational::int(1024));
        assert_eq!(
            two.to_the(Rational::int(-2)),
            Rational::Fraction { num: 1, den: 4 }
        );
    }

    #[test]
    fn pow_exact_roots() {
        assert_eq!(
            Rational::int(4).to_the(Rational::fraction(1, 2)),
            Rational::int(2)
        );
        assert_eq!(
            Rational::int(27).to_the(Rational::fraction(2, 3)),
            Rational::int(9)
        );
        assert_eq!(
            Rational::fraction(4, 9).to_the(Rational::fraction(1, 2)),
            Rational::Fraction { num: 2, den: 3 }
        );
    }

    #[test]
    fn pow_irrational_degrades_to_float() {
        let r = Rational::int(2).to_the(Rational::fraction(1, 2));
        assert!(r.is_float());
        assert!((r.to_f64() - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn pow_negative_base_parity() {
        assert_eq!(
            Rational::int(-8).to_the(Rational::fraction(1, 3)),
            Rational::int(-2)
        );
        assert_eq!(
            Rational::int(-8).to_the(Rational::fraction(2, 3)),
            Rational::int(4)
        );
        assert!(Rational::int(-4)
            .to_the(Rational::fraction(1, 2))
            .is_undefined());
    }

    #[test]
    fn comparison_is_exact_for_exact_pairs() {
        let a = Rational::fraction(1, 3);
        let b = Rational::fraction(333333333, 1000000000);
        assert_eq!(a.compare(&b), Ordering::Greater);
    }
}
