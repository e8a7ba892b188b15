//! Canonicalization of numeric powers `prefactor * base^exponent`.
//!
//! Produces a triple `(prefactor, base, exponent)` equal in value to the
//! input and canonical in the sense that `base^exponent` cannot be reduced
//! further without factoring past the resolution limit: the base carries no
//! prime with multiplicity reaching the exponent denominator, the exponent
//! lies in `(0, 1)`, and signs live in the prefactor.

use crate::factor::PrimeFactorization;
use crate::rational::Rational;
use tracing::warn;

/// Canonical form of a numeric power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericPower {
    pub prefactor: Rational,
    pub base: Rational,
    pub exponent: Rational,
}

impl NumericPower {
    fn collapsed(value: Rational) -> Self {
        Self {
            prefactor: value,
            base: Rational::ONE,
            exponent: Rational::ONE,
        }
    }

    fn undefined() -> Self {
        Self {
            prefactor: Rational::Undefined,
            base: Rational::Undefined,
            exponent: Rational::Undefined,
        }
    }

    /// True when the power part vanished and only the prefactor remains.
    pub fn is_collapsed(&self) -> bool {
        self.base.is_one() || self.exponent.is_one()
    }
}

/// Canonicalize `prefactor * base^exponent` for rational operands.
///
/// Reduction ladder: collapse non-exact or integer-exponent inputs
/// numerically; fold a negative exponent into the base; extract the sign of
/// a negative base through `(-1)^exponent` parity (undefined for
/// even-denominator exponents); extract the prefactor sign; then, for
/// magnitudes within `limit`, pull maximal denominator-th powers of the
/// base's primes into the prefactor and split any exponent above one into
/// its integer part. Magnitudes above `limit` skip factorization and come
/// back unchanged apart from the sign reductions.
pub fn simplify_numeric_power(
    prefactor: Rational,
    base: Rational,
    exponent: Rational,
    limit: i64,
) -> NumericPower {
    if prefactor.is_undefined() || base.is_undefined() || exponent.is_undefined() {
        return NumericPower::undefined();
    }
    if prefactor.is_zero() {
        return NumericPower::collapsed(Rational::ZERO);
    }

    // Anything floating, and any integer exponent, collapses numerically.
    if !prefactor.is_exact() || !base.is_exact() || !exponent.is_exact() {
        return NumericPower::collapsed(prefactor * base.to_the(exponent));
    }
    let (mut p, q) = exponent.parts().unwrap();
    if q == 1 {
        return NumericPower::collapsed(prefactor * base.to_the(exponent));
    }
    if base.is_zero() || base.is_one() {
        return NumericPower::collapsed(prefactor * base.to_the(exponent));
    }

    // Negative exponent: invert the base.
    let mut base = base;
    if p < 0 {
        base = Rational::ONE / base;
        p = match p.checked_neg() {
            Some(p) => p,
            None => return NumericPower::collapsed(prefactor * base.to_the(exponent.abs())),
        };
    }

    // Negative base: the sign change is unambiguous only for odd
    // denominators, where (-b)^(p/q) == (-1)^p * b^(p/q).
    let mut sign = Rational::ONE;
    if base.is_negative() {
        if q % 2 == 0 {
            warn!(
                "negative base {} with even-denominator exponent {}/{} has no real value",
                base, p, q
            );
            return NumericPower::undefined();
        }
        if p % 2 != 0 {
            sign = Rational::MINUS_ONE;
        }
        base = base.abs();
    }

    // Negative prefactor: extracted here, reapplied at the end.
    let mut prefactor = prefactor;
    if prefactor.is_negative() {
        sign = -sign;
        prefactor = prefactor.abs();
    }

    let (bn, bd) = base.parts().unwrap();
    let exponent = Rational::fraction(p, q);
    let (fb_n, fb_d) = match (
        PrimeFactorization::of(bn, limit),
        PrimeFactorization::of(bd, limit),
    ) {
        (Some(n), Some(d)) => (n, d),
        // Above the resolution limit: return the components unmodified.
        _ => {
            return NumericPower {
                prefactor: sign * prefactor,
                base,
                exponent,
            }
        }
    };

    // Pull q-th powers of every prime into the prefactor: (f^q)^(p/q) = f^p.
    let (out_n, in_n) = fb_n.extract_kth_powers(q as u32);
    let (out_d, in_d) = fb_d.extract_kth_powers(q as u32);
    for (out, invert) in [(out_n, false), (out_d, true)] {
        if out.is_one() {
            continue;
        }
        let shifted = match out.value_i64() {
            Some(v) => Rational::int(v).to_the(Rational::int(p)),
            None => Rational::Float(out.value() as f64).to_the(Rational::int(p)),
        };
        prefactor = if invert {
            prefactor / shifted
        } else {
            prefactor * shifted
        };
    }
    let base = match (in_n.value_i64(), in_d.value_i64()) {
        (Some(n), Some(d)) => Rational::fraction(n, d),
        _ => Rational::Float(in_n.value() as f64 / in_d.value() as f64),
    };
    if base.is_one() {
        return NumericPower::collapsed(sign * prefactor);
    }

    // Exponent magnitude above one: split off the integer part.
    let (p, whole) = (p % q, p / q);
    if whole > 0 {
        prefactor = prefactor * base.to_the(Rational::int(whole));
    }
    if !prefactor.is_exact() {
        // Overflow during extraction degraded the prefactor; collapse.
        return NumericPower::collapsed(
            sign * prefactor * base.to_the(Rational::fraction(p, q)),
        );
    }

    NumericPower {
        prefactor: sign * prefactor,
        base,
        exponent: Rational::fraction(p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::DEFAULT_RESOLUTION_LIMIT;

    fn simplify(p: i64, b: i64, en: i64, ed: i64) -> NumericPower {
        simplify_numeric_power(
            Rational::int(p),
            Rational::int(b),
            Rational::fraction(en, ed),
            DEFAULT_RESOLUTION_LIMIT,
        )
    }

    #[test]
    fn sqrt_12_extracts_square_factor() {
        let r = simplify(1, 12, 1, 2);
        assert_eq!(r.prefactor, Rational::int(2));
        assert_eq!(r.base, Rational::int(3));
        assert_eq!(r.exponent, Rational::fraction(1, 2));
    }

    #[test]
    fn perfect_power_collapses() {
        let r = simplify(1, 8, 2, 3);
        assert_eq!(r.prefactor, Rational::int(4));
        assert!(r.base.is_one());
    }

    #[test]
    fn exponent_above_one_splits_integer_part() {
        let r = simplify(1, 2, 7, 2);
        assert_eq!(r.prefactor, Rational::int(8));
        assert_eq!(r.base, Rational::int(2));
        assert_eq!(r.exponent, Rational::fraction(1, 2));
    }

    #[test]
    fn negative_exponent_inverts_base() {
        let r = simplify(1, 4, -1, 2);
        // 4^(-1/2) = (1/4)^(1/2) = 1/2
        assert_eq!(r.prefactor, Rational::fraction(1, 2));
        assert!(r.base.is_one());
    }

    #[test]
    fn negative_base_odd_denominator_extracts_sign() {
        let r = simplify(1, -16, 1, 3);
        // (-16)^(1/3) = -2 * 2^(1/3)
        assert_eq!(r.prefactor, Rational::int(-2));
        assert_eq!(r.base, Rational::int(2));
        assert_eq!(r.exponent, Rational::fraction(1, 3));
    }

    #[test]
    fn negative_base_even_denominator_is_undefined() {
        let r = simplify(1, -4, 1, 2);
        assert!(r.prefactor.is_undefined());
    }

    #[test]
    fn negative_prefactor_sign_is_preserved() {
        let r = simplify(-3, 12, 1, 2);
        assert_eq!(r.prefactor, Rational::int(-6));
        assert_eq!(r.base, Rational::int(3));
    }

    #[test]
    fn above_limit_skips_factoring() {
        let r = simplify_numeric_power(
            Rational::ONE,
            Rational::int(1009 * 1009),
            Rational::fraction(1, 2),
            DEFAULT_RESOLUTION_LIMIT,
        );
        // 1018081 = 1009^2, but 1009^2 > 1000 so it stays opaque.
        assert_eq!(r.prefactor, Rational::ONE);
        assert_eq!(r.base, Rational::int(1009 * 1009));
        assert_eq!(r.exponent, Rational::fraction(1, 2));
    }

    #[test]
    fn integer_exponent_collapses_numerically() {
        let r = simplify_numeric_power(
            Rational::int(3),
            Rational::int(5),
            Rational::int(2),
            DEFAULT_RESOLUTION_LIMIT,
        );
        assert_eq!(r.prefactor, Rational::int(75));
        assert!(r.base.is_one());
    }

    #[test]
    fn fractional_base_extracts_both_sides() {
        let r = simplify_numeric_power(
            Rational::ONE,
            Rational::fraction(4, 9),
            Rational::fraction(1, 2),
            DEFAULT_RESOLUTION_LIMIT,
        );
        assert_eq!(r.prefactor, Rational::fraction(2, 3));
        assert!(r.base.is_one());
    }

    #[test]
    fn idempotent_on_canonical_input() {
        let first = simplify(1, 12, 1, 2);
        let again = simplify_numeric_power(
            first.prefactor,
            first.base,
            first.exponent,
            DEFAULT_RESOLUTION_LIMIT,
        );
        assert_eq!(again, first);
    }
}
