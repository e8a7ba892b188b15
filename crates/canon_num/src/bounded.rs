//! Overflow-checked machine integers.
//!
//! `BoundedInt` is the base of the numeric tower: every arithmetic operation
//! is checked, and a result that does not fit in `i64` carries a sticky
//! `overflowed` flag instead of wrapping. Callers inspect the flag and
//! degrade to floating point; nothing here ever panics or wraps silently.

use std::cmp::Ordering;
use tracing::{error, warn};

/// An `i64` plus a sticky overflow flag.
///
/// Once a result overflows, the flag propagates through every subsequent
/// operation. The stored value of an overflowed result is saturated and must
/// not be read back through [`BoundedInt::value`] (which returns `None`).
#[derive(Debug, Clone, Copy)]
pub struct BoundedInt {
    value: i64,
    overflowed: bool,
}

impl BoundedInt {
    /// Wrap an in-range machine integer.
    #[inline]
    pub fn new(value: i64) -> Self {
        Self {
            value,
            overflowed: false,
        }
    }

    #[inline]
    fn saturated(value: i64) -> Self {
        Self {
            value,
            overflowed: true,
        }
    }

    /// True if any operation in this value's history overflowed.
    #[inline]
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Exact value, defined only for non-overflowed results.
    #[inline]
    pub fn value(&self) -> Option<i64> {
        if self.overflowed {
            None
        } else {
            Some(self.value)
        }
    }

    /// Lossy conversion to `f64`. For overflowed results this is the
    /// saturated value and only approximates the mathematical result.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.value as f64
    }

    /// Lossy machine-integer view: the saturated value when overflowed.
    #[inline]
    pub fn lossy_value(&self) -> i64 {
        self.value
    }

    /// Absolute value. `i64::MIN.abs()` overflows and is flagged.
    pub fn abs(&self) -> Self {
        if self.overflowed {
            return *self;
        }
        match self.value.checked_abs() {
            Some(v) => Self::new(v),
            None => {
                warn!("integer overflow in abs({})", self.value);
                Self::saturated(i64::MAX)
            }
        }
    }

    /// Sign of the value: -1, 0, or 1. Defined only when not overflowed.
    #[inline]
    pub fn signum(&self) -> Option<i64> {
        if self.overflowed {
            None
        } else {
            Some(self.value.signum())
        }
    }

    /// Comparison is defined only when neither side overflowed.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if self.overflowed || other.overflowed {
            None
        } else {
            Some(self.value.cmp(&other.value))
        }
    }

    fn binary(
        self,
        rhs: Self,
        op: impl FnOnce(i64, i64) -> Option<i64>,
        name: &str,
    ) -> Self {
        if self.overflowed || rhs.overflowed {
            return Self::saturated(self.value);
        }
        match op(self.value, rhs.value) {
            Some(v) => Self::new(v),
            None => {
                warn!(
                    "integer overflow in {} of {} and {}",
                    name, self.value, rhs.value
                );
                let sat = if (self.value < 0) != (rhs.value < 0) && name != "sub" {
                    i64::MIN
                } else {
                    i64::MAX
                };
                Self::saturated(sat)
            }
        }
    }

    pub fn add(self, rhs: Self) -> Self {
        self.binary(rhs, i64::checked_add, "add")
    }

    pub fn sub(self, rhs: Self) -> Self {
        self.binary(rhs, i64::checked_sub, "sub")
    }

    pub fn mul(self, rhs: Self) -> Self {
        self.binary(rhs, i64::checked_mul, "mul")
    }

    /// Truncating division. Division by zero logs an error and yields a
    /// zero-valued, non-overflowed result; the caller must not rely on it.
    pub fn div(self, rhs: Self) -> Self {
        if self.overflowed || rhs.overflowed {
            return Self::saturated(self.value);
        }
        if rhs.value == 0 {
            error!("integer division of {} by zero", self.value);
            return Self::new(0);
        }
        self.binary(rhs, i64::checked_div, "div")
    }

    /// Remainder, with the same division-by-zero policy as [`BoundedInt::div`].
    pub fn rem(self, rhs: Self) -> Self {
        if self.overflowed || rhs.overflowed {
            return Self::saturated(self.value);
        }
        if rhs.value == 0 {
            error!("integer remainder of {} by zero", self.value);
            return Self::new(0);
        }
        self.binary(rhs, i64::checked_rem, "rem")
    }

    /// Power to a non-negative exponent. A zero exponent gives one; a
    /// negative exponent is outside the integer domain and yields zero with
    /// a warning.
    pub fn pow(self, exp: i64) -> Self {
        if self.overflowed {
            return self;
        }
        if exp < 0 {
            warn!("negative exponent {} in integer power, yielding 0", exp);
            return Self::new(0);
        }
        if exp == 0 {
            return Self::new(1);
        }
        let exp32 = match u32::try_from(exp) {
            Ok(e) => e,
            Err(_) => {
                warn!("integer overflow in {}^{}", self.value, exp);
                return Self::saturated(i64::MAX);
            }
        };
        match self.value.checked_pow(exp32) {
            Some(v) => Self::new(v),
            None => {
                warn!("integer overflow in {}^{}", self.value, exp);
                let sat = if self.value < 0 && exp % 2 == 1 {
                    i64::MIN
                } else {
                    i64::MAX
                };
                Self::saturated(sat)
            }
        }
    }
}

impl From<i64> for BoundedInt {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_arithmetic_is_exact() {
        let a = BoundedInt::new(21);
        let b = BoundedInt::new(2);
        assert_eq!(a.mul(b).value(), Some(42));
        assert_eq!(a.add(b).value(), Some(23));
        assert_eq!(a.sub(b).value(), Some(19));
        assert_eq!(a.div(b).value(), Some(10));
        assert_eq!(a.rem(b).value(), Some(1));
    }

    #[test]
    fn overflow_sets_flag_and_hides_value() {
        let a = BoundedInt::new(i64::MAX);
        let r = a.mul(BoundedInt::new(2));
        assert!(r.is_overflowed());
        assert_eq!(r.value(), None);
    }

    #[test]
    fn overflow_flag_propagates() {
        let bad = BoundedInt::new(i64::MAX).add(BoundedInt::new(1));
        let r = bad.mul(BoundedInt::new(0));
        assert!(r.is_overflowed());
    }

    #[test]
    fn division_by_zero_yields_zero() {
        let r = BoundedInt::new(7).div(BoundedInt::new(0));
        assert!(!r.is_overflowed());
        assert_eq!(r.value(), Some(0));
    }

    #[test]
    fn pow_special_cases() {
        assert_eq!(BoundedInt::new(5).pow(0).value(), Some(1));
        assert_eq!(BoundedInt::new(5).pow(-2).value(), Some(0));
        assert_eq!(BoundedInt::new(2).pow(10).value(), Some(1024));
        assert!(BoundedInt::new(10).pow(40).is_overflowed());
    }

    #[test]
    fn comparison_undefined_after_overflow() {
        let bad = BoundedInt::new(i64::MAX).mul(BoundedInt::new(3));
        assert_eq!(bad.compare(&BoundedInt::new(0)), None);
        assert_eq!(bad.signum(), None);
    }
}
