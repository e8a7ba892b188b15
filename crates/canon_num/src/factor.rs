//! Bounded trial-division prime factorization.
//!
//! Factorization is only attempted for magnitudes up to a caller-supplied
//! resolution limit; larger inputs return `None` and the caller keeps the
//! number opaque. Within the limit, trial division is complete.

/// Default resolution limit: the largest magnitude factorized eagerly.
pub const DEFAULT_RESOLUTION_LIMIT: i64 = 1000;

/// Prime factorization of a positive integer: sorted `(prime, multiplicity)`
/// pairs. The unit `1` is the empty factorization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrimeFactorization {
    factors: Vec<(i64, u32)>,
}

impl PrimeFactorization {
    /// The empty factorization, representing `1`.
    pub fn one() -> Self {
        Self::default()
    }

    /// Factorize `n >= 1` by trial division, refusing values above `limit`.
    pub fn of(n: i64, limit: i64) -> Option<Self> {
        if n < 1 || n > limit {
            return None;
        }
        let mut rest = n;
        let mut factors = Vec::new();

        let mut count = 0;
        while rest % 2 == 0 {
            count += 1;
            rest /= 2;
        }
        if count > 0 {
            factors.push((2, count));
        }

        let mut d = 3;
        while d * d <= rest {
            if rest % d == 0 {
                let mut count = 0;
                while rest % d == 0 {
                    count += 1;
                    rest /= d;
                }
                factors.push((d, count));
            }
            d += 2;
        }
        if rest > 1 {
            factors.push((rest, 1));
        }
        Some(Self { factors })
    }

    pub fn is_one(&self) -> bool {
        self.factors.is_empty()
    }

    /// Sorted `(prime, multiplicity)` pairs.
    pub fn factors(&self) -> &[(i64, u32)] {
        &self.factors
    }

    /// Merge two factorizations (multiply the underlying numbers).
    pub fn multiply(&self, other: &Self) -> Self {
        let mut merged = self.factors.clone();
        for &(p, m) in &other.factors {
            match merged.iter_mut().find(|(q, _)| *q == p) {
                Some((_, count)) => *count += m,
                None => merged.push((p, m)),
            }
        }
        merged.sort_by_key(|&(p, _)| p);
        Self { factors: merged }
    }

    /// Raise every multiplicity by `exp`.
    pub fn pow(&self, exp: u32) -> Self {
        if exp == 0 {
            return Self::one();
        }
        Self {
            factors: self.factors.iter().map(|&(p, m)| (p, m * exp)).collect(),
        }
    }

    /// Common prime content of two factorizations.
    pub fn gcd(&self, other: &Self) -> Self {
        let mut factors = Vec::new();
        for &(p, m) in &self.factors {
            if let Some(&(_, n)) = other.factors.iter().find(|(q, _)| *q == p) {
                factors.push((p, m.min(n)));
            }
        }
        Self { factors }
    }

    /// Remove `other` from `self`; `None` if `other` does not divide it.
    pub fn divide_exact(&self, other: &Self) -> Option<Self> {
        let mut factors = Vec::new();
        let mut remaining = other.factors.clone();
        for &(p, m) in &self.factors {
            let taken = match remaining.iter().position(|(q, _)| *q == p) {
                Some(i) => remaining.swap_remove(i).1,
                None => 0,
            };
            if taken > m {
                return None;
            }
            if m - taken > 0 {
                factors.push((p, m - taken));
            }
        }
        if !remaining.is_empty() {
            return None;
        }
        factors.sort_by_key(|&(p, _)| p);
        Some(Self { factors })
    }

    /// Split every prime into `k`-th-power chunks: returns `(outside,
    /// inside)` such that `outside^k * inside` recomposes the number and
    /// `inside` has no prime with multiplicity `>= k`.
    pub fn extract_kth_powers(&self, k: u32) -> (Self, Self) {
        debug_assert!(k >= 1);
        let mut outside = Vec::new();
        let mut inside = Vec::new();
        for &(p, m) in &self.factors {
            let out = m / k;
            let rem = m % k;
            if out > 0 {
                outside.push((p, out));
            }
            if rem > 0 {
                inside.push((p, rem));
            }
        }
        (Self { factors: outside }, Self { factors: inside })
    }

    /// Recompose the factored number in `i128` (cannot overflow for inputs
    /// accepted by [`PrimeFactorization::of`], but multiplied or powered
    /// factorizations may grow; callers check the range).
    pub fn value(&self) -> i128 {
        self.factors
            .iter()
            .fold(1i128, |acc, &(p, m)| acc * (p as i128).pow(m))
    }

    /// Recomposed value when it fits a machine integer.
    pub fn value_i64(&self) -> Option<i64> {
        i64::try_from(self.value()).ok()
    }
}
