//! Exact numeric tower for CanonCAS.
//!
//! Layered bottom-up: [`BoundedInt`] provides overflow-checked machine
//! integers, [`Rational`] the exact/floating hybrid scalars built on them,
//! [`PrimeFactorization`] bounded trial-division factoring, and
//! [`simplify_numeric_power`] the canonical `prefactor * base^exponent`
//! reduction used by symbolic power construction.
//!
//! Nothing in this crate panics on numeric edge cases: overflow degrades to
//! floating point, division by zero and complex results degrade to
//! [`Rational::Undefined`], and both are reported through `tracing`.

pub mod bounded;
pub mod factor;
pub mod power;
pub mod rational;

pub use bounded::BoundedInt;
pub use factor::{PrimeFactorization, DEFAULT_RESOLUTION_LIMIT};
pub use power::{simplify_numeric_power, NumericPower};
pub use rational::{Rational, REL_TOL, SNAP_DEN_MAX};
