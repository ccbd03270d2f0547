//! First-order Gaussian moment propagation on a `(mean, sigma)` pair.
//!
//! The cheapest representation: one mean, one uncertainty, linearised
//! propagation. The correlation mode `M` fixes how two operands combine
//! (see [`crate::mode`]).
//!
//! # Examples
//! ```
//! use u_uncertain::{Elementary, UDoubleMSCorr, UDoubleMSUncorr};
//!
//! let a = UDoubleMSCorr::new(4.0, 2.0).unwrap();
//! let b = UDoubleMSCorr::new(2.0, 0.1).unwrap();
//! assert!((a.pow(&b).deviation() - 18.218071).abs() < 1e-6);
//!
//! let a = UDoubleMSUncorr::new(4.0, 2.0).unwrap();
//! let b = UDoubleMSUncorr::new(2.0, 0.1).unwrap();
//! assert!((a.pow(&b).deviation() - 16.153013).abs() < 1e-6);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::elementary::Elementary;
use crate::error::{Result, UncertainError};
use crate::format;
use crate::mode::CorrelationMode;
use crate::moments::{propagate_by_slope, Binary, Unary};

/// A mean with a single, linearly propagated uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleScalar<M: CorrelationMode> {
    value: f64,
    uncertainty: f64,
    mode: PhantomData<M>,
}

impl<M: CorrelationMode> SimpleScalar<M> {
    /// Creates a value with the given mean and uncertainty.
    ///
    /// # Errors
    /// [`UncertainError::NegativeUncertainty`] in uncorrelated mode when
    /// `uncertainty < 0`.
    pub fn new(mean: f64, uncertainty: f64) -> Result<Self> {
        Ok(Self::from_parts(mean, M::validate(uncertainty)?))
    }

    /// A value with no uncertainty.
    pub const fn certain(value: f64) -> Self {
        Self::from_parts(value, 0.0)
    }

    const fn from_parts(value: f64, uncertainty: f64) -> Self {
        Self {
            value,
            uncertainty,
            mode: PhantomData,
        }
    }

    pub fn mean(&self) -> f64 {
        self.value
    }

    /// Standard deviation, always non-negative.
    pub fn deviation(&self) -> f64 {
        self.uncertainty.abs()
    }

    /// Raw uncertainty. In correlated mode its sign records the direction
    /// in which the value moves with the shared random draw.
    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

    /// `-self`. Correlated mode flips the uncertainty with the value.
    pub fn negated(&self) -> Self {
        let u = if M::CORRELATED {
            -self.uncertainty
        } else {
            self.uncertainty
        };
        Self::from_parts(-self.value, u)
    }

    pub fn plus(&self, other: &Self) -> Self {
        Self::from_parts(
            self.value + other.value,
            M::combine(self.uncertainty, other.uncertainty),
        )
    }

    pub fn minus(&self, other: &Self) -> Self {
        Self::from_parts(
            self.value - other.value,
            M::difference(self.uncertainty, other.uncertainty),
        )
    }

    /// Product rule: `uₐ·b ⊕ u_b·a`.
    pub fn times(&self, other: &Self) -> Self {
        let (a, b) = (self.value, other.value);
        Self::from_parts(
            a * b,
            M::combine(M::scale(self.uncertainty, b), M::scale(other.uncertainty, a)),
        )
    }

    /// Quotient rule: `uₐ/b ⊖ u_b·a/b²`.
    pub fn over(&self, other: &Self) -> Self {
        let (a, b) = (self.value, other.value);
        Self::from_parts(
            a / b,
            M::difference(
                M::scale(self.uncertainty, 1.0 / b),
                M::scale(other.uncertainty, a / (b * b)),
            ),
        )
    }

    pub fn shifted(&self, k: f64) -> Self {
        Self::from_parts(self.value + k, self.uncertainty)
    }

    pub fn scaled(&self, k: f64) -> Self {
        Self::from_parts(self.value * k, M::scale(self.uncertainty, k))
    }

    pub fn divided(&self, k: f64) -> Self {
        Self::from_parts(self.value / k, M::scale(self.uncertainty, 1.0 / k))
    }

    /// `k / self`, slope `-k/x²`.
    pub fn inverted_times(&self, k: f64) -> Self {
        let x = self.value;
        Self::from_parts(k / x, M::scale(self.uncertainty, -k / (x * x)))
    }
}

impl_uncertain_ops!([M: CorrelationMode] SimpleScalar<M>);

impl<M: CorrelationMode> Elementary for SimpleScalar<M> {
    /// Scales the uncertainty by the closed-form slope. Step functions have
    /// slope 0, so `ceil` and `floor` yield certain values.
    fn apply(&self, f: Unary) -> Self {
        let m = f.moments(self.value);
        Self::from_parts(m.value, M::scale(self.uncertainty, m.slope))
    }

    fn apply2(&self, f: Binary, other: &Self) -> Self {
        let (a, b) = (self.value, other.value);
        let (value, slope_a, slope_b) = match f {
            Binary::Fmod => (a % b, 1.0, -(a / b).trunc()),
            _ => {
                let (da, db) = f.moments(a, b);
                (da.value, da.slope, db.slope)
            }
        };
        Self::from_parts(
            value,
            M::combine(
                M::scale(self.uncertainty, slope_a),
                M::scale(other.uncertainty, slope_b),
            ),
        )
    }

    /// Finite-difference slope over one standard deviation.
    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        let m = propagate_by_slope(f, self.value, self.deviation());
        Self::from_parts(m.value, M::scale(self.uncertainty, m.slope))
    }

    fn center(&self) -> f64 {
        self.value
    }
}

impl<M: CorrelationMode> From<f64> for SimpleScalar<M> {
    fn from(value: f64) -> Self {
        Self::certain(value)
    }
}

impl<M: CorrelationMode> fmt::Display for SimpleScalar<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format::write_mean_sigma(f, self.value, self.uncertainty)
    }
}

impl<M: CorrelationMode> FromStr for SimpleScalar<M> {
    type Err = UncertainError;

    fn from_str(s: &str) -> Result<Self> {
        let (mean, sigma) = format::parse_mean_sigma(s)?;
        Self::new(mean, sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Correlated, Uncorrelated};

    type Corr = SimpleScalar<Correlated>;
    type Uncorr = SimpleScalar<Uncorrelated>;

    fn corr(m: f64, u: f64) -> Corr {
        Corr::new(m, u).unwrap()
    }

    fn uncorr(m: f64, u: f64) -> Uncorr {
        Uncorr::new(m, u).unwrap()
    }

    #[test]
    fn test_uncorrelated_rejects_negative() {
        assert_eq!(
            Uncorr::new(1.0, -0.5),
            Err(UncertainError::NegativeUncertainty(-0.5))
        );
        let c = corr(1.0, -0.5);
        assert_eq!(c.uncertainty(), -0.5);
        assert_eq!(c.deviation(), 0.5);
    }

    #[test]
    fn test_sqrt() {
        let r = corr(4.0, 2.0).sqrt();
        assert_eq!(r.mean(), 2.0);
        assert_eq!(r.deviation(), 0.5);
    }

    #[test]
    fn test_pow_correlated_vs_uncorrelated() {
        let rc = corr(4.0, 2.0).pow(&corr(2.0, 0.1));
        assert_eq!(rc.mean(), 16.0);
        assert!((rc.deviation() - 18.218071).abs() < 1e-6);

        let ru = uncorr(4.0, 2.0).pow(&uncorr(2.0, 0.1));
        assert_eq!(ru.mean(), 16.0);
        assert!((ru.deviation() - 16.153013).abs() < 1e-6);
    }

    #[test]
    fn test_ceil_floor_zero_uncertainty() {
        let r = uncorr(2.5, 1.0).ceil();
        assert_eq!(r.mean(), 3.0);
        assert_eq!(r.deviation(), 0.0);
        let r = corr(2.5, 1.0).floor();
        assert_eq!(r.mean(), 2.0);
        assert_eq!(r.deviation(), 0.0);
    }

    #[test]
    fn test_same_source_doubling() {
        let a = corr(3.0, 0.7);
        assert_eq!((a + a).deviation(), 2.0 * a.deviation());
        assert_eq!((a - a).deviation(), 0.0);
    }

    #[test]
    fn test_independent_addition() {
        let a = uncorr(3.0, 0.3);
        let b = uncorr(1.0, 0.4);
        assert!(((a + b).deviation() - 0.5).abs() < 1e-15);
        assert!(((a - b).deviation() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_negation() {
        let c = corr(2.0, 0.5);
        assert_eq!((-c).uncertainty(), -0.5);
        assert_eq!(-(-c), c);
        let u = uncorr(2.0, 0.5);
        assert_eq!((-u).uncertainty(), 0.5);
        assert_eq!((-u).mean(), -2.0);
    }

    #[test]
    fn test_correlated_product_and_quotient() {
        let a = corr(3.0, 0.1);
        let b = corr(2.0, 0.2);
        let p = a * b;
        assert_eq!(p.mean(), 6.0);
        assert!((p.uncertainty() - (0.1 * 2.0 + 0.2 * 3.0)).abs() < 1e-15);

        // x / x is exactly 1 for a shared draw.
        let q = a / a;
        assert_eq!(q.mean(), 1.0);
        assert!(q.uncertainty().abs() < 1e-15);
    }

    #[test]
    fn test_uncorrelated_quotient() {
        let q = uncorr(4.0, 0.4) / uncorr(2.0, 0.1);
        assert_eq!(q.mean(), 2.0);
        let expected = (0.4_f64 / 2.0).hypot(0.1 * 4.0 / 4.0);
        assert!((q.deviation() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_real_operands() {
        let x = corr(2.0, 0.5);
        let r = 1.0 / x;
        assert_eq!(r.mean(), 0.5);
        assert_eq!(r.uncertainty(), -0.125);

        let s = 10.0 - x;
        assert_eq!(s.mean(), 8.0);
        assert_eq!(s.uncertainty(), -0.5);

        let mut y = x;
        y += 1.0;
        y *= 2.0;
        y -= 1.0;
        y /= 4.0;
        assert_eq!(y.mean(), 1.25);
        assert_eq!(y.uncertainty(), 0.25);

        let u = -3.0 * uncorr(1.0, 0.5);
        assert_eq!(u.uncertainty(), 1.5);
    }

    #[test]
    fn test_compound_assignment_with_values() {
        let mut a = uncorr(1.0, 0.3);
        a += uncorr(1.0, 0.4);
        assert!((a.deviation() - 0.5).abs() < 1e-15);
        a /= &uncorr(2.0, 0.0);
        assert_eq!(a.mean(), 1.0);
        assert!((a.deviation() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_fmod_slopes() {
        let r = corr(7.0, 0.1).fmod(&corr(3.0, 0.01));
        assert_eq!(r.mean(), 1.0);
        assert!((r.uncertainty() - (0.1 - 2.0 * 0.01)).abs() < 1e-15);
    }

    #[test]
    fn test_certain_values_stay_certain() {
        let x = Uncorr::certain(0.3);
        assert_eq!(x.sin().deviation(), 0.0);
        assert_eq!((x * x).deviation(), 0.0);
        let y: Corr = 2.0.into();
        assert_eq!(y.log().uncertainty(), 0.0);
    }

    #[test]
    fn test_map_uses_one_sigma_step() {
        let x = corr(4.0, 2.0);
        let r = x.map(f64::sqrt);
        assert_eq!(r.mean(), 2.0);
        let expected = (6.0_f64.sqrt() - 2.0_f64.sqrt()) / 4.0 * 2.0;
        assert!((r.uncertainty() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_modf_and_frexp() {
        let (frac, whole) = corr(2.75, 0.01).modf();
        assert_eq!(frac.mean(), 0.75);
        assert_eq!(frac.uncertainty(), 0.01);
        assert_eq!(whole.mean(), 2.0);
        assert_eq!(whole.deviation(), 0.0);

        let (m, e) = uncorr(12.0, 1.0).frexp();
        assert_eq!(e, 4);
        assert_eq!(m.mean(), 0.75);
        assert_eq!(m.deviation(), 1.0 / 16.0);
        let back = m.ldexp(e);
        assert_eq!(back.mean(), 12.0);
        assert_eq!(back.deviation(), 1.0);
    }

    #[test]
    fn test_display_and_parse() {
        let x = uncorr(3.14159, 0.0123);
        assert_eq!(x.to_string(), "3.142 +/- 0.012");
        let y: Uncorr = "3.142 +/- 0.012".parse().unwrap();
        assert_eq!(y.to_string(), x.to_string());
        assert!("3.142 -/+ 0.012".parse::<Uncorr>().is_err());
        assert_eq!(
            "1 +/- -1".parse::<Uncorr>(),
            Err(UncertainError::NegativeUncertainty(-1.0))
        );
    }
}
