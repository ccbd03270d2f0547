//! Second-order (slope + curvature) propagation on a `(mean, sigma)` pair.
//!
//! Every function application nudges the mean by `½·f''·u²` and widens the
//! uncertainty by the curvature term:
//!
//! ```text
//! u' = f'·u·sqrt(1 + ½(f''·u / f')²)      f' ≠ 0
//! u' = f''·u² / √2                          f' = 0
//! ```
//!
//! which is the exact standard deviation of the quadratic Taylor
//! polynomial of `f` under a Gaussian input. Before applying a function,
//! the input's spread is compared with the distance to the function's
//! nearest discontinuity; when it reaches within the mode's threshold a
//! `gauss_loss` warning is emitted through `tracing`.

use std::f64::consts::SQRT_2;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::elementary::Elementary;
use crate::error::{Result, UncertainError};
use crate::format;
use crate::mode::CorrelationMode;
use crate::moments::{propagate_by_slope, Binary, Moments, Unary};
use crate::special;

/// A mean with a single uncertainty propagated to second order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvedScalar<M: CorrelationMode> {
    value: f64,
    uncertainty: f64,
    mode: PhantomData<M>,
}

/// Mean shift and uncertainty term of `f(x + u·z)` for a unit Gaussian `z`.
fn second_order<M: CorrelationMode>(slope: f64, curve: f64, u: f64) -> (f64, f64) {
    if u == 0.0 {
        return (0.0, 0.0);
    }
    let shift = 0.5 * curve * u * u;
    let term = if slope == 0.0 {
        curve * u * u / SQRT_2
    } else {
        let ratio = curve * u / slope;
        slope * u * (1.0 + 0.5 * ratio * ratio).sqrt()
    };
    (shift, M::scale(term, 1.0))
}

/// Emits the gauss-loss warning when `u` reaches within `threshold`
/// standard deviations of the discontinuity described by `m`.
fn warn_gauss_loss(function: &str, x: f64, u: f64, m: &Moments, threshold: f64) -> bool {
    if !m.breaks_gaussian(u, threshold) {
        return false;
    }
    tracing::warn!(
        function,
        x,
        uncertainty = u,
        distance = m.distance,
        discontinuity = ?m.discontinuity,
        tail = special::tail_mass(m.distance, u),
        "gauss_loss: uncertainty reaches a discontinuity, result is not Gaussian"
    );
    true
}

impl<M: CorrelationMode> CurvedScalar<M> {
    /// Creates a value with the given mean and uncertainty.
    ///
    /// # Errors
    /// [`UncertainError::NegativeUncertainty`] in uncorrelated mode when
    /// `uncertainty < 0`.
    pub fn new(mean: f64, uncertainty: f64) -> Result<Self> {
        Ok(Self::from_parts(mean, M::validate(uncertainty)?))
    }

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

    pub fn deviation(&self) -> f64 {
        self.uncertainty.abs()
    }

    /// Raw, possibly signed, uncertainty.
    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

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

    /// Product of two curved values.
    ///
    /// Correlated: `(a + uₐz)(b + u_b z)` has mean `ab + uₐu_b` and
    /// variance `(a·u_b + b·uₐ)² + 2(uₐu_b)²`. Uncorrelated: mean `ab`,
    /// variance `a²u_b² + b²uₐ² + uₐ²u_b²`.
    pub fn times(&self, other: &Self) -> Self {
        let (a, ua) = (self.value, self.uncertainty);
        let (b, ub) = (other.value, other.uncertainty);
        if M::CORRELATED {
            let linear = a * ub + b * ua;
            let quadratic = ua * ub;
            let u = if linear == 0.0 {
                SQRT_2 * quadratic
            } else {
                let ratio = quadratic / linear;
                linear * (1.0 + 2.0 * ratio * ratio).sqrt()
            };
            Self::from_parts(a * b + quadratic, u)
        } else {
            let u = ((a * ub).powi(2) + (b * ua).powi(2) + (ua * ub).powi(2)).sqrt();
            Self::from_parts(a * b, u)
        }
    }

    /// Quotient of two curved values.
    ///
    /// Correlated mode expands `(a + uₐz)/(b + u_b z)` to second order in
    /// the shared draw `z`. Uncorrelated mode multiplies by the curved
    /// reciprocal of the divisor.
    pub fn over(&self, other: &Self) -> Self {
        let (b, ub) = (other.value, other.uncertainty);
        if !M::CORRELATED {
            return self.times(&other.apply(Unary::Recip));
        }
        other.check_gauss_loss("divide", &Unary::Recip.moments(b));
        let (a, ua) = (self.value, self.uncertainty);
        let slope = (ua * b - a * ub) / (b * b);
        let curve = -2.0 * ub * slope / b;
        let (shift, u) = second_order::<M>(slope, curve, 1.0);
        Self::from_parts(a / b + shift, u)
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

    /// `k / self` through the curved reciprocal.
    pub fn inverted_times(&self, k: f64) -> Self {
        self.apply(Unary::Recip).scaled(k)
    }

    /// Whether applying `f` reaches within the mode's discontinuity
    /// threshold of one of `f`'s discontinuities. Division checks the
    /// divisor against [`Unary::Recip`].
    pub fn loses_gaussianity(&self, f: Unary) -> bool {
        f.moments(self.value)
            .breaks_gaussian(self.uncertainty, M::discontinuity_threshold())
    }

    fn check_gauss_loss(&self, name: &str, m: &Moments) -> bool {
        warn_gauss_loss(
            name,
            self.value,
            self.uncertainty,
            m,
            M::discontinuity_threshold(),
        )
    }

    fn apply_moments(&self, name: &str, m: &Moments) -> Self {
        self.check_gauss_loss(name, m);
        let (shift, term) = second_order::<M>(m.slope, m.curve, self.uncertainty);
        Self::from_parts(m.value + shift, term)
    }
}

impl_uncertain_ops!([M: CorrelationMode] CurvedScalar<M>);

impl<M: CorrelationMode> Elementary for CurvedScalar<M> {
    fn apply(&self, f: Unary) -> Self {
        self.apply_moments(f.name(), &f.moments(self.value))
    }

    /// Both arguments' mean shifts add; their curved terms combine under
    /// the mode's rule. Cross partials are ignored.
    fn apply2(&self, f: Binary, other: &Self) -> Self {
        let (ua, ub) = (self.uncertainty, other.uncertainty);
        let (da, db) = f.moments(self.value, other.value);
        self.check_gauss_loss(f.name(), &da);
        other.check_gauss_loss(f.name(), &db);

        let (shift_a, term_a) = second_order::<M>(da.slope, da.curve, ua);
        let (shift_b, term_b) = second_order::<M>(db.slope, db.curve, ub);
        Self::from_parts(da.value + shift_a + shift_b, M::combine(term_a, term_b))
    }

    /// Finite-difference slope and curve over one standard deviation.
    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        let m = propagate_by_slope(f, self.value, self.deviation());
        self.apply_moments("map", &m)
    }

    fn center(&self) -> f64 {
        self.value
    }
}

impl<M: CorrelationMode> From<f64> for CurvedScalar<M> {
    fn from(value: f64) -> Self {
        Self::certain(value)
    }
}

impl<M: CorrelationMode> fmt::Display for CurvedScalar<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format::write_mean_sigma(f, self.value, self.uncertainty)
    }
}

impl<M: CorrelationMode> FromStr for CurvedScalar<M> {
    type Err = UncertainError;

    fn from_str(s: &str) -> Result<Self> {
        let (mean, sigma) = format::parse_mean_sigma(s)?;
        Self::new(mean, sigma)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::mode::Uncorrelated;
    use crate::scalar::SimpleScalar;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn agrees_with_first_order_for_small_uncertainty(x in 0.5_f64..3.0) {
            let u = 1e-6;
            let curved = CurvedScalar::<Uncorrelated>::new(x, u).unwrap();
            let simple = SimpleScalar::<Uncorrelated>::new(x, u).unwrap();
            for f in [Unary::Sqrt, Unary::Exp, Unary::Log, Unary::Atan, Unary::Tanh] {
                let c = curved.apply(f);
                let s = simple.apply(f);
                prop_assert!((c.mean() - s.mean()).abs() < 1e-9);
                prop_assert!((c.deviation() - s.deviation()).abs() < 1e-9 * s.deviation().max(1e-6));
            }
        }

        #[test]
        fn uncorrelated_deviation_non_negative(x in 0.1_f64..5.0, u in 0.0_f64..0.5) {
            let v = CurvedScalar::<Uncorrelated>::new(x, u).unwrap();
            let r = (v.log() * v.cos()) / (v + 1.0);
            prop_assert!(r.uncertainty() >= 0.0);
        }
    }
}
