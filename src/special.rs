//! Standard normal distribution functions.
//!
//! Rational and polynomial approximations used to build the ensemble
//! template and to quantify how much probability mass lies beyond a
//! discontinuity.

/// 1/√(2π) ≈ 0.3989422804014327
const FRAC_1_SQRT_2PI: f64 = 0.3989422804014326779399460599343818684758586311649;

/// Φ(x), used only to size the tail beyond a discontinuity in gauss-loss
/// warnings.
///
/// A&S 26.2.17 polynomial; absolute error below 7.5e-8, far finer than a
/// diagnostic needs.
///
/// # Examples
/// ```
/// use u_uncertain::special::standard_normal_cdf;
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-3);
/// ```
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }

    let abs_x = x.abs();
    let k = 1.0 / (1.0 + 0.2316419 * abs_x);
    let phi = FRAC_1_SQRT_2PI * (-0.5 * abs_x * abs_x).exp();
    let poly = k
        * (0.319381530
            + k * (-0.356563782 + k * (1.781477937 + k * (-1.821255978 + k * 1.330274429))));
    let cdf_abs = 1.0 - phi * poly;

    if x >= 0.0 {
        cdf_abs
    } else {
        1.0 - cdf_abs
    }
}

/// Probability that a Gaussian draw lands more than `distance` away from
/// its mean on one given side, for standard deviation `sigma`.
///
/// Returns 0 when `sigma` is zero and the distance is positive, and 0.5
/// when the distance is zero.
///
/// # Examples
/// ```
/// use u_uncertain::special::tail_mass;
/// assert!((tail_mass(0.0, 1.0) - 0.5).abs() < 1e-7);
/// assert!(tail_mass(3.0, 1.0) < 0.002);
/// ```
pub fn tail_mass(distance: f64, sigma: f64) -> f64 {
    let d = distance.abs();
    if d == 0.0 {
        return 0.5;
    }
    if sigma == 0.0 {
        return 0.0;
    }
    (1.0 - standard_normal_cdf(d / sigma.abs())).clamp(0.0, 0.5)
}

/// Quantile `z` with `Φ(z) = p`, the starting point of every ensemble
/// template.
///
/// A&S 26.2.23 rational form, absolute error below 4.5e-4. Template
/// perfection removes the resulting moment bias, so nothing finer is used.
///
/// # Returns
/// - `f64::NAN` if `p` is outside `[0, 1]` or NaN.
/// - `f64::NEG_INFINITY` if `p == 0.0`.
/// - `f64::INFINITY` if `p == 1.0`.
///
/// # Examples
/// ```
/// use u_uncertain::special::inverse_normal_cdf;
/// assert!((inverse_normal_cdf(0.5)).abs() < 1e-4);
/// assert!((inverse_normal_cdf(0.975) - 1.96).abs() < 0.01);
/// ```
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let (q, sign) = if p > 0.5 { (1.0 - p, 1.0) } else { (p, -1.0) };

    // A&S 26.2.23: t = √(-2 ln(q))
    let t = (-2.0 * q.ln()).sqrt();

    const C0: f64 = 2.515517;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;

    let z = t - (C0 + C1 * t + C2 * t * t) / (1.0 + D1 * t + D2 * t * t + D3 * t * t * t);

    sign * z
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_at_zero() {
        assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn test_cdf_known_values() {
        assert!((standard_normal_cdf(1.0) - 0.8413).abs() < 0.001);
        assert!((standard_normal_cdf(2.0) - 0.9772).abs() < 0.001);
        assert!((standard_normal_cdf(3.0) - 0.9987).abs() < 0.001);
        assert!((standard_normal_cdf(-1.96) - 0.025).abs() < 0.001);
    }

    #[test]
    fn test_cdf_extremes() {
        assert_eq!(standard_normal_cdf(f64::INFINITY), 1.0);
        assert_eq!(standard_normal_cdf(f64::NEG_INFINITY), 0.0);
        assert!(standard_normal_cdf(f64::NAN).is_nan());
    }

    #[test]
    fn test_tail_mass() {
        assert_eq!(tail_mass(1.0, 0.0), 0.0);
        assert!((tail_mass(-1.0, 1.0) - 0.1587).abs() < 1e-3);
        assert!((tail_mass(2.0, 2.0) - tail_mass(1.0, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_cdf_known_values() {
        assert!(inverse_normal_cdf(0.5).abs() < 1e-4);
        assert!((inverse_normal_cdf(0.8413) - 1.0).abs() < 0.01);
        assert!((inverse_normal_cdf(0.975) - 1.96).abs() < 0.01);
    }

    #[test]
    fn test_inverse_cdf_symmetry() {
        for &p in &[0.01, 0.1, 0.25, 0.4] {
            let sum = inverse_normal_cdf(p) + inverse_normal_cdf(1.0 - p);
            assert!(sum.abs() < 1e-12, "Φ⁻¹({p}) + Φ⁻¹(1-{p}) = {sum}");
        }
    }

    #[test]
    fn test_inverse_cdf_extremes() {
        assert_eq!(inverse_normal_cdf(0.0), f64::NEG_INFINITY);
        assert_eq!(inverse_normal_cdf(1.0), f64::INFINITY);
        assert!(inverse_normal_cdf(f64::NAN).is_nan());
        assert!(inverse_normal_cdf(-0.1).is_nan());
        assert!(inverse_normal_cdf(1.1).is_nan());
    }
}
