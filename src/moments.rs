//! Elementary-function moment metadata.
//!
//! For every supported function this module answers, at a given argument:
//! the value, the first derivative (slope), the second derivative (curve),
//! and, where the function is not smooth, what kind of discontinuity is
//! nearest and how far away it is. Every representation consumes the same
//! tables, so the per-function knowledge lives in exactly one place.
//!
//! Two-argument functions report the triple independently per argument.
//! Cross second partials are not modelled.
//!
//! # Distances
//!
//! `distance` is the signed offset `x − x_d` from the nearest
//! discontinuity `x_d` to the argument `x`, in argument units. It is
//! `+∞` when the function has no discontinuity.

use std::f64::consts::{FRAC_PI_2, LN_10, PI};

/// Kind of non-smoothness nearest to the evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discontinuity {
    /// Smooth everywhere.
    None,
    /// Finite jump in value (`ceil`, `floor`, `fmod`, ...).
    Step,
    /// Value goes to +∞ on one side and −∞ on the other (`tan`, `1/x`).
    InfiniteWrap,
    /// Value diverges, then the function is undefined beyond (`log`).
    InfiniteThenUndefined,
    /// Value is continuous but the slope jumps (`fabs`).
    SlopeOnly,
    /// Finite value at the edge, undefined beyond (`sqrt`, `asin`).
    UndefinedBeyond,
}

/// Value, slope, curvature and discontinuity proximity at one argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Function value.
    pub value: f64,
    /// First derivative.
    pub slope: f64,
    /// Second derivative.
    pub curve: f64,
    /// Nearest discontinuity kind.
    pub discontinuity: Discontinuity,
    /// Signed distance from the nearest discontinuity.
    pub distance: f64,
}

impl Moments {
    /// Metadata for a point with no nearby discontinuity.
    pub fn smooth(value: f64, slope: f64, curve: f64) -> Self {
        Self {
            value,
            slope,
            curve,
            discontinuity: Discontinuity::None,
            distance: f64::INFINITY,
        }
    }

    /// Attaches a discontinuity of `kind` at signed `distance`.
    pub fn with_discontinuity(self, kind: Discontinuity, distance: f64) -> Self {
        Self {
            discontinuity: kind,
            distance,
            ..self
        }
    }

    /// Whether an input spread of `sigma` reaches within `threshold`
    /// standard deviations of the discontinuity, i.e. the Gaussian
    /// approximation is no longer trustworthy.
    ///
    /// # Examples
    /// ```
    /// use u_uncertain::moments::Unary;
    /// let m = Unary::Sqrt.moments(0.5);
    /// assert!(m.breaks_gaussian(0.2, 3.0));
    /// assert!(!m.breaks_gaussian(0.1, 3.0));
    /// assert!(!m.breaks_gaussian(0.2, 0.0));
    /// ```
    pub fn breaks_gaussian(&self, sigma: f64, threshold: f64) -> bool {
        self.discontinuity != Discontinuity::None
            && sigma != 0.0
            && self.distance.abs() < threshold * sigma.abs()
    }
}

// ============================================================================
// One-argument table
// ============================================================================

/// One-argument elementary functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unary {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Ceil,
    Floor,
    Fabs,
    Exp,
    Log,
    Log10,
    Sinh,
    Cosh,
    Tanh,
    /// `1/x`.
    Recip,
    /// `x · 2ⁿ`.
    Ldexp(i32),
    /// Mantissa of `frexp`, in `[0.5, 1)` by magnitude.
    Frexp,
    /// Fractional part of `modf` (sign follows `x`).
    Fract,
    /// Integer part of `modf` (rounds toward zero).
    Trunc,
    /// `xᵖ` for a certain exponent `p`.
    PowConst(f64),
}

impl Unary {
    /// Function name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Unary::Sqrt => "sqrt",
            Unary::Sin => "sin",
            Unary::Cos => "cos",
            Unary::Tan => "tan",
            Unary::Asin => "asin",
            Unary::Acos => "acos",
            Unary::Atan => "atan",
            Unary::Ceil => "ceil",
            Unary::Floor => "floor",
            Unary::Fabs => "fabs",
            Unary::Exp => "exp",
            Unary::Log => "log",
            Unary::Log10 => "log10",
            Unary::Sinh => "sinh",
            Unary::Cosh => "cosh",
            Unary::Tanh => "tanh",
            Unary::Recip => "recip",
            Unary::Ldexp(_) => "ldexp",
            Unary::Frexp => "frexp",
            Unary::Fract => "modf",
            Unary::Trunc => "modf",
            Unary::PowConst(_) => "pow",
        }
    }

    /// Evaluates the function only.
    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            Unary::Sqrt => x.sqrt(),
            Unary::Sin => x.sin(),
            Unary::Cos => x.cos(),
            Unary::Tan => x.tan(),
            Unary::Asin => x.asin(),
            Unary::Acos => x.acos(),
            Unary::Atan => x.atan(),
            Unary::Ceil => x.ceil(),
            Unary::Floor => x.floor(),
            Unary::Fabs => x.abs(),
            Unary::Exp => x.exp(),
            Unary::Log => x.ln(),
            Unary::Log10 => x.log10(),
            Unary::Sinh => x.sinh(),
            Unary::Cosh => x.cosh(),
            Unary::Tanh => x.tanh(),
            Unary::Recip => 1.0 / x,
            Unary::Ldexp(n) => ldexp(x, n),
            Unary::Frexp => frexp(x).0,
            Unary::Fract => x.fract(),
            Unary::Trunc => x.trunc(),
            Unary::PowConst(p) => x.powf(p),
        }
    }

    /// Closed-form value, slope, curve and discontinuity at `x`.
    ///
    /// # Examples
    /// ```
    /// use u_uncertain::moments::{Discontinuity, Unary};
    /// let m = Unary::Sqrt.moments(4.0);
    /// assert_eq!(m.value, 2.0);
    /// assert_eq!(m.slope, 0.25);
    /// assert_eq!(m.discontinuity, Discontinuity::UndefinedBeyond);
    /// assert_eq!(m.distance, 4.0);
    /// ```
    pub fn moments(&self, x: f64) -> Moments {
        match *self {
            Unary::Sqrt => {
                let v = x.sqrt();
                Moments::smooth(v, 0.5 / v, -0.25 / (v * x))
                    .with_discontinuity(Discontinuity::UndefinedBeyond, x)
            }
            Unary::Sin => Moments::smooth(x.sin(), x.cos(), -x.sin()),
            Unary::Cos => Moments::smooth(x.cos(), -x.sin(), -x.cos()),
            Unary::Tan => {
                let t = x.tan();
                let sec2 = 1.0 + t * t;
                let pole = FRAC_PI_2 + ((x - FRAC_PI_2) / PI).round() * PI;
                Moments::smooth(t, sec2, 2.0 * t * sec2)
                    .with_discontinuity(Discontinuity::InfiniteWrap, x - pole)
            }
            Unary::Asin | Unary::Acos => {
                let r = 1.0 - x * x;
                let slope = 1.0 / r.sqrt();
                let curve = x / (r * r.sqrt());
                let edge = if x >= 0.0 { 1.0 } else { -1.0 };
                let (value, sign) = if *self == Unary::Asin {
                    (x.asin(), 1.0)
                } else {
                    (x.acos(), -1.0)
                };
                Moments::smooth(value, sign * slope, sign * curve)
                    .with_discontinuity(Discontinuity::UndefinedBeyond, x - edge)
            }
            Unary::Atan => {
                let r = 1.0 + x * x;
                Moments::smooth(x.atan(), 1.0 / r, -2.0 * x / (r * r))
            }
            Unary::Ceil => Moments::smooth(x.ceil(), 0.0, 0.0)
                .with_discontinuity(Discontinuity::Step, x - x.round()),
            Unary::Floor => Moments::smooth(x.floor(), 0.0, 0.0)
                .with_discontinuity(Discontinuity::Step, x - x.round()),
            Unary::Fabs => {
                let slope = if x < 0.0 { -1.0 } else { 1.0 };
                Moments::smooth(x.abs(), slope, 0.0)
                    .with_discontinuity(Discontinuity::SlopeOnly, x)
            }
            Unary::Exp => {
                let v = x.exp();
                Moments::smooth(v, v, v)
            }
            Unary::Log => Moments::smooth(x.ln(), 1.0 / x, -1.0 / (x * x))
                .with_discontinuity(Discontinuity::InfiniteThenUndefined, x),
            Unary::Log10 => Moments::smooth(x.log10(), 1.0 / (x * LN_10), -1.0 / (x * x * LN_10))
                .with_discontinuity(Discontinuity::InfiniteThenUndefined, x),
            Unary::Sinh => Moments::smooth(x.sinh(), x.cosh(), x.sinh()),
            Unary::Cosh => Moments::smooth(x.cosh(), x.sinh(), x.cosh()),
            Unary::Tanh => {
                let t = x.tanh();
                let sech2 = 1.0 - t * t;
                Moments::smooth(t, sech2, -2.0 * t * sech2)
            }
            Unary::Recip => {
                let v = 1.0 / x;
                Moments::smooth(v, -v * v, 2.0 * v * v * v)
                    .with_discontinuity(Discontinuity::InfiniteWrap, x)
            }
            Unary::Ldexp(n) => Moments::smooth(ldexp(x, n), ldexp(1.0, n), 0.0),
            Unary::Frexp => frexp_moments(x),
            Unary::Fract => Moments::smooth(x.fract(), 1.0, 0.0)
                .with_discontinuity(Discontinuity::Step, offset_from_nonzero_multiple(x, 1.0)),
            Unary::Trunc => Moments::smooth(x.trunc(), 0.0, 0.0)
                .with_discontinuity(Discontinuity::Step, offset_from_nonzero_multiple(x, 1.0)),
            Unary::PowConst(p) => power_base_moments(x, p),
        }
    }
}

// ============================================================================
// Two-argument table
// ============================================================================

/// Two-argument elementary functions, `f(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binary {
    /// `aᵇ`.
    Pow,
    /// `atan2(a, b)` with `a` the ordinate and `b` the abscissa.
    Atan2,
    /// `fmod(a, b)`, sign following `a`.
    Fmod,
}

impl Binary {
    /// Function name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Binary::Pow => "pow",
            Binary::Atan2 => "atan2",
            Binary::Fmod => "fmod",
        }
    }

    /// Evaluates the function only.
    pub fn eval(&self, a: f64, b: f64) -> f64 {
        match self {
            Binary::Pow => a.powf(b),
            Binary::Atan2 => a.atan2(b),
            Binary::Fmod => a % b,
        }
    }

    /// Per-argument moments at `(a, b)`. Both entries carry the same
    /// `value`; slope, curve and discontinuity are partials with respect to
    /// the first and second argument respectively.
    ///
    /// # Examples
    /// ```
    /// use u_uncertain::moments::Binary;
    /// let (da, db) = Binary::Pow.moments(4.0, 2.0);
    /// assert_eq!(da.value, 16.0);
    /// assert_eq!(da.slope, 8.0);
    /// assert!((db.slope - 16.0 * 4.0_f64.ln()).abs() < 1e-12);
    /// ```
    pub fn moments(&self, a: f64, b: f64) -> (Moments, Moments) {
        match self {
            Binary::Pow => {
                let value = a.powf(b);
                let base = power_base_moments(a, b);
                let exponent = if a > 0.0 {
                    let ln = a.ln();
                    Moments::smooth(value, value * ln, value * ln * ln)
                } else {
                    Moments::smooth(value, 0.0, 0.0)
                        .with_discontinuity(Discontinuity::UndefinedBeyond, 0.0)
                };
                (base, exponent)
            }
            Binary::Atan2 => {
                let value = a.atan2(b);
                let r2 = a * a + b * b;
                let mut da = Moments::smooth(value, b / r2, -2.0 * a * b / (r2 * r2));
                if b < 0.0 {
                    // Branch cut along the negative abscissa.
                    da = da.with_discontinuity(Discontinuity::Step, a);
                }
                let mut db = Moments::smooth(value, -a / r2, 2.0 * a * b / (r2 * r2));
                if a == 0.0 {
                    db = db.with_discontinuity(Discontinuity::Step, b);
                }
                (da, db)
            }
            Binary::Fmod => {
                let value = a % b;
                let quotient = (a / b).trunc();
                let da = Moments::smooth(value, 1.0, 0.0).with_discontinuity(
                    Discontinuity::Step,
                    offset_from_nonzero_multiple(a, b.abs()),
                );
                let db = Moments::smooth(value, -quotient, 0.0)
                    .with_discontinuity(Discontinuity::Step, fmod_divisor_offset(a, b));
                (da, db)
            }
        }
    }
}

// ============================================================================
// Finite-difference fallback and cross-check
// ============================================================================

/// Estimates slope and curve of an arbitrary `f` by centered finite
/// differences at `x ± sigma`.
///
/// With `sigma` equal to the input's standard deviation this is the
/// degraded-accuracy propagation used for functions without a closed form.
/// When `sigma` is zero a small relative step is used instead. The result
/// never reports a discontinuity.
///
/// # Examples
/// ```
/// use u_uncertain::moments::propagate_by_slope;
/// // Exact for quadratics at any step.
/// let m = propagate_by_slope(|x| x * x, 3.0, 0.5);
/// assert!((m.slope - 6.0).abs() < 1e-12);
/// assert!((m.curve - 2.0).abs() < 1e-12);
/// ```
pub fn propagate_by_slope<F: Fn(f64) -> f64>(f: F, x: f64, sigma: f64) -> Moments {
    let h = if sigma != 0.0 {
        sigma.abs()
    } else {
        f64::EPSILON.cbrt() * x.abs().max(1.0)
    };
    let hi = f(x + h);
    let mid = f(x);
    let lo = f(x - h);
    Moments::smooth(mid, (hi - lo) / (2.0 * h), (hi - 2.0 * mid + lo) / (h * h))
}

const SLOPE_TOLERANCE: f64 = 1e-6;
const CURVE_TOLERANCE: f64 = 1e-3;

fn agrees(closed: f64, numeric: f64, tolerance: f64) -> bool {
    if closed == numeric {
        return true;
    }
    let scale = closed.abs().max(numeric.abs()).max(1.0);
    (closed - numeric).abs() <= tolerance * scale
}

/// Compares the closed-form slope and curve of `f` at `x` against a
/// small-step finite-difference estimate.
///
/// Emits a "different values" warning and returns `false` when they
/// disagree beyond tolerance. Only meaningful away from discontinuities.
pub fn cross_check(f: Unary, x: f64) -> bool {
    let closed = f.moments(x);
    let numeric = propagate_by_slope(|t| f.eval(t), x, 0.0);
    report_agreement(f.name(), x, &closed, &numeric)
}

/// [`cross_check`] for both partials of a two-argument function.
pub fn cross_check2(f: Binary, a: f64, b: f64) -> bool {
    let (da, db) = f.moments(a, b);
    let na = propagate_by_slope(|t| f.eval(t, b), a, 0.0);
    let nb = propagate_by_slope(|t| f.eval(a, t), b, 0.0);
    let first = report_agreement(f.name(), a, &da, &na);
    let second = report_agreement(f.name(), b, &db, &nb);
    first && second
}

fn report_agreement(name: &str, x: f64, closed: &Moments, numeric: &Moments) -> bool {
    let ok = agrees(closed.value, numeric.value, SLOPE_TOLERANCE)
        && agrees(closed.slope, numeric.slope, SLOPE_TOLERANCE)
        && agrees(closed.curve, numeric.curve, CURVE_TOLERANCE);
    if !ok {
        tracing::warn!(
            function = name,
            x,
            closed_slope = closed.slope,
            numeric_slope = numeric.slope,
            closed_curve = closed.curve,
            numeric_curve = numeric.curve,
            "different values between closed-form and finite-difference propagation"
        );
    }
    ok
}

// ============================================================================
// Helpers
// ============================================================================

/// `x · 2ⁿ`, split in two factors so that large `|n|` does not overflow
/// the intermediate power.
pub fn ldexp(x: f64, exp: i32) -> f64 {
    let half = exp / 2;
    x * 2f64.powi(half) * 2f64.powi(exp - half)
}

/// Splits `x` into a mantissa with magnitude in `[0.5, 1)` and a power of
/// two, `x = m · 2ᵉ`. Zero and non-finite inputs return `(x, 0)`.
///
/// # Examples
/// ```
/// use u_uncertain::moments::frexp;
/// assert_eq!(frexp(8.0), (0.5, 4));
/// assert_eq!(frexp(-3.0), (-0.75, 2));
/// assert_eq!(frexp(0.0), (0.0, 0));
/// ```
pub fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let mut e = x.abs().log2().floor() as i32 + 1;
    let mut m = ldexp(x, -e);
    if m.abs() >= 1.0 {
        m *= 0.5;
        e += 1;
    } else if m.abs() < 0.5 {
        m *= 2.0;
        e -= 1;
    }
    (m, e)
}

fn frexp_moments(x: f64) -> Moments {
    let (m, e) = frexp(x);
    if x == 0.0 {
        return Moments::smooth(m, 1.0, 0.0).with_discontinuity(Discontinuity::Step, 0.0);
    }
    let lower = ldexp(1.0, e - 1);
    let upper = 2.0 * lower;
    let mag = x.abs();
    let boundary = if mag - lower <= upper - mag { lower } else { upper };
    Moments::smooth(m, ldexp(1.0, -e), 0.0)
        .with_discontinuity(Discontinuity::Step, x.signum() * (mag - boundary))
}

/// Moments of `xᵖ` with respect to the base.
fn power_base_moments(x: f64, p: f64) -> Moments {
    let value = x.powf(p);
    let slope = if p == 0.0 { 0.0 } else { p * x.powf(p - 1.0) };
    let curve = if p == 0.0 || p == 1.0 {
        0.0
    } else {
        p * (p - 1.0) * x.powf(p - 2.0)
    };
    let m = Moments::smooth(value, slope, curve);
    let integral = p.fract() == 0.0;
    match (integral, p >= 0.0) {
        (true, true) => m,
        (true, false) => m.with_discontinuity(Discontinuity::InfiniteWrap, x),
        (false, true) => m.with_discontinuity(Discontinuity::UndefinedBeyond, x),
        (false, false) => m.with_discontinuity(Discontinuity::InfiniteThenUndefined, x),
    }
}

/// Signed offset of `x` from the nearest non-zero multiple of `period`.
/// Functions that truncate toward zero are continuous at 0, so the zero
/// multiple is skipped.
fn offset_from_nonzero_multiple(x: f64, period: f64) -> f64 {
    let mut k = (x / period).round();
    if k == 0.0 {
        k = if x < 0.0 { -1.0 } else { 1.0 };
    }
    x - k * period
}

/// Signed offset of the divisor `b` from the nearest divisor at which
/// `a / b` crosses an integer, which is where `fmod(a, b)` jumps.
fn fmod_divisor_offset(a: f64, b: f64) -> f64 {
    let mag_a = a.abs();
    let mag_b = b.abs();
    let whole = (mag_a / mag_b).trunc();
    let below = mag_a / (whole + 1.0);
    let nearest = if whole == 0.0 {
        below
    } else {
        let above = mag_a / whole;
        if above - mag_b <= mag_b - below {
            above
        } else {
            below
        }
    };
    b.signum() * (mag_b - nearest)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SMOOTH: [Unary; 12] = [
        Unary::Sqrt,
        Unary::Sin,
        Unary::Cos,
        Unary::Tan,
        Unary::Atan,
        Unary::Exp,
        Unary::Log,
        Unary::Log10,
        Unary::Sinh,
        Unary::Cosh,
        Unary::Tanh,
        Unary::Recip,
    ];

    #[test]
    fn test_closed_forms_match_finite_differences() {
        for f in SMOOTH {
            for &x in &[0.3, 0.7, 1.3, 2.9] {
                assert!(cross_check(f, x), "{} disagrees at {x}", f.name());
            }
        }
        for f in [Unary::Asin, Unary::Acos] {
            for &x in &[-0.6, -0.1, 0.2, 0.8] {
                assert!(cross_check(f, x), "{} disagrees at {x}", f.name());
            }
        }
        for p in [-2.0, -0.5, 0.5, 2.0, 3.0] {
            assert!(cross_check(Unary::PowConst(p), 1.7));
        }
        assert!(cross_check(Unary::Ldexp(3), 1.1));
        assert!(cross_check(Unary::Frexp, 3.0));
    }

    #[test]
    fn test_binary_closed_forms_match_finite_differences() {
        assert!(cross_check2(Binary::Pow, 4.0, 2.0));
        assert!(cross_check2(Binary::Pow, 1.5, -0.7));
        assert!(cross_check2(Binary::Atan2, 1.0, 2.0));
        assert!(cross_check2(Binary::Atan2, -0.5, 0.8));
        assert!(cross_check2(Binary::Fmod, 7.3, 2.0));
    }

    #[test]
    fn test_cross_check_detects_wrong_slope() {
        let closed = Moments::smooth(1.0, 2.0, 0.0);
        let numeric = Moments::smooth(1.0, 2.5, 0.0);
        assert!(!report_agreement("test", 0.0, &closed, &numeric));
    }

    #[test]
    fn test_sqrt_domain_edge() {
        let m = Unary::Sqrt.moments(0.09);
        assert_eq!(m.discontinuity, Discontinuity::UndefinedBeyond);
        assert_eq!(m.distance, 0.09);
        assert!(Unary::Sqrt.moments(-1.0).value.is_nan());
    }

    #[test]
    fn test_tan_pole_distance() {
        let m = Unary::Tan.moments(1.5);
        assert_eq!(m.discontinuity, Discontinuity::InfiniteWrap);
        assert!((m.distance - (1.5 - FRAC_PI_2)).abs() < 1e-15);
        let m = Unary::Tan.moments(-1.5);
        assert!((m.distance - (-1.5 + FRAC_PI_2)).abs() < 1e-15);
    }

    #[test]
    fn test_asin_edges() {
        let m = Unary::Asin.moments(0.9);
        assert!((m.distance + 0.1).abs() < 1e-15);
        let m = Unary::Acos.moments(-0.9);
        assert!((m.distance - 0.1).abs() < 1e-15);
        assert!(m.slope < 0.0);
    }

    #[test]
    fn test_step_functions_have_zero_slope() {
        for f in [Unary::Ceil, Unary::Floor, Unary::Trunc] {
            let m = f.moments(2.3);
            assert_eq!(m.slope, 0.0);
            assert_eq!(m.curve, 0.0);
            assert_eq!(m.discontinuity, Discontinuity::Step);
        }
        assert!((Unary::Ceil.moments(2.3).distance - 0.3).abs() < 1e-15);
        assert!((Unary::Floor.moments(2.8).distance + 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_truncation_is_continuous_at_zero() {
        // modf's pieces only jump at non-zero integers.
        assert!((Unary::Fract.moments(0.1).distance + 0.9).abs() < 1e-15);
        assert!((Unary::Trunc.moments(-0.2).distance - 0.8).abs() < 1e-15);
        assert_eq!(Unary::Fract.moments(-2.25).value, -0.25);
        assert_eq!(Unary::Trunc.moments(-2.25).value, -2.0);
    }

    #[test]
    fn test_fabs_slope_sign() {
        assert_eq!(Unary::Fabs.moments(-3.0).slope, -1.0);
        assert_eq!(Unary::Fabs.moments(3.0).slope, 1.0);
        assert_eq!(
            Unary::Fabs.moments(3.0).discontinuity,
            Discontinuity::SlopeOnly
        );
    }

    #[test]
    fn test_pow_const_classification() {
        assert_eq!(
            Unary::PowConst(2.0).moments(1.0).discontinuity,
            Discontinuity::None
        );
        assert_eq!(
            Unary::PowConst(-1.0).moments(1.0).discontinuity,
            Discontinuity::InfiniteWrap
        );
        assert_eq!(
            Unary::PowConst(0.5).moments(1.0).discontinuity,
            Discontinuity::UndefinedBeyond
        );
        assert_eq!(
            Unary::PowConst(-0.5).moments(1.0).discontinuity,
            Discontinuity::InfiniteThenUndefined
        );
        let m = Unary::PowConst(0.0).moments(5.0);
        assert_eq!((m.value, m.slope, m.curve), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_pow_exponent_partial_for_non_positive_base() {
        let (_, db) = Binary::Pow.moments(-2.0, 2.0);
        assert_eq!(db.slope, 0.0);
        assert_eq!(db.discontinuity, Discontinuity::UndefinedBeyond);
    }

    #[test]
    fn test_atan2_branch_cut() {
        let (da, _) = Binary::Atan2.moments(0.1, -1.0);
        assert_eq!(da.discontinuity, Discontinuity::Step);
        assert_eq!(da.distance, 0.1);
        let (da, db) = Binary::Atan2.moments(0.1, 1.0);
        assert_eq!(da.discontinuity, Discontinuity::None);
        assert_eq!(db.discontinuity, Discontinuity::None);
    }

    #[test]
    fn test_fmod_partials() {
        let (da, db) = Binary::Fmod.moments(7.0, 2.0);
        assert_eq!(da.value, 1.0);
        assert_eq!(da.slope, 1.0);
        assert_eq!(db.slope, -3.0);
        // Nearest jumps in a: 6 and 8, both one away.
        assert_eq!(da.distance.abs(), 1.0);
        // Jumps in b: 7/3 and 7/4.
        assert!((db.distance - (2.0 - 7.0 / 4.0)).abs() < 1e-15);
    }

    #[test]
    fn test_frexp_ldexp() {
        assert_eq!(frexp(1.0), (0.5, 1));
        assert_eq!(frexp(0.75), (0.75, 0));
        assert_eq!(ldexp(0.75, 3), 6.0);
        assert_eq!(ldexp(1.0, 2000), f64::INFINITY);
        assert_eq!(ldexp(1.0, -1074), f64::from_bits(1));
        let m = Unary::Frexp.moments(3.0);
        assert_eq!(m.value, 0.75);
        assert_eq!(m.slope, 0.25);
        assert_eq!(m.distance, 1.0);
    }

    #[test]
    fn test_propagate_by_slope_zero_sigma_uses_small_step() {
        let m = propagate_by_slope(f64::exp, 1.0, 0.0);
        assert!((m.slope - 1.0_f64.exp()).abs() < 1e-8);
    }

    #[test]
    fn test_propagate_by_slope_wide_step_differs_from_closed_form() {
        // sqrt at 4 ± 2: the secant slope exceeds the tangent slope.
        let m = propagate_by_slope(f64::sqrt, 4.0, 2.0);
        assert!(m.slope > 0.25);
        assert_eq!(m.discontinuity, Discontinuity::None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn smooth_functions_cross_check(x in 0.05_f64..3.0) {
            for f in [Unary::Sin, Unary::Cos, Unary::Atan, Unary::Exp, Unary::Log,
                      Unary::Sinh, Unary::Cosh, Unary::Tanh, Unary::Sqrt] {
                prop_assert!(cross_check(f, x), "{} at {}", f.name(), x);
            }
        }

        #[test]
        fn value_matches_eval(x in -10.0_f64..10.0) {
            for f in [Unary::Sin, Unary::Exp, Unary::Ceil, Unary::Fabs, Unary::Fract,
                      Unary::Trunc, Unary::Tanh, Unary::Ldexp(-3), Unary::Frexp] {
                prop_assert_eq!(f.moments(x).value, f.eval(x));
            }
        }

        #[test]
        fn frexp_mantissa_range(x in prop::num::f64::NORMAL) {
            let (m, e) = frexp(x);
            prop_assert!((0.5..1.0).contains(&m.abs()), "mantissa {} for {}", m, x);
            prop_assert_eq!(ldexp(m, e), x);
        }

        #[test]
        fn step_distance_bounded(x in -100.0_f64..100.0) {
            prop_assert!(Unary::Ceil.moments(x).distance.abs() <= 0.5);
            prop_assert!(Unary::Fract.moments(x).distance.abs() <= 1.0);
        }
    }
}
