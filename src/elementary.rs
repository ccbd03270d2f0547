//! The math-library surface shared by every representation.
//!
//! A representation implements the four required methods; the named
//! functions are provided on top of them and resolve to entries of the
//! [`Unary`] and [`Binary`] tables, so every representation exposes the
//! same set with the same names as `f64`.

use crate::moments::{frexp, Binary, Unary};

/// Elementary functions of an uncertain value.
///
/// # Examples
/// ```
/// use u_uncertain::{Elementary, UDoubleMSCorr};
/// let x = UDoubleMSCorr::new(4.0, 2.0).unwrap();
/// let r = x.sqrt();
/// assert_eq!(r.mean(), 2.0);
/// assert_eq!(r.deviation(), 0.5);
/// ```
pub trait Elementary: Sized {
    /// Propagates through a one-argument table entry.
    fn apply(&self, f: Unary) -> Self;

    /// Propagates through a two-argument table entry, `f(self, other)`.
    fn apply2(&self, f: Binary, other: &Self) -> Self;

    /// Propagates through an arbitrary closure.
    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self;

    /// Central value used to pick integer exponents (`frexp`).
    fn center(&self) -> f64;

    fn sqrt(&self) -> Self {
        self.apply(Unary::Sqrt)
    }

    fn sin(&self) -> Self {
        self.apply(Unary::Sin)
    }

    fn cos(&self) -> Self {
        self.apply(Unary::Cos)
    }

    fn tan(&self) -> Self {
        self.apply(Unary::Tan)
    }

    fn asin(&self) -> Self {
        self.apply(Unary::Asin)
    }

    fn acos(&self) -> Self {
        self.apply(Unary::Acos)
    }

    fn atan(&self) -> Self {
        self.apply(Unary::Atan)
    }

    fn ceil(&self) -> Self {
        self.apply(Unary::Ceil)
    }

    fn floor(&self) -> Self {
        self.apply(Unary::Floor)
    }

    fn fabs(&self) -> Self {
        self.apply(Unary::Fabs)
    }

    fn exp(&self) -> Self {
        self.apply(Unary::Exp)
    }

    fn log(&self) -> Self {
        self.apply(Unary::Log)
    }

    fn log10(&self) -> Self {
        self.apply(Unary::Log10)
    }

    fn sinh(&self) -> Self {
        self.apply(Unary::Sinh)
    }

    fn cosh(&self) -> Self {
        self.apply(Unary::Cosh)
    }

    fn tanh(&self) -> Self {
        self.apply(Unary::Tanh)
    }

    /// `1 / self`.
    fn recip(&self) -> Self {
        self.apply(Unary::Recip)
    }

    /// `self · 2ⁿ`.
    fn ldexp(&self, exp: i32) -> Self {
        self.apply(Unary::Ldexp(exp))
    }

    /// Mantissa and exponent. The exponent is chosen from the central
    /// value and is the same for every outcome of the distribution.
    fn frexp(&self) -> (Self, i32) {
        let (_, e) = frexp(self.center());
        (self.apply(Unary::Frexp), e)
    }

    /// Fractional and integral parts.
    fn modf(&self) -> (Self, Self) {
        (self.apply(Unary::Fract), self.apply(Unary::Trunc))
    }

    /// `self ^ exponent` with an uncertain exponent.
    fn pow(&self, exponent: &Self) -> Self {
        self.apply2(Binary::Pow, exponent)
    }

    /// `self ^ p` with a certain exponent.
    fn powf(&self, p: f64) -> Self {
        self.apply(Unary::PowConst(p))
    }

    /// Four-quadrant arctangent of `self / x`.
    fn atan2(&self, x: &Self) -> Self {
        self.apply2(Binary::Atan2, x)
    }

    /// Remainder of `self / divisor`, sign following `self`.
    fn fmod(&self, divisor: &Self) -> Self {
        self.apply2(Binary::Fmod, divisor)
    }
}
