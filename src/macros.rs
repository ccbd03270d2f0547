//! Operator plumbing shared by every representation.
//!
//! Each representation implements a small set of inherent methods taking
//! `&self`; [`impl_uncertain_ops!`] expands them into the full `std::ops`
//! family so the four representations expose identical operator sets:
//!
//! | method | meaning |
//! |---|---|
//! | `negated()` | `-x` |
//! | `plus(&y)`, `minus(&y)`, `times(&y)`, `over(&y)` | `x ∘ y` |
//! | `shifted(k)`, `scaled(k)`, `divided(k)` | `x + k`, `x · k`, `x / k` |
//! | `inverted_times(k)` | `k / x` |

/// Implements `Neg`, `Add`, `Sub`, `Mul`, `Div` and their `*Assign` forms
/// for a representation, against itself (by value and by reference) and
/// against `f64` on either side.
///
/// The first bracket holds the impl generics, the second token the type.
macro_rules! impl_uncertain_ops {
    ([$($gen:tt)*] $ty:ty) => {
        impl<$($gen)*> ::std::ops::Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                self.negated()
            }
        }

        impl<$($gen)*> ::std::ops::Neg for &$ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                self.negated()
            }
        }

        impl_uncertain_ops!(@binary [$($gen)*] $ty, Add, add, AddAssign, add_assign, plus);
        impl_uncertain_ops!(@binary [$($gen)*] $ty, Sub, sub, SubAssign, sub_assign, minus);
        impl_uncertain_ops!(@binary [$($gen)*] $ty, Mul, mul, MulAssign, mul_assign, times);
        impl_uncertain_ops!(@binary [$($gen)*] $ty, Div, div, DivAssign, div_assign, over);

        impl<$($gen)*> ::std::ops::Add<f64> for $ty {
            type Output = $ty;
            fn add(self, rhs: f64) -> $ty {
                self.shifted(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::Add<f64> for &$ty {
            type Output = $ty;
            fn add(self, rhs: f64) -> $ty {
                self.shifted(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::Sub<f64> for $ty {
            type Output = $ty;
            fn sub(self, rhs: f64) -> $ty {
                self.shifted(-rhs)
            }
        }

        impl<$($gen)*> ::std::ops::Sub<f64> for &$ty {
            type Output = $ty;
            fn sub(self, rhs: f64) -> $ty {
                self.shifted(-rhs)
            }
        }

        impl<$($gen)*> ::std::ops::Mul<f64> for $ty {
            type Output = $ty;
            fn mul(self, rhs: f64) -> $ty {
                self.scaled(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::Mul<f64> for &$ty {
            type Output = $ty;
            fn mul(self, rhs: f64) -> $ty {
                self.scaled(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::Div<f64> for $ty {
            type Output = $ty;
            fn div(self, rhs: f64) -> $ty {
                self.divided(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::Div<f64> for &$ty {
            type Output = $ty;
            fn div(self, rhs: f64) -> $ty {
                self.divided(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::Add<$ty> for f64 {
            type Output = $ty;
            fn add(self, rhs: $ty) -> $ty {
                rhs.shifted(self)
            }
        }

        impl<$($gen)*> ::std::ops::Add<&$ty> for f64 {
            type Output = $ty;
            fn add(self, rhs: &$ty) -> $ty {
                rhs.shifted(self)
            }
        }

        impl<$($gen)*> ::std::ops::Sub<$ty> for f64 {
            type Output = $ty;
            fn sub(self, rhs: $ty) -> $ty {
                rhs.negated().shifted(self)
            }
        }

        impl<$($gen)*> ::std::ops::Sub<&$ty> for f64 {
            type Output = $ty;
            fn sub(self, rhs: &$ty) -> $ty {
                rhs.negated().shifted(self)
            }
        }

        impl<$($gen)*> ::std::ops::Mul<$ty> for f64 {
            type Output = $ty;
            fn mul(self, rhs: $ty) -> $ty {
                rhs.scaled(self)
            }
        }

        impl<$($gen)*> ::std::ops::Mul<&$ty> for f64 {
            type Output = $ty;
            fn mul(self, rhs: &$ty) -> $ty {
                rhs.scaled(self)
            }
        }

        impl<$($gen)*> ::std::ops::Div<$ty> for f64 {
            type Output = $ty;
            fn div(self, rhs: $ty) -> $ty {
                rhs.inverted_times(self)
            }
        }

        impl<$($gen)*> ::std::ops::Div<&$ty> for f64 {
            type Output = $ty;
            fn div(self, rhs: &$ty) -> $ty {
                rhs.inverted_times(self)
            }
        }

        impl<$($gen)*> ::std::ops::AddAssign<f64> for $ty {
            fn add_assign(&mut self, rhs: f64) {
                *self = self.shifted(rhs);
            }
        }

        impl<$($gen)*> ::std::ops::SubAssign<f64> for $ty {
            fn sub_assign(&mut self, rhs: f64) {
                *self = self.shifted(-rhs);
            }
        }

        impl<$($gen)*> ::std::ops::MulAssign<f64> for $ty {
            fn mul_assign(&mut self, rhs: f64) {
                *self = self.scaled(rhs);
            }
        }

        impl<$($gen)*> ::std::ops::DivAssign<f64> for $ty {
            fn div_assign(&mut self, rhs: f64) {
                *self = self.divided(rhs);
            }
        }
    };

    (@binary [$($gen:tt)*] $ty:ty, $tr:ident, $f:ident, $tr_assign:ident, $f_assign:ident, $method:ident) => {
        impl<$($gen)*> ::std::ops::$tr for $ty {
            type Output = $ty;
            fn $f(self, rhs: $ty) -> $ty {
                self.$method(&rhs)
            }
        }

        impl<$($gen)*> ::std::ops::$tr<&$ty> for $ty {
            type Output = $ty;
            fn $f(self, rhs: &$ty) -> $ty {
                self.$method(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::$tr<$ty> for &$ty {
            type Output = $ty;
            fn $f(self, rhs: $ty) -> $ty {
                self.$method(&rhs)
            }
        }

        impl<$($gen)*> ::std::ops::$tr for &$ty {
            type Output = $ty;
            fn $f(self, rhs: &$ty) -> $ty {
                self.$method(rhs)
            }
        }

        impl<$($gen)*> ::std::ops::$tr_assign for $ty {
            fn $f_assign(&mut self, rhs: $ty) {
                *self = self.$method(&rhs);
            }
        }

        impl<$($gen)*> ::std::ops::$tr_assign<&$ty> for $ty {
            fn $f_assign(&mut self, rhs: &$ty) {
                *self = self.$method(rhs);
            }
        }
    };
}
