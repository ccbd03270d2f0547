//! Fixed-capacity storage for per-source uncertainty components.
//!
//! Two interchangeable strategies implement [`UncertaintyVector`]:
//!
//! - [`SimpleArray`] stores every component directly.
//! - [`ScaledArray`] stores unscaled components plus one shared factor, so
//!   multiplying or dividing the whole vector by a constant is O(1).
//!
//! Both hold at most [`MAX_UNC_ELEMENTS`] components. Positions between the
//! populated length and the capacity read as 0. A zero component stays zero
//! under any factor, infinite and NaN included.

use crate::error::{Result, UncertainError};
use crate::registry::MAX_UNC_ELEMENTS;

/// Vector of per-source uncertainty components.
pub trait UncertaintyVector: Clone + Default + std::fmt::Debug {
    /// Maximum number of components.
    fn capacity(&self) -> usize {
        MAX_UNC_ELEMENTS
    }

    /// Number of populated components.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Component `i`, 0 when `i` is populated-length or beyond.
    ///
    /// # Errors
    /// [`UncertainError::IndexOutOfRange`] when `i >= capacity()`.
    fn get(&self, i: usize) -> Result<f64>;

    /// Sets component `i`, extending the populated length to `i + 1`.
    ///
    /// # Errors
    /// [`UncertainError::IndexOutOfRange`] when `i >= capacity()`.
    fn set(&mut self, i: usize, value: f64) -> Result<()>;

    /// Element-wise `self += other`, extending to the longer length.
    fn add_vector(&mut self, other: &Self);

    /// Element-wise `self -= other`, extending to the longer length.
    fn sub_vector(&mut self, other: &Self);

    fn mul_scalar(&mut self, k: f64);

    fn div_scalar(&mut self, k: f64);

    /// Euclidean length.
    fn norm(&self) -> f64;
}

fn check_index(i: usize) -> Result<()> {
    if i >= MAX_UNC_ELEMENTS {
        return Err(UncertainError::IndexOutOfRange {
            index: i,
            len: MAX_UNC_ELEMENTS,
        });
    }
    Ok(())
}

// ============================================================================
// SimpleArray
// ============================================================================

/// Components stored directly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimpleArray {
    elements: [f64; MAX_UNC_ELEMENTS],
    len: usize,
}

impl SimpleArray {
    fn combine(&mut self, other: &Self, sign: f64) {
        for i in 0..other.len {
            self.elements[i] += sign * other.elements[i];
        }
        self.len = self.len.max(other.len);
    }
}

impl UncertaintyVector for SimpleArray {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, i: usize) -> Result<f64> {
        check_index(i)?;
        Ok(self.elements[i])
    }

    fn set(&mut self, i: usize, value: f64) -> Result<()> {
        check_index(i)?;
        self.elements[i] = value;
        self.len = self.len.max(i + 1);
        Ok(())
    }

    fn add_vector(&mut self, other: &Self) {
        self.combine(other, 1.0);
    }

    fn sub_vector(&mut self, other: &Self) {
        self.combine(other, -1.0);
    }

    fn mul_scalar(&mut self, k: f64) {
        for e in self.elements[..self.len].iter_mut().filter(|e| **e != 0.0) {
            *e *= k;
        }
    }

    fn div_scalar(&mut self, k: f64) {
        for e in self.elements[..self.len].iter_mut().filter(|e| **e != 0.0) {
            *e /= k;
        }
    }

    fn norm(&self) -> f64 {
        self.elements[..self.len]
            .iter()
            .map(|e| e * e)
            .sum::<f64>()
            .sqrt()
    }
}

// ============================================================================
// ScaledArray
// ============================================================================

/// Unscaled components plus a shared multiplicative factor.
///
/// A factor of exactly 0 makes the vector identically zero: `set` becomes
/// a no-op and the next `add_vector`/`sub_vector` adopts the other
/// operand's components and factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledArray {
    elements: [f64; MAX_UNC_ELEMENTS],
    len: usize,
    scale: f64,
}

impl Default for ScaledArray {
    fn default() -> Self {
        Self {
            elements: [0.0; MAX_UNC_ELEMENTS],
            len: 0,
            scale: 1.0,
        }
    }
}

impl ScaledArray {
    /// Shared factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn combine(&mut self, other: &Self, sign: f64) {
        if other.scale == 0.0 || other.len == 0 {
            return;
        }
        if self.scale == 0.0 {
            *self = *other;
            if sign < 0.0 {
                self.scale = -self.scale;
            }
            return;
        }
        let ratio = sign * other.scale / self.scale;
        for i in 0..other.len {
            self.elements[i] += ratio * other.elements[i];
        }
        self.len = self.len.max(other.len);
    }
}

impl UncertaintyVector for ScaledArray {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, i: usize) -> Result<f64> {
        check_index(i)?;
        let e = self.elements[i];
        Ok(if e == 0.0 { 0.0 } else { e * self.scale })
    }

    fn set(&mut self, i: usize, value: f64) -> Result<()> {
        check_index(i)?;
        if self.scale == 0.0 {
            return Ok(());
        }
        self.elements[i] = value / self.scale;
        self.len = self.len.max(i + 1);
        Ok(())
    }

    fn add_vector(&mut self, other: &Self) {
        self.combine(other, 1.0);
    }

    fn sub_vector(&mut self, other: &Self) {
        self.combine(other, -1.0);
    }

    fn mul_scalar(&mut self, k: f64) {
        self.scale *= k;
    }

    fn div_scalar(&mut self, k: f64) {
        self.scale /= k;
    }

    fn norm(&self) -> f64 {
        if self.scale == 0.0 {
            return 0.0;
        }
        let sum: f64 = self.elements[..self.len].iter().map(|e| e * e).sum();
        if sum == 0.0 {
            return 0.0;
        }
        sum.sqrt() * self.scale.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled<A: UncertaintyVector>(values: &[f64]) -> A {
        let mut a = A::default();
        for (i, &v) in values.iter().enumerate() {
            a.set(i, v).unwrap();
        }
        a
    }

    fn contents<A: UncertaintyVector>(a: &A) -> Vec<f64> {
        (0..a.len()).map(|i| a.get(i).unwrap()).collect()
    }

    fn check_common_contract<A: UncertaintyVector>() {
        let mut a: A = filled(&[3.0, 4.0]);
        assert_eq!(a.len(), 2);
        assert_eq!(a.norm(), 5.0);
        assert_eq!(a.get(4).unwrap(), 0.0);
        assert_eq!(
            a.get(MAX_UNC_ELEMENTS),
            Err(UncertainError::IndexOutOfRange {
                index: MAX_UNC_ELEMENTS,
                len: MAX_UNC_ELEMENTS
            })
        );
        assert!(a.set(MAX_UNC_ELEMENTS, 1.0).is_err());

        let b: A = filled(&[1.0, 1.0, 2.0]);
        a.add_vector(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(contents(&a), vec![4.0, 5.0, 2.0]);
        a.sub_vector(&b);
        assert_eq!(contents(&a), vec![3.0, 4.0, 0.0]);

        a.mul_scalar(2.0);
        assert_eq!(contents(&a), vec![6.0, 8.0, 0.0]);
        a.div_scalar(4.0);
        assert_eq!(contents(&a), vec![1.5, 2.0, 0.0]);
        assert_eq!(a.norm(), 2.5);
    }

    #[test]
    fn test_simple_array_contract() {
        check_common_contract::<SimpleArray>();
    }

    #[test]
    fn test_scaled_array_contract() {
        check_common_contract::<ScaledArray>();
    }

    #[test]
    fn test_empty() {
        assert!(SimpleArray::default().is_empty());
        assert_eq!(ScaledArray::default().norm(), 0.0);
        assert_eq!(ScaledArray::default().capacity(), MAX_UNC_ELEMENTS);
    }

    #[test]
    fn test_scaled_multiply_touches_only_scale() {
        let mut a: ScaledArray = filled(&[1.0, 2.0]);
        a.mul_scalar(-3.0);
        assert_eq!(a.scale(), -3.0);
        assert_eq!(a.elements[..2], [1.0, 2.0]);
        assert_eq!(a.get(1).unwrap(), -6.0);
        // Setting after scaling stores the unscaled value.
        a.set(2, 9.0).unwrap();
        assert_eq!(a.elements[2], -3.0);
        assert_eq!(a.get(2).unwrap(), 9.0);
    }

    #[test]
    fn test_scaled_zero_scale() {
        let mut a: ScaledArray = filled(&[1.0]);
        a.mul_scalar(0.0);
        assert_eq!(a.norm(), 0.0);
        a.set(0, 5.0).unwrap();
        assert_eq!(a.get(0).unwrap(), 0.0);

        let mut b: ScaledArray = filled(&[1.0, 2.0]);
        b.mul_scalar(2.0);
        let mut sum = a;
        sum.add_vector(&b);
        assert_eq!(contents(&sum), vec![2.0, 4.0]);
        let mut diff = a;
        diff.sub_vector(&b);
        assert_eq!(contents(&diff), vec![-2.0, -4.0]);

        // A zero-scaled right operand contributes nothing.
        let mut c: ScaledArray = filled(&[1.0]);
        c.add_vector(&a);
        assert_eq!(contents(&c), vec![1.0]);
    }

    fn check_zero_absorbs_non_finite<A: UncertaintyVector>() {
        let x: A = filled(&[0.5, 0.25]);
        let mut cancelled = x.clone();
        cancelled.sub_vector(&x);
        for k in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut m = cancelled.clone();
            m.mul_scalar(k);
            assert_eq!(m.norm(), 0.0);
            assert_eq!(contents(&m), vec![0.0, 0.0]);
        }
        let mut d = cancelled.clone();
        d.div_scalar(0.0);
        assert_eq!(d.norm(), 0.0);

        let mut partial: A = filled(&[0.0, 2.0]);
        partial.mul_scalar(f64::INFINITY);
        assert_eq!(partial.get(0).unwrap(), 0.0);
        assert_eq!(partial.norm(), f64::INFINITY);
    }

    #[test]
    fn test_simple_zero_absorbs_non_finite() {
        check_zero_absorbs_non_finite::<SimpleArray>();
    }

    #[test]
    fn test_scaled_zero_absorbs_non_finite() {
        check_zero_absorbs_non_finite::<ScaledArray>();
    }

    #[test]
    fn test_scaled_rescales_right_operand() {
        let mut a: ScaledArray = filled(&[1.0]);
        a.mul_scalar(2.0);
        let mut b: ScaledArray = filled(&[0.0, 3.0]);
        b.mul_scalar(4.0);
        a.add_vector(&b);
        assert_eq!(a.scale(), 2.0);
        assert_eq!(contents(&a), vec![2.0, 12.0]);
    }
}
