//! Correlation modes for the scalar representations.
//!
//! A scalar carries a single uncertainty and cannot know whether two
//! operands share a random origin. The mode decides, once per type, how
//! linear terms combine:
//!
//! | Mode | `a ± b` | scaling by `k` | negative uncertainty |
//! |---|---|---|---|
//! | [`Correlated`] | `uₐ ± u_b` | `u·k` | allowed, meaningful |
//! | [`Uncorrelated`] | `hypot(uₐ, u_b)` | `|u·k|` | rejected |
//!
//! Each mode also owns a process-wide discontinuity threshold (in standard
//! deviations) used by the curved model's gauss-loss diagnostic.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, UncertainError};

/// Bit pattern of `3.0_f64`.
const THREE_SIGMA_BITS: u64 = 0x4008_0000_0000_0000;

static UNCORRELATED_THRESHOLD: AtomicU64 = AtomicU64::new(THREE_SIGMA_BITS);
static CORRELATED_THRESHOLD: AtomicU64 = AtomicU64::new(0);

/// Combination policy for scalar uncertainties.
pub trait CorrelationMode: Copy + Clone + Default + PartialEq + fmt::Debug + 'static {
    /// Whether operands are treated as one shared random draw.
    const CORRELATED: bool;

    /// Accepts or rejects a construction uncertainty.
    fn validate(uncertainty: f64) -> Result<f64>;

    /// Uncertainty of a sum of two linear terms.
    fn combine(a: f64, b: f64) -> f64;

    /// Uncertainty of a difference of two linear terms.
    fn difference(a: f64, b: f64) -> f64;

    /// Uncertainty after multiplying the deviate by `k`. A zero uncertainty
    /// stays zero even for infinite or NaN `k`.
    fn scale(uncertainty: f64, k: f64) -> f64;

    #[doc(hidden)]
    fn threshold_cell() -> &'static AtomicU64;

    /// Gauss-loss threshold, in standard deviations.
    fn discontinuity_threshold() -> f64 {
        f64::from_bits(Self::threshold_cell().load(Ordering::Relaxed))
    }

    /// Replaces the gauss-loss threshold for every value of this mode.
    fn set_discontinuity_threshold(threshold: f64) {
        Self::threshold_cell().store(threshold.to_bits(), Ordering::Relaxed);
    }
}

/// All operands are one shared random draw; signs of uncertainties carry
/// the direction of the dependence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Correlated;

/// All operands are independent; uncertainties are standard deviations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Uncorrelated;

impl CorrelationMode for Correlated {
    const CORRELATED: bool = true;

    fn validate(uncertainty: f64) -> Result<f64> {
        Ok(uncertainty)
    }

    fn combine(a: f64, b: f64) -> f64 {
        a + b
    }

    fn difference(a: f64, b: f64) -> f64 {
        a - b
    }

    fn scale(uncertainty: f64, k: f64) -> f64 {
        if uncertainty == 0.0 {
            0.0
        } else {
            uncertainty * k
        }
    }

    fn threshold_cell() -> &'static AtomicU64 {
        &CORRELATED_THRESHOLD
    }
}

impl CorrelationMode for Uncorrelated {
    const CORRELATED: bool = false;

    fn validate(uncertainty: f64) -> Result<f64> {
        if uncertainty < 0.0 {
            return Err(UncertainError::NegativeUncertainty(uncertainty));
        }
        Ok(uncertainty)
    }

    fn combine(a: f64, b: f64) -> f64 {
        a.hypot(b)
    }

    fn difference(a: f64, b: f64) -> f64 {
        a.hypot(b)
    }

    fn scale(uncertainty: f64, k: f64) -> f64 {
        if uncertainty == 0.0 {
            0.0
        } else {
            (uncertainty * k).abs()
        }
    }

    fn threshold_cell() -> &'static AtomicU64 {
        &UNCORRELATED_THRESHOLD
    }
}
