//! Error taxonomy shared by every representation.
//!
//! Only bookkeeping failures are errors. Numerical results outside a
//! function's domain follow IEEE semantics (NaN/Inf) and are never
//! reported here.

use thiserror::Error;

/// Errors raised by construction, registry and format operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UncertainError {
    /// A representation that stores a standard deviation was given a
    /// negative one.
    #[error("negative uncertainty: {0}")]
    NegativeUncertainty(f64),

    /// The source registry already holds its maximum number of sources
    /// for the current epoch.
    #[error("source capacity exceeded: at most {capacity} uncertainty sources per epoch")]
    CapacityExceeded {
        /// Maximum number of sources per epoch.
        capacity: usize,
    },

    /// A value captured under an epoch that is no longer current (or that
    /// belongs to a different registry) was combined.
    #[error("stale epoch: value from epoch {found}, registry is at epoch {current}")]
    StaleEpoch {
        /// Epoch token carried by the value.
        found: u64,
        /// Current epoch of the registry.
        current: u64,
    },

    /// A source or array element outside the recorded bounds was requested.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of valid entries.
        len: usize,
    },

    /// Text did not match the `<mean> +/- <sigma>` format.
    #[error("format error: {0}")]
    Format(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, UncertainError>;

/// Unwraps a bookkeeping result inside an operator that cannot return it.
pub(crate) fn or_panic<T>(result: Result<T>) -> T {
    result.unwrap_or_else(|e| panic!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            UncertainError::NegativeUncertainty(-1.5).to_string(),
            "negative uncertainty: -1.5"
        );
        assert_eq!(
            UncertainError::CapacityExceeded { capacity: 5 }.to_string(),
            "source capacity exceeded: at most 5 uncertainty sources per epoch"
        );
        assert_eq!(
            UncertainError::StaleEpoch {
                found: 1,
                current: 2
            }
            .to_string(),
            "stale epoch: value from epoch 1, registry is at epoch 2"
        );
        assert_eq!(
            UncertainError::IndexOutOfRange { index: 7, len: 3 }.to_string(),
            "index 7 out of range (len 3)"
        );
    }
}
