//! One handle per stateful representation, reset together.

use crate::ensemble::EnsembleContext;
use crate::registry::SourceRegistry;
use crate::{LARGE_ENSEMBLE_SIZE, SMALL_ENSEMBLE_SIZE};

/// The registries and ensemble contexts of every stateful representation.
///
/// Scalar models carry no shared state and need no handle. Each member is
/// independent; [`UncertaintySession::new_epoch`] resets all of them at once.
///
/// # Examples
/// ```
/// use u_uncertain::{UDoubleCTSA, UDoubleEnsSmall, UncertaintySession};
///
/// let session = UncertaintySession::with_seed(1);
/// let a = UDoubleCTSA::new(&session.simple_array, 1.0, 0.1, None).unwrap();
/// let e = UDoubleEnsSmall::new(&session.small, 1.0, 0.1, None).unwrap();
/// session.new_epoch();
/// assert!(a.try_add(&a).is_err());
/// assert!(e.try_add(&e).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct UncertaintySession {
    /// Registry for tracked values over `SimpleArray`.
    pub simple_array: SourceRegistry,
    /// Registry for tracked values over `ScaledArray`.
    pub scaled_array: SourceRegistry,
    pub small: EnsembleContext<SMALL_ENSEMBLE_SIZE>,
    pub large: EnsembleContext<LARGE_ENSEMBLE_SIZE>,
}

impl UncertaintySession {
    /// Fresh registries; ensemble generators draw from the process seed.
    pub fn new() -> Self {
        Self {
            simple_array: SourceRegistry::new(),
            scaled_array: SourceRegistry::new(),
            small: EnsembleContext::new(),
            large: EnsembleContext::new(),
        }
    }

    /// Fresh registries with reproducible ensemble generators.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            simple_array: SourceRegistry::new(),
            scaled_array: SourceRegistry::new(),
            small: EnsembleContext::with_seed(seed),
            large: EnsembleContext::with_seed(seed.wrapping_add(1)),
        }
    }

    /// Starts a new epoch in every member.
    pub fn new_epoch(&self) {
        self.simple_array.new_epoch();
        self.scaled_array.new_epoch();
        self.small.new_epoch();
        self.large.new_epoch();
    }
}

impl Default for UncertaintySession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ScaledArray;
    use crate::ensemble::Ensemble;
    use crate::tracked::Tracked;

    #[test]
    fn test_new_epoch_resets_every_member() {
        let s = UncertaintySession::with_seed(3);
        let epochs = [
            s.simple_array.epoch(),
            s.scaled_array.epoch(),
            s.small.epoch(),
            s.large.epoch(),
        ];
        Tracked::<ScaledArray>::new(&s.scaled_array, 1.0, 1.0, None).unwrap();
        Ensemble::new(&s.large, 1.0, 1.0, None).unwrap();
        s.new_epoch();
        assert_eq!(s.scaled_array.num_sources(), 0);
        assert_eq!(s.large.registry().num_sources(), 0);
        let after = [
            s.simple_array.epoch(),
            s.scaled_array.epoch(),
            s.small.epoch(),
            s.large.epoch(),
        ];
        for (before, now) in epochs.iter().zip(after.iter()) {
            assert_ne!(before, now);
        }
    }

    #[test]
    fn test_members_are_independent() {
        let s = UncertaintySession::with_seed(3);
        assert!(!s.simple_array.is_same(&s.scaled_array));
        Tracked::<ScaledArray>::new(&s.scaled_array, 1.0, 1.0, None).unwrap();
        assert_eq!(s.simple_array.num_sources(), 0);
    }
}
