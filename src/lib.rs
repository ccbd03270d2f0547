//! # u-uncertain
//!
//! Values with Gaussian uncertainty, in four representations of increasing
//! fidelity that share one arithmetic and elementary-function surface.
//!
//! ## Representations
//!
//! - [`scalar`]: `(mean, sigma)` with first-order propagation, under a
//!   fully correlated or fully uncorrelated combination rule ([`mode`])
//! - [`curved`]: the same pair propagated to second order, with
//!   discontinuity-proximity diagnostics
//! - [`tracked`]: one uncertainty component per named source, exact
//!   product and quotient rules, per-source variance attribution
//! - [`ensemble`]: a population of samples built from a moment-perfected
//!   Gaussian template, propagated sample by sample
//!
//! ## Shared infrastructure
//!
//! - [`moments`]: value, slope, curvature and nearest discontinuity of
//!   every supported elementary function
//! - [`registry`]: named uncertainty sources and epochs
//! - [`array`]: component storage for the tracked representation
//! - [`stats`], [`special`], [`random`], [`template`]: numerical support
//!   for ensembles
//! - [`format`]: the `"<mean> +/- <sigma>"` text format
//!
//! ## Design Philosophy
//!
//! - **Explicit state**: registries and ensemble contexts are handles passed
//!   to constructors, never globals
//! - **Loud bookkeeping errors**: stale epochs and exhausted registries are
//!   errors; numerical domain errors follow IEEE semantics
//! - **Property-based testing**: propagation invariants verified via proptest
//!
//! ## Example
//! ```
//! use u_uncertain::{Elementary, UDoubleMSCorr, UDoubleMSUncorr};
//!
//! let x = UDoubleMSCorr::new(4.0, 2.0).unwrap();
//! assert_eq!(x.sqrt().deviation(), 0.5);
//!
//! let c = UDoubleMSUncorr::new(2.5, 1.0).unwrap().ceil();
//! assert_eq!((c.mean(), c.deviation()), (3.0, 0.0));
//! ```

#[macro_use]
mod macros;

pub mod array;
pub mod curved;
pub mod elementary;
pub mod ensemble;
pub mod error;
pub mod format;
pub mod mode;
pub mod moments;
pub mod random;
pub mod registry;
pub mod scalar;
pub mod session;
pub mod special;
pub mod stats;
pub mod template;
pub mod tracked;

pub use array::{ScaledArray, SimpleArray, UncertaintyVector};
pub use curved::CurvedScalar;
pub use elementary::Elementary;
pub use ensemble::{Ensemble, EnsembleContext, MIN_ENSEMBLE_SIZE};
pub use error::{Result, UncertainError};
pub use mode::{Correlated, CorrelationMode, Uncorrelated};
pub use registry::{SourceContribution, SourceRegistry, MAX_UNC_ELEMENTS};
pub use scalar::SimpleScalar;
pub use session::UncertaintySession;
pub use tracked::Tracked;

/// Samples per ensemble in the small ensemble representation.
pub const SMALL_ENSEMBLE_SIZE: usize = 32;

/// Samples per ensemble in the large ensemble representation.
pub const LARGE_ENSEMBLE_SIZE: usize = 1024;

/// First-order, independent operands.
pub type UDoubleMSUncorr = SimpleScalar<Uncorrelated>;
/// First-order, one shared random draw.
pub type UDoubleMSCorr = SimpleScalar<Correlated>;
/// Second-order, independent operands.
pub type UDoubleMSCUncorr = CurvedScalar<Uncorrelated>;
/// Second-order, one shared random draw.
pub type UDoubleMSCCorr = CurvedScalar<Correlated>;
/// Correlation tracking with direct component storage.
pub type UDoubleCTSA = Tracked<SimpleArray>;
/// Correlation tracking with scaled component storage.
pub type UDoubleCTAA = Tracked<ScaledArray>;
/// Ensemble of [`SMALL_ENSEMBLE_SIZE`] samples.
pub type UDoubleEnsSmall = Ensemble<SMALL_ENSEMBLE_SIZE>;
/// Ensemble of [`LARGE_ENSEMBLE_SIZE`] samples.
pub type UDoubleEnsLarge = Ensemble<LARGE_ENSEMBLE_SIZE>;
