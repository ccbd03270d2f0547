//! Ensemble propagation over a fixed population of `N` samples.
//!
//! A leaf value is the context's perfected unit-Gaussian template scaled by
//! the uncertainty, shifted by the mean and shuffled. Arithmetic and
//! functions act sample by sample, so nonlinear effects and correlations
//! between operands emerge without any closed-form rule. The price is the
//! finite sample: results are only as accurate as `N` allows.
//!
//! Each [`EnsembleContext`] owns the registry, the lazily built template
//! and the random generator for one ensemble size. Contexts of different
//! sizes are independent.
//!
//! # Examples
//! ```
//! use u_uncertain::ensemble::{Ensemble, EnsembleContext};
//!
//! let ctx = EnsembleContext::<32>::with_seed(7);
//! let x = Ensemble::new(&ctx, 2.0, 1.0, None).unwrap();
//! assert!((x.mean() - 2.0).abs() < 1e-14);
//! assert!((x.deviation() - 1.0).abs() < 1e-14);
//!
//! // x - x is certain: both operands are the same draw.
//! assert_eq!((&x - &x).deviation(), 0.0);
//! ```

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use rand::rngs::SmallRng;

use crate::elementary::Elementary;
use crate::error::{or_panic, Result, UncertainError};
use crate::format;
use crate::moments::{frexp, ldexp, Binary, Unary};
use crate::random::{create_rng, shuffle, stream_rng};
use crate::registry::{write_contributions, Epoch, SourceContribution, SourceRegistry};
use crate::stats::{self, SampleMoments};
use crate::template::unit_gaussian_template;

/// Smallest ensemble whose template kurtosis can be perfected.
pub const MIN_ENSEMBLE_SIZE: usize = 8;

#[derive(Debug)]
struct ContextState {
    registry: SourceRegistry<Rc<[f64]>>,
    template: OnceCell<Rc<[f64]>>,
    rng: RefCell<SmallRng>,
}

/// Shared state for ensembles of `N` samples: source registry (each source
/// keeps its original sample vector), template and shuffling generator.
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct EnsembleContext<const N: usize> {
    state: Rc<ContextState>,
}

impl<const N: usize> EnsembleContext<N> {
    const VALID_SIZE: () = assert!(
        N >= MIN_ENSEMBLE_SIZE,
        "ensembles need at least MIN_ENSEMBLE_SIZE samples"
    );

    /// Creates a context whose generator is an independent stream of the
    /// process seed.
    pub fn new() -> Self {
        Self::from_rng(stream_rng())
    }

    /// Creates a context with a reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(create_rng(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        let () = Self::VALID_SIZE;
        Self {
            state: Rc::new(ContextState {
                registry: SourceRegistry::new(),
                template: OnceCell::new(),
                rng: RefCell::new(rng),
            }),
        }
    }

    /// Number of samples per ensemble.
    pub const fn size(&self) -> usize {
        N
    }

    pub fn epoch(&self) -> Epoch {
        self.state.registry.epoch()
    }

    /// Drops every source and invalidates every ensemble issued so far.
    /// The template is kept.
    pub fn new_epoch(&self) {
        self.state.registry.new_epoch();
    }

    pub fn registry(&self) -> &SourceRegistry<Rc<[f64]>> {
        &self.state.registry
    }

    /// The perfected unit-Gaussian template, built on first use.
    pub fn template(&self) -> Rc<[f64]> {
        Rc::clone(
            self.state
                .template
                .get_or_init(|| unit_gaussian_template(N).into()),
        )
    }

    fn leaf_samples(&self, mean: f64, uncertainty: f64) -> Box<[f64]> {
        let mut samples: Box<[f64]> = self
            .template()
            .iter()
            .map(|t| t * uncertainty + mean)
            .collect();
        shuffle(&mut samples, &mut *self.state.rng.borrow_mut());
        samples
    }
}

impl<const N: usize> Default for EnsembleContext<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// An uncertain value represented by `N` samples.
#[derive(Debug, Clone)]
pub struct Ensemble<const N: usize> {
    samples: Box<[f64]>,
    epoch: Epoch,
    context: EnsembleContext<N>,
}

impl<const N: usize> Ensemble<N> {
    /// Creates a leaf value.
    ///
    /// A non-zero `uncertainty` registers one new source named `name`, or
    /// the value's `mean +/- sigma` text when `name` is `None`, and records
    /// its samples for [`Ensemble::source_contributions`].
    ///
    /// # Errors
    /// - [`UncertainError::NegativeUncertainty`] when `uncertainty < 0`.
    /// - [`UncertainError::CapacityExceeded`] when the registry is full.
    pub fn new(
        context: &EnsembleContext<N>,
        mean: f64,
        uncertainty: f64,
        name: Option<&str>,
    ) -> Result<Self> {
        if uncertainty < 0.0 {
            return Err(UncertainError::NegativeUncertainty(uncertainty));
        }
        if uncertainty == 0.0 {
            return Ok(Self::certain(context, mean));
        }
        let samples = context.leaf_samples(mean, uncertainty);
        let name = match name {
            Some(n) => n.to_string(),
            None => format::format_mean_sigma(mean, uncertainty),
        };
        context.registry().new_source(&name, samples.clone().into())?;
        Ok(Self {
            samples,
            epoch: context.epoch(),
            context: context.clone(),
        })
    }

    /// Every sample equal to `value`.
    pub fn certain(context: &EnsembleContext<N>, value: f64) -> Self {
        Self {
            samples: vec![value; N].into_boxed_slice(),
            epoch: context.epoch(),
            context: context.clone(),
        }
    }

    /// Parses `"<mean> +/- <sigma>"` into a new leaf value.
    ///
    /// # Errors
    /// [`UncertainError::Format`] plus every error of [`Ensemble::new`].
    pub fn parse(context: &EnsembleContext<N>, text: &str, name: Option<&str>) -> Result<Self> {
        let (mean, sigma) = format::parse_mean_sigma(text)?;
        Self::new(context, mean, sigma, name)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn context(&self) -> &EnsembleContext<N> {
        &self.context
    }

    /// Sample mean.
    pub fn mean(&self) -> f64 {
        stats::mean(&self.samples).unwrap_or(f64::NAN)
    }

    /// Population standard deviation of the samples.
    pub fn deviation(&self) -> f64 {
        stats::deviation(&self.samples).unwrap_or(f64::NAN)
    }

    /// Mean, deviation, skewness, excess kurtosis and standardised fifth
    /// moment of the samples.
    pub fn moments(&self) -> SampleMoments {
        stats::sample_moments(&self.samples).unwrap_or(SampleMoments::UNDEFINED)
    }

    fn check_current(&self) -> Result<()> {
        self.context.registry().check_epoch(self.epoch)
    }

    fn check_pair(&self, other: &Self) -> Result<()> {
        self.check_current()?;
        self.context.registry().check_epoch(other.epoch)
    }

    /// Pearson correlation with `other` rotated left by `offset` samples.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn correlation(&self, other: &Self, offset: usize) -> Result<f64> {
        self.check_pair(other)?;
        Ok(stats::correlation(&self.samples, &other.samples, offset).unwrap_or(0.0))
    }

    /// Squared correlation with each registered source's original samples,
    /// as a percentage. Exact for linear combinations of sources,
    /// approximate otherwise.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when the value is stale.
    pub fn source_contributions(&self) -> Result<Vec<SourceContribution>> {
        self.check_current()?;
        let registry = self.context.registry();
        (0..registry.num_sources())
            .map(|i| {
                let source = registry.payload(i)?;
                let r = stats::correlation(&self.samples, &source, 0).unwrap_or(0.0);
                Ok(SourceContribution {
                    name: registry.source_name(i)?,
                    percent: r * r * 100.0,
                })
            })
            .collect()
    }

    /// Renders [`Ensemble::source_contributions`], one source per line.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when the value is stale.
    pub fn uncertain_sources_report(&self) -> Result<String> {
        let mut out = String::new();
        write_contributions(&mut out, &self.source_contributions()?)
            .map_err(|e| UncertainError::Format(e.to_string()))?;
        Ok(out)
    }

    fn with_samples(&self, samples: Box<[f64]>) -> Self {
        Self {
            samples,
            epoch: self.epoch,
            context: self.context.clone(),
        }
    }

    fn mapped(&self, f: impl Fn(f64) -> f64) -> Self {
        self.with_samples(self.samples.iter().map(|&x| f(x)).collect())
    }

    fn try_zip(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        self.check_pair(other)?;
        Ok(self.with_samples(
            self.samples
                .iter()
                .zip(other.samples.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        ))
    }

    /// Sample-wise `self + other`.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.try_zip(other, |a, b| a + b)
    }

    /// Sample-wise `self - other`.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.try_zip(other, |a, b| a - b)
    }

    /// Sample-wise `self · other`.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        self.try_zip(other, |a, b| a * b)
    }

    /// Sample-wise `self / other`.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_div(&self, other: &Self) -> Result<Self> {
        self.try_zip(other, |a, b| a / b)
    }

    /// Sample-wise `f(self, other)`.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_apply2(&self, f: Binary, other: &Self) -> Result<Self> {
        self.try_zip(other, |a, b| f.eval(a, b))
    }

    /// # Panics
    /// On a stale operand; see [`Ensemble::try_add`].
    pub fn plus(&self, other: &Self) -> Self {
        or_panic(self.try_add(other))
    }

    /// # Panics
    /// On a stale operand; see [`Ensemble::try_sub`].
    pub fn minus(&self, other: &Self) -> Self {
        or_panic(self.try_sub(other))
    }

    /// # Panics
    /// On a stale operand; see [`Ensemble::try_mul`].
    pub fn times(&self, other: &Self) -> Self {
        or_panic(self.try_mul(other))
    }

    /// # Panics
    /// On a stale operand; see [`Ensemble::try_div`].
    pub fn over(&self, other: &Self) -> Self {
        or_panic(self.try_div(other))
    }

    pub fn negated(&self) -> Self {
        self.mapped(|x| -x)
    }

    pub fn shifted(&self, k: f64) -> Self {
        self.mapped(|x| x + k)
    }

    pub fn scaled(&self, k: f64) -> Self {
        self.mapped(|x| x * k)
    }

    pub fn divided(&self, k: f64) -> Self {
        self.mapped(|x| x / k)
    }

    pub fn inverted_times(&self, k: f64) -> Self {
        self.mapped(|x| k / x)
    }
}

impl_uncertain_ops!([const N: usize] Ensemble<N>);

impl<const N: usize> Elementary for Ensemble<N> {
    /// Applies `f` to every sample. The `frexp` mantissa uses one exponent,
    /// taken from the mean, for all samples.
    fn apply(&self, f: Unary) -> Self {
        match f {
            Unary::Frexp => {
                let (_, e) = frexp(self.mean());
                self.mapped(|x| ldexp(x, -e))
            }
            _ => self.mapped(|x| f.eval(x)),
        }
    }

    /// # Panics
    /// On a stale operand; see [`Ensemble::try_apply2`].
    fn apply2(&self, f: Binary, other: &Self) -> Self {
        or_panic(self.try_apply2(f, other))
    }

    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        self.mapped(f)
    }

    fn center(&self) -> f64 {
        self.mean()
    }
}

impl<const N: usize> fmt::Display for Ensemble<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.moments();
        format::write_mean_sigma(f, m.mean, m.deviation)?;
        if m.deviation != 0.0 {
            write!(
                f,
                " [{:.3} : {:.3} : {:.3}]",
                m.skewness, m.kurtosis, m.fifth
            )?;
        }
        Ok(())
    }
}
