//! Correlation tracking through per-source uncertainty components.
//!
//! Each leaf value with non-zero uncertainty registers one named source and
//! sets exactly that component. Arithmetic applies the product and quotient
//! rules per component, so a value always knows how much of its spread
//! came from which source and `x - x` is exactly certain. Elementary
//! functions scale every component by the first-order slope; curvature is
//! not modelled here.
//!
//! # Examples
//! ```
//! use u_uncertain::registry::SourceRegistry;
//! use u_uncertain::UDoubleCTSA;
//!
//! let registry = SourceRegistry::new();
//! let mut a = UDoubleCTSA::new(&registry, 2.0, 1.0, None).unwrap();
//! let b = UDoubleCTSA::new(&registry, 3.0, 0.5, Some("b")).unwrap();
//! a += b;
//! assert_eq!(a.mean(), 5.0);
//! assert!((a.deviation() - 1.118034).abs() < 1e-6);
//! ```

use std::fmt;

use crate::array::UncertaintyVector;
use crate::elementary::Elementary;
use crate::error::{or_panic, Result, UncertainError};
use crate::format;
use crate::moments::{propagate_by_slope, Binary, Unary};
use crate::registry::{write_contributions, Epoch, SourceContribution, SourceRegistry};

/// A value carrying one uncertainty component per registered source.
#[derive(Debug, Clone)]
pub struct Tracked<A: UncertaintyVector> {
    value: f64,
    components: A,
    epoch: Epoch,
    registry: SourceRegistry,
}

impl<A: UncertaintyVector> Tracked<A> {
    /// Creates a leaf value.
    ///
    /// A non-zero `uncertainty` registers one new source named `name`, or
    /// the value's `mean +/- sigma` text when `name` is `None`. A zero
    /// uncertainty registers nothing.
    ///
    /// # Errors
    /// - [`UncertainError::NegativeUncertainty`] when `uncertainty < 0`.
    /// - [`UncertainError::CapacityExceeded`] when the registry is full.
    pub fn new(
        registry: &SourceRegistry,
        mean: f64,
        uncertainty: f64,
        name: Option<&str>,
    ) -> Result<Self> {
        if uncertainty < 0.0 {
            return Err(UncertainError::NegativeUncertainty(uncertainty));
        }
        let mut components = A::default();
        if uncertainty != 0.0 {
            let name = match name {
                Some(n) => n.to_string(),
                None => format::format_mean_sigma(mean, uncertainty),
            };
            let index = registry.new_source(&name, ())?;
            components.set(index, uncertainty)?;
        }
        Ok(Self {
            value: mean,
            components,
            epoch: registry.epoch(),
            registry: registry.clone(),
        })
    }

    /// A value with no uncertainty.
    pub fn certain(registry: &SourceRegistry, value: f64) -> Self {
        Self {
            value,
            components: A::default(),
            epoch: registry.epoch(),
            registry: registry.clone(),
        }
    }

    /// Parses `"<mean> +/- <sigma>"` into a new leaf value.
    ///
    /// # Errors
    /// [`UncertainError::Format`] plus every error of [`Tracked::new`].
    pub fn parse(registry: &SourceRegistry, text: &str, name: Option<&str>) -> Result<Self> {
        let (mean, sigma) = format::parse_mean_sigma(text)?;
        Self::new(registry, mean, sigma, name)
    }

    pub fn mean(&self) -> f64 {
        self.value
    }

    /// Total standard deviation, the norm of the component vector.
    pub fn deviation(&self) -> f64 {
        self.components.norm()
    }

    pub fn components(&self) -> &A {
        &self.components
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    fn with_components(&self, value: f64, components: A) -> Self {
        Self {
            value,
            components,
            epoch: self.epoch,
            registry: self.registry.clone(),
        }
    }

    fn check_pair(&self, other: &Self) -> Result<()> {
        self.registry.check_epoch(self.epoch)?;
        self.registry.check_epoch(other.epoch)
    }

    fn scaled_components(&self, k: f64) -> A {
        let mut c = self.components.clone();
        c.mul_scalar(k);
        c
    }

    /// `self + other`.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.check_pair(other)?;
        let mut c = self.components.clone();
        c.add_vector(&other.components);
        Ok(self.with_components(self.value + other.value, c))
    }

    /// `self - other`.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.check_pair(other)?;
        let mut c = self.components.clone();
        c.sub_vector(&other.components);
        Ok(self.with_components(self.value - other.value, c))
    }

    /// `self · other`, product rule per component.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        self.check_pair(other)?;
        let mut c = self.scaled_components(other.value);
        c.add_vector(&other.scaled_components(self.value));
        Ok(self.with_components(self.value * other.value, c))
    }

    /// `self / other`, quotient rule per component.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_div(&self, other: &Self) -> Result<Self> {
        self.check_pair(other)?;
        let b = other.value;
        let mut c = self.scaled_components(1.0 / b);
        c.sub_vector(&other.scaled_components(self.value / (b * b)));
        Ok(self.with_components(self.value / b, c))
    }

    /// `f(self, other)` with each operand's components scaled by its
    /// partial slope.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when either operand is stale.
    pub fn try_apply2(&self, f: Binary, other: &Self) -> Result<Self> {
        self.check_pair(other)?;
        let (da, db) = f.moments(self.value, other.value);
        let mut c = self.scaled_components(da.slope);
        c.add_vector(&other.scaled_components(db.slope));
        Ok(self.with_components(da.value, c))
    }

    /// # Panics
    /// On a stale operand; see [`Tracked::try_add`].
    pub fn plus(&self, other: &Self) -> Self {
        or_panic(self.try_add(other))
    }

    /// # Panics
    /// On a stale operand; see [`Tracked::try_sub`].
    pub fn minus(&self, other: &Self) -> Self {
        or_panic(self.try_sub(other))
    }

    /// # Panics
    /// On a stale operand; see [`Tracked::try_mul`].
    pub fn times(&self, other: &Self) -> Self {
        or_panic(self.try_mul(other))
    }

    /// # Panics
    /// On a stale operand; see [`Tracked::try_div`].
    pub fn over(&self, other: &Self) -> Self {
        or_panic(self.try_div(other))
    }

    pub fn negated(&self) -> Self {
        self.with_components(-self.value, self.scaled_components(-1.0))
    }

    pub fn shifted(&self, k: f64) -> Self {
        self.with_components(self.value + k, self.components.clone())
    }

    pub fn scaled(&self, k: f64) -> Self {
        self.with_components(self.value * k, self.scaled_components(k))
    }

    pub fn divided(&self, k: f64) -> Self {
        let mut c = self.components.clone();
        c.div_scalar(k);
        self.with_components(self.value / k, c)
    }

    pub fn inverted_times(&self, k: f64) -> Self {
        let x = self.value;
        self.with_components(k / x, self.scaled_components(-k / (x * x)))
    }

    /// Share of the variance contributed by each registered source,
    /// `(componentᵢ / deviation)²` as a percentage.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when the value is stale.
    pub fn source_contributions(&self) -> Result<Vec<SourceContribution>> {
        self.registry.check_epoch(self.epoch)?;
        let total = self.deviation();
        (0..self.registry.num_sources())
            .map(|i| {
                let c = self.components.get(i)?;
                let percent = if total == 0.0 {
                    0.0
                } else {
                    (c / total).powi(2) * 100.0
                };
                Ok(SourceContribution {
                    name: self.registry.source_name(i)?,
                    percent,
                })
            })
            .collect()
    }

    /// Renders [`Tracked::source_contributions`], one source per line.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] when the value is stale.
    pub fn uncertain_sources_report(&self) -> Result<String> {
        let mut out = String::new();
        write_contributions(&mut out, &self.source_contributions()?)
            .map_err(|e| UncertainError::Format(e.to_string()))?;
        Ok(out)
    }
}

impl_uncertain_ops!([A: UncertaintyVector] Tracked<A>);

impl<A: UncertaintyVector> Elementary for Tracked<A> {
    /// First-order only: every component is scaled by the slope.
    fn apply(&self, f: Unary) -> Self {
        let m = f.moments(self.value);
        self.with_components(m.value, self.scaled_components(m.slope))
    }

    /// # Panics
    /// On a stale operand; see [`Tracked::try_apply2`].
    fn apply2(&self, f: Binary, other: &Self) -> Self {
        or_panic(self.try_apply2(f, other))
    }

    fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        let m = propagate_by_slope(f, self.value, self.deviation());
        self.with_components(m.value, self.scaled_components(m.slope))
    }

    fn center(&self) -> f64 {
        self.value
    }
}

impl<A: UncertaintyVector> fmt::Display for Tracked<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format::write_mean_sigma(f, self.value, self.deviation())
    }
}
