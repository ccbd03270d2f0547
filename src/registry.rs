//! Named uncertainty sources, valid for one epoch.
//!
//! Every leaf value with non-zero uncertainty built by a tracked or
//! ensemble representation registers one source here. Values remember the
//! epoch they were built in; [`SourceRegistry::new_epoch`] drops every
//! source and invalidates those values in one step.
//!
//! A registry is a cheap, cloneable handle. Clones share state, so the
//! handle can be stored inside every value it issued.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, UncertainError};

/// Maximum number of sources per epoch.
pub const MAX_UNC_ELEMENTS: usize = 5;

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

/// Epoch token. Tokens are unique across every registry in the process,
/// so a value can never pass the check of a registry that did not issue it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(u64);

impl Epoch {
    fn next() -> Self {
        Epoch(NEXT_EPOCH.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw token value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct Source<P> {
    name: String,
    payload: P,
}

#[derive(Debug)]
struct Inner<P> {
    epoch: Epoch,
    sources: Vec<Source<P>>,
}

/// Shared registry of uncertainty sources.
///
/// `P` is per-source data kept alongside the name; ensembles store the
/// source's original sample vector there.
///
/// # Examples
/// ```
/// use u_uncertain::registry::{SourceRegistry, MAX_UNC_ELEMENTS};
///
/// let registry = SourceRegistry::<()>::new();
/// for i in 0..MAX_UNC_ELEMENTS {
///     assert_eq!(registry.new_source(&format!("s{i}"), ()).unwrap(), i);
/// }
/// assert!(registry.new_source("one too many", ()).is_err());
///
/// let old = registry.epoch();
/// registry.new_epoch();
/// assert!(registry.check_epoch(old).is_err());
/// assert_eq!(registry.new_source("fresh", ()).unwrap(), 0);
/// ```
pub struct SourceRegistry<P = ()> {
    inner: Rc<RefCell<Inner<P>>>,
}

impl<P> SourceRegistry<P> {
    /// Creates an empty registry at a fresh epoch.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                epoch: Epoch::next(),
                sources: Vec::with_capacity(MAX_UNC_ELEMENTS),
            })),
        }
    }

    /// Current epoch token.
    pub fn epoch(&self) -> Epoch {
        self.inner.borrow().epoch
    }

    /// Verifies that `token` is this registry's current epoch.
    ///
    /// # Errors
    /// [`UncertainError::StaleEpoch`] otherwise.
    pub fn check_epoch(&self, token: Epoch) -> Result<()> {
        let current = self.epoch();
        if token != current {
            return Err(UncertainError::StaleEpoch {
                found: token.get(),
                current: current.get(),
            });
        }
        Ok(())
    }

    /// Drops every source and advances the epoch, invalidating every value
    /// issued so far.
    pub fn new_epoch(&self) {
        let mut inner = self.inner.borrow_mut();
        let dropped = inner.sources.len();
        inner.sources.clear();
        inner.epoch = Epoch::next();
        tracing::debug!(epoch = inner.epoch.get(), dropped, "new uncertainty epoch");
    }

    /// Registers a source and returns its 0-based index.
    ///
    /// # Errors
    /// [`UncertainError::CapacityExceeded`] when the epoch already holds
    /// [`MAX_UNC_ELEMENTS`] sources.
    pub fn new_source(&self, name: &str, payload: P) -> Result<usize> {
        let mut inner = self.inner.borrow_mut();
        let index = inner.sources.len();
        if index >= MAX_UNC_ELEMENTS {
            return Err(UncertainError::CapacityExceeded {
                capacity: MAX_UNC_ELEMENTS,
            });
        }
        inner.sources.push(Source {
            name: name.to_string(),
            payload,
        });
        Ok(index)
    }

    pub fn num_sources(&self) -> usize {
        self.inner.borrow().sources.len()
    }

    pub fn capacity(&self) -> usize {
        MAX_UNC_ELEMENTS
    }

    /// Display name of source `index`.
    ///
    /// # Errors
    /// [`UncertainError::IndexOutOfRange`] when `index >= num_sources()`.
    pub fn source_name(&self, index: usize) -> Result<String> {
        let inner = self.inner.borrow();
        inner
            .sources
            .get(index)
            .map(|s| s.name.clone())
            .ok_or(UncertainError::IndexOutOfRange {
                index,
                len: inner.sources.len(),
            })
    }

    /// Whether both handles refer to the same registry.
    pub fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<P: Clone> SourceRegistry<P> {
    /// Payload recorded for source `index`.
    ///
    /// # Errors
    /// [`UncertainError::IndexOutOfRange`] when `index >= num_sources()`.
    pub fn payload(&self, index: usize) -> Result<P> {
        let inner = self.inner.borrow();
        inner
            .sources
            .get(index)
            .map(|s| s.payload.clone())
            .ok_or(UncertainError::IndexOutOfRange {
                index,
                len: inner.sources.len(),
            })
    }
}

impl<P> Clone for SourceRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P> Default for SourceRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for SourceRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let names: Vec<&str> = inner.sources.iter().map(|s| s.name.as_str()).collect();
        f.debug_struct("SourceRegistry")
            .field("epoch", &inner.epoch)
            .field("sources", &names)
            .finish()
    }
}

/// Share of a value's variance attributed to one source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceContribution {
    pub name: String,
    /// Percentage of the total variance.
    pub percent: f64,
}

impl fmt::Display for SourceContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2}%", self.name, self.percent)
    }
}

/// Writes one contribution per line.
pub fn write_contributions(
    w: &mut impl fmt::Write,
    contributions: &[SourceContribution],
) -> fmt::Result {
    for c in contributions {
        writeln!(w, "{c}")?;
    }
    Ok(())
}
