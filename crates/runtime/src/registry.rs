//! Child-liveness tracking for view-derived objects.
//!
//! Every index handed out by a view is registered here before the caller
//! sees it. When the view is released, the registry invalidates all of its
//! children in one pass, so an index retained past its view's lifetime
//! fails with a stale reference error instead of dereferencing freed native
//! memory.
//!
//! Registration (from service code, arbitrary thread) and invalidation
//! (from the releasing call's thread) can race. Both run under one mutex:
//! once the invalidation pass has begun, any registration that arrives
//! afterwards observes the invalidated flag and yields an already-stale
//! lease - a new child can never outlive the sweep.

use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use snafu::ensure;

use crate::error::{Result, StaleReferenceSnafu};

/// Liveness cell shared between one derived object and its registry.
///
/// The flag flips at most once, live to stale. Index operations read it
/// lock-free with acquire ordering; the registry's sweep publishes with
/// release ordering under the registry mutex.
#[derive(Debug)]
pub struct IndexLease {
    stale: AtomicBool,
}

impl IndexLease {
    fn live() -> Arc<Self> {
        Arc::new(Self { stale: AtomicBool::new(false) })
    }

    fn already_stale() -> Arc<Self> {
        Arc::new(Self { stale: AtomicBool::new(true) })
    }

    fn invalidate(&self) {
        self.stale.store(true, Ordering::Release);
    }

    /// Whether the parent view has been released.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    /// Fails with a stale reference error if the parent view was released.
    ///
    /// Called by every index operation before any native access.
    pub fn ensure_live(&self, operation: &'static str) -> Result<()> {
        ensure!(!self.is_stale(), StaleReferenceSnafu { operation });
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    invalidated: bool,
    children: Vec<Weak<IndexLease>>,
}

/// Tracks the objects derived from one view.
///
/// Children hold strong references to their leases; the registry holds weak
/// ones, so an index dropped by the caller costs nothing at invalidation
/// time. Invalidation is one level deep: children own no further native
/// handles in this model.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    inner: Mutex<RegistryInner>,
}

impl ViewRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new child of this registry's view and returns its lease.
    ///
    /// If invalidation has already begun, the returned lease is stale from
    /// the start - the caller gets a child that rejects every operation,
    /// never a usable one.
    pub fn register(&self) -> Arc<IndexLease> {
        let mut inner = self.inner.lock();
        if inner.invalidated {
            return IndexLease::already_stale();
        }

        // Compact dropped children before growing the list further, so a
        // long-lived view deriving many short-lived indexes stays bounded.
        if inner.children.len() == inner.children.capacity() {
            inner.children.retain(|child| child.strong_count() > 0);
        }

        let lease = IndexLease::live();
        inner.children.push(Arc::downgrade(&lease));
        lease
    }

    /// Invalidates every registered child.
    ///
    /// Called during the parent view's release, before the view's own
    /// handle is destroyed. After this returns, every lease this registry
    /// ever handed out is stale, and every future `register` call yields a
    /// stale lease.
    pub fn invalidate_all(&self) {
        let mut inner = self.inner.lock();
        inner.invalidated = true;
        for child in inner.children.drain(..) {
            if let Some(lease) = child.upgrade() {
                lease.invalidate();
            }
        }
    }

    /// Whether invalidation has begun.
    #[must_use]
    pub fn is_invalidated(&self) -> bool {
        self.inner.lock().invalidated
    }
}
