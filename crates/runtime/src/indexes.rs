//! View-derived index objects.
//!
//! An index grants structured access to a portion of the state behind its
//! parent view. It holds the index handle the engine issued, a reference to
//! the engine, and the liveness lease its view registered for it. Every
//! operation checks the lease first: after the parent view is released the
//! check fails with a stale reference error, and no native access happens.
//!
//! [`MapIndex`] and [`ListIndex`] are read-only; forks hand out
//! [`MapIndexMut`] and [`ListIndexMut`], which add the write operations and
//! deref to their read-only counterparts. Indexes own no native resources -
//! only the parent view's release matters for native cleanup, so dropping
//! an index is free.

use std::ops::Deref;
use std::sync::Arc;

use oxbow_engine::EngineBridge;
use oxbow_types::Handle;
use snafu::ResultExt;

use crate::error::{EngineSnafu, Result};
use crate::registry::IndexLease;

/// Read access to a map of byte keys to byte values.
#[derive(Clone)]
pub struct MapIndex {
    engine: Arc<dyn EngineBridge>,
    handle: Handle,
    lease: Arc<IndexLease>,
}

impl MapIndex {
    pub(crate) fn new(
        engine: Arc<dyn EngineBridge>,
        handle: Handle,
        lease: Arc<IndexLease>,
    ) -> Self {
        Self { engine, handle, lease }
    }

    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::StaleReference` if the parent view was
    /// released.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.lease.ensure_live("MapIndex::get")?;
        self.engine.map_get(self.handle, key).context(EngineSnafu)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        self.lease.ensure_live("MapIndex::contains")?;
        self.engine.map_contains(self.handle, key).context(EngineSnafu)
    }

    /// Whether the parent view has been released.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.lease.is_stale()
    }
}

/// Write access to a map, handed out by forks only.
pub struct MapIndexMut {
    base: MapIndex,
}

impl MapIndexMut {
    pub(crate) fn new(base: MapIndex) -> Self {
        Self { base }
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// The write stays buffered in the parent fork until native code
    /// commits it.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.base.lease.ensure_live("MapIndex::put")?;
        self.base.engine.map_put(self.base.handle, key, value).context(EngineSnafu)
    }

    /// Removes `key`. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &[u8]) -> Result<()> {
        self.base.lease.ensure_live("MapIndex::remove")?;
        self.base.engine.map_remove(self.base.handle, key).context(EngineSnafu)
    }
}

impl Deref for MapIndexMut {
    type Target = MapIndex;

    fn deref(&self) -> &MapIndex {
        &self.base
    }
}

/// Read access to an append-ordered list of byte values.
#[derive(Clone)]
pub struct ListIndex {
    engine: Arc<dyn EngineBridge>,
    handle: Handle,
    lease: Arc<IndexLease>,
}

impl ListIndex {
    pub(crate) fn new(
        engine: Arc<dyn EngineBridge>,
        handle: Handle,
        lease: Arc<IndexLease>,
    ) -> Self {
        Self { engine, handle, lease }
    }

    /// Number of elements.
    pub fn len(&self) -> Result<u64> {
        self.lease.ensure_live("ListIndex::len")?;
        self.engine.list_len(self.handle).context(EngineSnafu)
    }

    /// Whether the list holds no elements.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns the element at `position`, or `None` past the end.
    pub fn get(&self, position: u64) -> Result<Option<Vec<u8>>> {
        self.lease.ensure_live("ListIndex::get")?;
        self.engine.list_get(self.handle, position).context(EngineSnafu)
    }

    /// Whether the parent view has been released.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.lease.is_stale()
    }
}

/// Write access to a list, handed out by forks only.
pub struct ListIndexMut {
    base: ListIndex,
}

impl ListIndexMut {
    pub(crate) fn new(base: ListIndex) -> Self {
        Self { base }
    }

    /// Appends `value` to the list.
    ///
    /// The write stays buffered in the parent fork until native code
    /// commits it.
    pub fn push(&mut self, value: &[u8]) -> Result<()> {
        self.base.lease.ensure_live("ListIndex::push")?;
        self.base.engine.list_push(self.base.handle, value).context(EngineSnafu)
    }
}

impl Deref for ListIndexMut {
    type Target = ListIndex;

    fn deref(&self) -> &ListIndex {
        &self.base
    }
}
