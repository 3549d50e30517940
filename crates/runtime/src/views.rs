//! Database views: snapshots and forks.
//!
//! A view proxies a point-in-time database state owned by the native
//! engine. [`Snapshot`] is read-only; [`Fork`] additionally hands out
//! writable indexes whose writes the engine buffers until native code
//! commits the fork - this layer never commits.
//!
//! Every index a view hands out is registered with the view's
//! [`ViewRegistry`](crate::ViewRegistry) before the caller sees it. Release
//! runs on every exit path via `Drop` and in a fixed order: children are
//! invalidated first, then the proxy is released (destroying the native
//! view only when this proxy owns it). A view that is dropped while the
//! caller still holds indexes derived from it leaks nothing - index
//! invalidation is purely the in-process safety net; native cleanup depends
//! only on the view itself.

use std::sync::Arc;

use oxbow_engine::EngineBridge;
use oxbow_types::Handle;
use snafu::ResultExt;

use crate::error::{EngineSnafu, Result};
use crate::indexes::{ListIndex, ListIndexMut, MapIndex, MapIndexMut};
use crate::proxy::NativeProxy;
use crate::registry::ViewRegistry;

/// Shared body of the two view variants.
struct ViewInner {
    engine: Arc<dyn EngineBridge>,
    proxy: NativeProxy,
    registry: ViewRegistry,
}

impl ViewInner {
    fn new(engine: Arc<dyn EngineBridge>, handle: Handle, owning: bool) -> Self {
        Self { engine, proxy: NativeProxy::new(handle, owning), registry: ViewRegistry::new() }
    }

    fn map_index(&self, operation: &'static str, name: &str) -> Result<MapIndex> {
        let view = self.proxy.handle(operation)?;
        let handle = self.engine.open_map_index(view, name).context(EngineSnafu)?;
        let lease = self.registry.register();
        Ok(MapIndex::new(Arc::clone(&self.engine), handle, lease))
    }

    fn list_index(&self, operation: &'static str, name: &str) -> Result<ListIndex> {
        let view = self.proxy.handle(operation)?;
        let handle = self.engine.open_list_index(view, name).context(EngineSnafu)?;
        let lease = self.registry.register();
        Ok(ListIndex::new(Arc::clone(&self.engine), handle, lease))
    }

    fn release(&self) {
        // Children first: no index may survive into the window where the
        // native view is already gone.
        self.registry.invalidate_all();
        self.proxy.release(|handle| self.engine.destroy_view(handle));
    }
}

impl Drop for ViewInner {
    fn drop(&mut self) {
        self.release();
    }
}

/// A read-only view of the database state.
pub struct Snapshot {
    inner: ViewInner,
}

impl Snapshot {
    /// Wraps a native snapshot handle.
    ///
    /// `owning` decides whether this proxy destroys the native snapshot on
    /// release. The adapter wraps handles non-owning because the caller
    /// across the boundary retains the native lifetime.
    pub fn new(engine: Arc<dyn EngineBridge>, handle: Handle, owning: bool) -> Self {
        Self { inner: ViewInner::new(engine, handle, owning) }
    }

    /// Obtains a read-capable map index scoped to this snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::StaleReference` if the snapshot was released,
    /// or `RuntimeError::Engine` if the engine rejects the open.
    pub fn map_index(&self, name: &str) -> Result<MapIndex> {
        self.inner.map_index("Snapshot::map_index", name)
    }

    /// Obtains a read-capable list index scoped to this snapshot.
    pub fn list_index(&self, name: &str) -> Result<ListIndex> {
        self.inner.list_index("Snapshot::list_index", name)
    }

    /// Whether this view has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.inner.proxy.is_released()
    }
}

/// A writable, transaction-scoped view of the database state.
///
/// Writes are buffered inside the native fork and become visible outside it
/// only when native code atomically applies them.
pub struct Fork {
    inner: ViewInner,
}

impl Fork {
    /// Wraps a native fork handle. See [`Snapshot::new`] for `owning`.
    pub fn new(engine: Arc<dyn EngineBridge>, handle: Handle, owning: bool) -> Self {
        Self { inner: ViewInner::new(engine, handle, owning) }
    }

    /// Obtains a read-capable map index scoped to this fork.
    pub fn map_index(&self, name: &str) -> Result<MapIndex> {
        self.inner.map_index("Fork::map_index", name)
    }

    /// Obtains a writable map index scoped to this fork.
    pub fn map_index_mut(&self, name: &str) -> Result<MapIndexMut> {
        self.inner.map_index("Fork::map_index_mut", name).map(MapIndexMut::new)
    }

    /// Obtains a read-capable list index scoped to this fork.
    pub fn list_index(&self, name: &str) -> Result<ListIndex> {
        self.inner.list_index("Fork::list_index", name)
    }

    /// Obtains a writable list index scoped to this fork.
    pub fn list_index_mut(&self, name: &str) -> Result<ListIndexMut> {
        self.inner.list_index("Fork::list_index_mut", name).map(ListIndexMut::new)
    }

    /// Whether this view has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.inner.proxy.is_released()
    }
}
