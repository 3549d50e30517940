//! Handle-owning native proxy.
//!
//! A [`NativeProxy`] wraps one handle issued by the engine together with an
//! ownership flag fixed at construction. An owning proxy is responsible for
//! triggering native destruction of its handle on release, exactly once; a
//! non-owning proxy only marks itself released and leaves the native
//! lifetime to whoever handed the handle across the boundary.
//!
//! Once released, the handle is unreadable: every accessor fails with a
//! stale reference error naming the attempted operation.

use std::cell::Cell;

use oxbow_types::Handle;
use snafu::ensure;

use crate::error::{Result, StaleReferenceSnafu};

/// A proxy over one native handle.
///
/// Uses `Cell` for the release flag, which keeps proxies (and the views
/// built on them) out of cross-thread sharing: each boundary call wraps,
/// uses, and releases its own view on one thread.
#[derive(Debug)]
pub struct NativeProxy {
    handle: Handle,
    owning: bool,
    released: Cell<bool>,
}

impl NativeProxy {
    /// Wraps a handle supplied by native code.
    ///
    /// `owning` is fixed for the proxy's lifetime; ownership transfer after
    /// construction is not supported.
    pub fn new(handle: Handle, owning: bool) -> Self {
        Self { handle, owning, released: Cell::new(false) }
    }

    /// Returns the wrapped handle for the named operation.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::StaleReference` if the proxy was released.
    pub fn handle(&self, operation: &'static str) -> Result<Handle> {
        ensure!(!self.released.get(), StaleReferenceSnafu { operation });
        Ok(self.handle)
    }

    /// Whether this proxy is responsible for native destruction.
    #[must_use]
    pub fn is_owning(&self) -> bool {
        self.owning
    }

    /// Whether this proxy has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.get()
    }

    /// Releases the proxy. Idempotent.
    ///
    /// If the proxy owns its handle, `destroy` is invoked with the handle -
    /// on the first call only. Non-owning proxies never invoke `destroy`,
    /// on any path.
    pub fn release(&self, destroy: impl FnOnce(Handle)) {
        if self.released.replace(true) {
            return;
        }
        if self.owning {
            destroy(self.handle);
        }
    }
}
