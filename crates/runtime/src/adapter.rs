//! Adapter between a user service and the native runtime.
//!
//! One adapter exists per running service instance, created at service load
//! and alive for the process lifetime. It is the only code the native side
//! calls into for that service: identity, transaction conversion, state
//! hash computation, one-time initialization, and API handler mounting.
//!
//! The adapter holds nothing mutable beyond the shared service reference,
//! so concurrent invocations from the native thread pool are each
//! self-contained. Every view it wraps is non-owning (the caller across the
//! boundary retains the native lifetime) and is released on all exit paths
//! before the method returns, invalidating any index the service derived
//! during the call - including one it improperly retained in a field.

use std::sync::Arc;

use oxbow_engine::EngineBridge;
use oxbow_types::{BinaryMessage, Handle, Hash, ServiceId};
use snafu::{ResultExt, ensure};
use tracing::{debug, instrument};

use crate::api::ApiRegistry;
use crate::error::{ContractViolationSnafu, MalformedSnafu, PreconditionFailedSnafu, Result};
use crate::service::{Service, Transaction};
use crate::views::{Fork, Snapshot};

/// The per-service entry point driven by the native runtime.
pub struct ServiceAdapter {
    service: Arc<dyn Service>,
    engine: Arc<dyn EngineBridge>,
}

impl std::fmt::Debug for ServiceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAdapter")
            .field("service_id", &self.service.id())
            .field("service_name", &self.service.name())
            .finish()
    }
}

impl ServiceAdapter {
    /// Binds a service implementation to the engine boundary.
    pub fn new(service: Arc<dyn Service>, engine: Arc<dyn EngineBridge>) -> Self {
        Self { service, engine }
    }

    /// The wrapped service's identity.
    #[must_use]
    pub fn service_id(&self) -> ServiceId {
        self.service.id()
    }

    /// The wrapped service's name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Converts a raw transaction message into an executable transaction of
    /// this service.
    ///
    /// The dispatcher is responsible for routing only matching messages
    /// here; a message declaring a different service id is a programming
    /// fault inside the boundary layer and fails an assertion rather than
    /// surfacing as a recoverable error.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Malformed` if the bytes do not parse, or
    /// `RuntimeError::ContractViolation` if the service fails to produce a
    /// transaction.
    ///
    /// # Panics
    ///
    /// Panics if the message's declared service id differs from this
    /// adapter's service id.
    #[instrument(skip(self, raw), fields(service = %self.service.id()))]
    pub fn convert_transaction(&self, raw: &[u8]) -> Result<Box<dyn Transaction>> {
        let message = BinaryMessage::from_bytes(raw).context(MalformedSnafu)?;
        assert!(
            message.service_id() == self.service.id(),
            "message declares {} but was routed to {}",
            message.service_id(),
            self.service.id(),
        );

        let kind = message.kind();
        let transaction = self
            .service
            .convert_transaction(&message)
            .context(ContractViolationSnafu { service_id: self.service.id(), kind })?;
        debug!(%kind, "converted transaction");
        Ok(transaction)
    }

    /// Computes the service's state hashes over the snapshot behind
    /// `handle`.
    ///
    /// The native snapshot is not destroyed: the proxy is non-owning. It is
    /// released exactly once when this method returns, which invalidates
    /// every index the service derived during the call.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::PreconditionFailed` for the null sentinel,
    /// without any native access.
    #[instrument(skip(self), fields(service = %self.service.id()))]
    pub fn state_hashes(&self, handle: Handle) -> Result<Vec<Hash>> {
        ensure!(
            !handle.is_null(),
            PreconditionFailedSnafu { operation: "ServiceAdapter::state_hashes" }
        );

        let snapshot = Snapshot::new(Arc::clone(&self.engine), handle, false);
        let hashes = self.service.state_hashes(&snapshot);
        debug!(ok = hashes.is_ok(), "state hash computation finished");
        // `snapshot` drops here on every path, invalidating derived indexes.
        hashes
    }

    /// Runs the service's one-time initialization over the fork behind
    /// `handle`.
    ///
    /// Returns the service's initial global configuration, or `None` if it
    /// has none. The fork proxy is non-owning and released exactly once
    /// regardless of which branch is taken.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::PreconditionFailed` for the null sentinel,
    /// without any native access.
    #[instrument(skip(self), fields(service = %self.service.id()))]
    pub fn initialize(&self, handle: Handle) -> Result<Option<String>> {
        ensure!(
            !handle.is_null(),
            PreconditionFailedSnafu { operation: "ServiceAdapter::initialize" }
        );

        let fork = Fork::new(Arc::clone(&self.engine), handle, false);
        let config = self.service.initialize(&fork);
        debug!(ok = config.is_ok(), "initialization finished");
        config
    }

    /// Collects the service's public API handlers.
    #[must_use]
    pub fn mount_public_api(&self) -> ApiRegistry {
        let mut api = ApiRegistry::new();
        self.service.wire_public_api(&mut api);
        api
    }

    /// Collects the service's private API handlers.
    #[must_use]
    pub fn mount_private_api(&self) -> ApiRegistry {
        let mut api = ApiRegistry::new();
        self.service.wire_private_api(&mut api);
        api
    }
}
