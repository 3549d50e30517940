//! Service runtime: adapter registry and transaction dispatch.
//!
//! The runtime owns one [`ServiceAdapter`] per loaded service and routes
//! transaction messages to the adapter matching the identity each message
//! declares. Because routing happens here, the adapter's own identity
//! assertion only ever trips on a dispatcher bug.

use std::collections::HashMap;
use std::sync::Arc;

use oxbow_engine::EngineBridge;
use oxbow_types::{BinaryMessage, ServiceId};
use parking_lot::RwLock;
use snafu::{ResultExt, ensure};
use tracing::info;

use crate::adapter::ServiceAdapter;
use crate::config::RuntimeConfig;
use crate::error::{DuplicateServiceSnafu, MalformedSnafu, Result, RuntimeError};
use crate::service::{Service, Transaction};

/// Registry of running services and the dispatch entry point.
pub struct ServiceRuntime {
    config: RuntimeConfig,
    engine: Arc<dyn EngineBridge>,
    services: RwLock<HashMap<ServiceId, Arc<ServiceAdapter>>>,
}

impl ServiceRuntime {
    /// Creates a runtime bound to the given engine.
    pub fn new(config: RuntimeConfig, engine: Arc<dyn EngineBridge>) -> Self {
        Self { config, engine, services: RwLock::new(HashMap::new()) }
    }

    /// The runtime's configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Creates the adapter for a service instance and registers it.
    ///
    /// One adapter per service: it is created here, at service load, and
    /// lives as long as the runtime.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::DuplicateService` if a service with the same
    /// id is already registered.
    pub fn create_service(&self, service: Arc<dyn Service>) -> Result<Arc<ServiceAdapter>> {
        let service_id = service.id();
        let mut services = self.services.write();
        ensure!(!services.contains_key(&service_id), DuplicateServiceSnafu { service_id });

        let adapter = Arc::new(ServiceAdapter::new(service, Arc::clone(&self.engine)));
        services.insert(service_id, Arc::clone(&adapter));
        info!(%service_id, name = adapter.service_name(), "service registered");
        Ok(adapter)
    }

    /// Looks up the adapter for a service id.
    #[must_use]
    pub fn adapter(&self, service_id: ServiceId) -> Option<Arc<ServiceAdapter>> {
        self.services.read().get(&service_id).cloned()
    }

    /// Number of registered services.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.read().len()
    }

    /// Routes a raw transaction message to the service it declares and
    /// converts it.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Malformed` if the bytes do not parse,
    /// `RuntimeError::UnknownService` if no service matches the declared
    /// identity, or whatever the adapter's conversion surfaces.
    pub fn dispatch_transaction(&self, raw: &[u8]) -> Result<Box<dyn Transaction>> {
        let message = BinaryMessage::from_bytes(raw).context(MalformedSnafu)?;
        let service_id = message.service_id();
        let adapter = self
            .adapter(service_id)
            .ok_or(RuntimeError::UnknownService { service_id })?;
        adapter.convert_transaction(raw)
    }
}
