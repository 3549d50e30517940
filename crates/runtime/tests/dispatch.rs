//! Service runtime registration and dispatch tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::disallowed_methods)]

use std::sync::Arc;

use oxbow_engine::InMemoryEngine;
use oxbow_runtime::{
    Fork, Result, RuntimeConfig, RuntimeError, Service, ServiceError, ServiceRuntime, Snapshot,
    Transaction,
};
use oxbow_types::{BinaryMessage, Hash, MessageKind, ServiceId};

/// A service that marks its own name into the fork so dispatch targets are
/// distinguishable.
struct TagService {
    id: ServiceId,
    name: String,
}

impl TagService {
    fn new(id: u16, name: &str) -> Arc<Self> {
        Arc::new(Self { id: ServiceId::new(id), name: name.to_string() })
    }
}

struct TagTx {
    name: String,
}

impl Transaction for TagTx {
    fn execute(&self, fork: &Fork) -> Result<()> {
        let mut index = fork.map_index_mut("tags")?;
        index.put(b"last", self.name.as_bytes())?;
        Ok(())
    }
}

impl Service for TagService {
    fn id(&self) -> ServiceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_transaction(
        &self,
        message: &BinaryMessage,
    ) -> std::result::Result<Box<dyn Transaction>, ServiceError> {
        let kind = message.kind();
        if kind == MessageKind::new(0) {
            Ok(Box::new(TagTx { name: self.name.clone() }))
        } else {
            Err(ServiceError::UnknownMessageKind { kind })
        }
    }

    fn state_hashes(&self, _snapshot: &Snapshot) -> Result<Vec<Hash>> {
        Ok(Vec::new())
    }

    fn initialize(&self, _fork: &Fork) -> Result<Option<String>> {
        Ok(None)
    }
}

fn runtime() -> (Arc<InMemoryEngine>, ServiceRuntime) {
    let engine = Arc::new(InMemoryEngine::new());
    let runtime = ServiceRuntime::new(RuntimeConfig::default(), engine.clone());
    (engine, runtime)
}

fn tag_message(service_id: u16) -> Vec<u8> {
    BinaryMessage::new(ServiceId::new(service_id), MessageKind::new(0), Vec::new()).to_bytes()
}

#[test]
fn create_service_registers_one_adapter_per_service() {
    let (_engine, runtime) = runtime();

    runtime.create_service(TagService::new(1, "alpha")).expect("register alpha");
    runtime.create_service(TagService::new(2, "beta")).expect("register beta");

    assert_eq!(runtime.service_count(), 2);
    assert_eq!(
        runtime.adapter(ServiceId::new(1)).expect("alpha adapter").service_name(),
        "alpha"
    );
    assert!(runtime.adapter(ServiceId::new(3)).is_none());
}

#[test]
fn duplicate_service_id_is_rejected() {
    let (_engine, runtime) = runtime();

    runtime.create_service(TagService::new(1, "alpha")).expect("register alpha");
    let err = runtime.create_service(TagService::new(1, "impostor")).expect_err("duplicate");

    assert!(matches!(err, RuntimeError::DuplicateService { service_id } if service_id == ServiceId::new(1)));
    assert_eq!(runtime.service_count(), 1);
}

#[test]
fn dispatch_routes_by_declared_identity() {
    let (engine, runtime) = runtime();

    runtime.create_service(TagService::new(1, "alpha")).expect("register alpha");
    runtime.create_service(TagService::new(2, "beta")).expect("register beta");

    let transaction = runtime.dispatch_transaction(&tag_message(2)).expect("dispatch");

    let fork_handle = engine.create_fork();
    {
        let fork = Fork::new(engine.clone(), fork_handle, false);
        transaction.execute(&fork).expect("execute");
    }
    engine.commit_fork(fork_handle).expect("commit");

    assert_eq!(engine.committed_map_get("tags", b"last"), Some(b"beta".to_vec()));
}

#[test]
fn dispatch_to_unregistered_service_fails() {
    let (_engine, runtime) = runtime();

    let err = runtime.dispatch_transaction(&tag_message(9)).expect_err("no such service");
    assert!(matches!(err, RuntimeError::UnknownService { service_id } if service_id == ServiceId::new(9)));
}

#[test]
fn dispatch_rejects_malformed_messages() {
    let (_engine, runtime) = runtime();

    let err = runtime.dispatch_transaction(&[1, 2]).expect_err("garbage");
    assert!(matches!(err, RuntimeError::Malformed { .. }));
}
