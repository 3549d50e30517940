//! End-to-end adapter lifecycle tests against a counter service.
//!
//! The counter service deliberately retains an index past the call that
//! produced it, exercising the child-liveness safety net.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::disallowed_methods)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use oxbow_engine::InMemoryEngine;
use oxbow_runtime::{
    ApiError, Fork, MapIndex, Result, RuntimeError, Service, ServiceAdapter, ServiceError,
    Snapshot, Transaction,
};
use oxbow_types::{
    BinaryMessage, EMPTY_HASH, Handle, Hash, MessageKind, ServiceId, decode, encode, sha256,
};

const COUNTER_SERVICE_ID: ServiceId = ServiceId::new(42);
const KIND_INCREMENT: MessageKind = MessageKind::new(0);
const KIND_RESET: MessageKind = MessageKind::new(1);

const COUNTER_INDEX: &str = "counter";
const COUNTER_KEY: &[u8] = b"value";

#[derive(Debug, Serialize, Deserialize)]
struct IncrementPayload {
    by: u64,
}

struct IncrementTx {
    by: u64,
}

impl Transaction for IncrementTx {
    fn execute(&self, fork: &Fork) -> Result<()> {
        let mut index = fork.map_index_mut(COUNTER_INDEX)?;
        let current = match index.get(COUNTER_KEY)? {
            Some(bytes) => u64::from_be_bytes(bytes.try_into().expect("counter is 8 bytes")),
            None => 0,
        };
        index.put(COUNTER_KEY, &(current + self.by).to_be_bytes())?;
        Ok(())
    }
}

struct ResetTx;

impl Transaction for ResetTx {
    fn execute(&self, fork: &Fork) -> Result<()> {
        let mut index = fork.map_index_mut(COUNTER_INDEX)?;
        index.put(COUNTER_KEY, &0u64.to_be_bytes())?;
        Ok(())
    }
}

/// A counter service with a deliberate flaw: it stashes the index it
/// derived during `state_hashes` in a field, outliving the snapshot.
struct CounterService {
    initial_config: Option<String>,
    retained: Mutex<Option<MapIndex>>,
}

impl CounterService {
    fn new(initial_config: Option<String>) -> Self {
        Self { initial_config, retained: Mutex::new(None) }
    }
}

impl Service for CounterService {
    fn id(&self) -> ServiceId {
        COUNTER_SERVICE_ID
    }

    fn name(&self) -> &str {
        "counter"
    }

    fn convert_transaction(
        &self,
        message: &BinaryMessage,
    ) -> std::result::Result<Box<dyn Transaction>, ServiceError> {
        match message.kind() {
            KIND_INCREMENT => {
                let payload: IncrementPayload = decode(message.payload())
                    .map_err(|source| ServiceError::InvalidPayload { source })?;
                Ok(Box::new(IncrementTx { by: payload.by }))
            }
            KIND_RESET => Ok(Box::new(ResetTx)),
            kind => Err(ServiceError::UnknownMessageKind { kind }),
        }
    }

    fn state_hashes(&self, snapshot: &Snapshot) -> Result<Vec<Hash>> {
        let index = snapshot.map_index(COUNTER_INDEX)?;
        let hash = match index.get(COUNTER_KEY)? {
            Some(bytes) => sha256(&bytes),
            None => EMPTY_HASH,
        };
        *self.retained.lock() = Some(index);
        Ok(vec![hash])
    }

    fn initialize(&self, fork: &Fork) -> Result<Option<String>> {
        let mut index = fork.map_index_mut(COUNTER_INDEX)?;
        index.put(COUNTER_KEY, &0u64.to_be_bytes())?;
        Ok(self.initial_config.clone())
    }

    fn wire_public_api(&self, api: &mut oxbow_runtime::ApiRegistry) {
        api.handle("counter/get", |_request| Ok(b"0".to_vec()));
    }

    fn wire_private_api(&self, api: &mut oxbow_runtime::ApiRegistry) {
        api.handle("counter/reset", |request| {
            if !request.is_empty() {
                return Err(ApiError::BadRequest { message: "no body expected".to_string() });
            }
            Ok(Vec::new())
        });
    }
}

fn setup(initial_config: Option<String>) -> (Arc<InMemoryEngine>, Arc<CounterService>, ServiceAdapter) {
    oxbow_runtime::init_logging("warn");
    let engine = Arc::new(InMemoryEngine::new());
    let service = Arc::new(CounterService::new(initial_config));
    let adapter = ServiceAdapter::new(service.clone(), engine.clone());
    (engine, service, adapter)
}

fn increment_message(by: u64) -> Vec<u8> {
    let payload = encode(&IncrementPayload { by }).expect("encode payload");
    BinaryMessage::new(COUNTER_SERVICE_ID, KIND_INCREMENT, payload).to_bytes()
}

#[test]
fn convert_and_execute_well_formed_transaction() {
    let (engine, _service, adapter) = setup(None);

    let transaction = adapter.convert_transaction(&increment_message(5)).expect("convert");

    // The native pipeline executes the transaction against a fork and
    // commits it.
    let fork_handle = engine.create_fork();
    {
        let fork = Fork::new(engine.clone(), fork_handle, false);
        transaction.execute(&fork).expect("execute");
    }
    engine.commit_fork(fork_handle).expect("commit");

    assert_eq!(
        engine.committed_map_get(COUNTER_INDEX, COUNTER_KEY),
        Some(5u64.to_be_bytes().to_vec())
    );
}

#[test]
fn malformed_message_is_rejected() {
    let (_engine, _service, adapter) = setup(None);

    let err = adapter.convert_transaction(&[0, 42, 0]).expect_err("short input");
    assert!(matches!(err, RuntimeError::Malformed { .. }));
    assert!(err.code().is_client_fault());
}

#[test]
#[should_panic(expected = "routed to")]
fn message_for_other_service_fails_assertion() {
    let (_engine, _service, adapter) = setup(None);

    let foreign = BinaryMessage::new(ServiceId::new(99), KIND_INCREMENT, Vec::new()).to_bytes();
    let _ = adapter.convert_transaction(&foreign);
}

#[test]
fn unrecognized_kind_surfaces_contract_violation() {
    let (_engine, _service, adapter) = setup(None);

    let message = BinaryMessage::new(COUNTER_SERVICE_ID, MessageKind::new(7), Vec::new());
    let err = adapter.convert_transaction(&message.to_bytes()).expect_err("unknown kind");

    match &err {
        RuntimeError::ContractViolation { service_id, kind, .. } => {
            assert_eq!(*service_id, COUNTER_SERVICE_ID);
            assert_eq!(*kind, MessageKind::new(7));
        }
        other => panic!("expected contract violation, got: {other}"),
    }
    assert!(err.to_string().contains("service:42"));
}

#[test]
fn garbage_payload_surfaces_contract_violation() {
    let (_engine, _service, adapter) = setup(None);

    let message = BinaryMessage::new(COUNTER_SERVICE_ID, KIND_INCREMENT, vec![0xFF; 3]);
    let err = adapter.convert_transaction(&message.to_bytes()).expect_err("bad payload");
    assert!(matches!(err, RuntimeError::ContractViolation { .. }));
}

#[test]
fn state_hashes_rejects_null_handle_without_native_access() {
    let (_engine, _service, adapter) = setup(None);

    let err = adapter.state_hashes(Handle::NULL).expect_err("null sentinel");
    assert!(matches!(err, RuntimeError::PreconditionFailed { .. }));
}

#[test]
fn state_hashes_computes_over_snapshot_and_releases_it() {
    let (engine, _service, adapter) = setup(None);

    // Seed a committed counter value of 9.
    let fork_handle = engine.create_fork();
    {
        let fork = Fork::new(engine.clone(), fork_handle, false);
        let mut index = fork.map_index_mut(COUNTER_INDEX).expect("open index");
        index.put(COUNTER_KEY, &9u64.to_be_bytes()).expect("put");
    }
    engine.commit_fork(fork_handle).expect("commit");

    let snapshot_handle = engine.create_snapshot();
    let hashes = adapter.state_hashes(snapshot_handle).expect("state hashes");

    assert_eq!(hashes, vec![sha256(&9u64.to_be_bytes())]);
    // Non-owning proxy: the native snapshot must survive the call.
    assert_eq!(engine.destroy_count(snapshot_handle), 0);
}

#[test]
fn state_hashes_over_empty_state_reports_empty_hash() {
    let (engine, _service, adapter) = setup(None);

    let hashes = adapter.state_hashes(engine.create_snapshot()).expect("state hashes");
    assert_eq!(hashes, vec![EMPTY_HASH]);
}

#[test]
fn index_retained_past_state_hashes_fails_stale() {
    let (engine, service, adapter) = setup(None);

    adapter.state_hashes(engine.create_snapshot()).expect("state hashes");

    let retained = service.retained.lock().take().expect("service retained an index");
    assert!(retained.is_stale());
    let err = retained.get(COUNTER_KEY).expect_err("parent snapshot is released");
    assert!(matches!(err, RuntimeError::StaleReference { .. }));
}

#[test]
fn initialize_returns_configuration_and_releases_fork() {
    let (engine, _service, adapter) = setup(Some("{\"limit\":10}".to_string()));

    let fork_handle = engine.create_fork();
    let config = adapter.initialize(fork_handle).expect("initialize");

    assert_eq!(config.as_deref(), Some("{\"limit\":10}"));
    // Non-owning proxy: the native fork must survive for the engine to
    // commit.
    assert_eq!(engine.destroy_count(fork_handle), 0);

    engine.commit_fork(fork_handle).expect("commit");
    assert_eq!(
        engine.committed_map_get(COUNTER_INDEX, COUNTER_KEY),
        Some(0u64.to_be_bytes().to_vec())
    );
}

#[test]
fn initialize_reports_none_when_service_has_no_configuration() {
    let (engine, _service, adapter) = setup(None);

    let fork_handle = engine.create_fork();
    let config = adapter.initialize(fork_handle).expect("initialize");

    assert_eq!(config, None);
    assert_eq!(engine.destroy_count(fork_handle), 0);
}

#[test]
fn initialize_rejects_null_handle() {
    let (_engine, _service, adapter) = setup(None);

    let err = adapter.initialize(Handle::NULL).expect_err("null sentinel");
    assert!(matches!(err, RuntimeError::PreconditionFailed { .. }));
}

#[test]
fn api_handlers_are_mounted_by_delegation() {
    let (_engine, _service, adapter) = setup(None);

    let public = adapter.mount_public_api();
    assert!(public.handler("counter/get").is_some());
    assert_eq!(public.len(), 1);

    let private = adapter.mount_private_api();
    assert!(private.handler("counter/reset").is_some());
}

#[test]
fn adapter_identity_delegates_to_service() {
    let (_engine, _service, adapter) = setup(None);

    assert_eq!(adapter.service_id(), COUNTER_SERVICE_ID);
    assert_eq!(adapter.service_name(), "counter");
}
