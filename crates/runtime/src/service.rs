//! The user-facing service contract.
//!
//! A service author implements [`Service`]; the runtime drives it only
//! through a [`ServiceAdapter`](crate::ServiceAdapter). Services never see
//! raw handles - only the view and index abstractions.

use oxbow_types::{BinaryMessage, CodecError, Hash, MessageKind, ServiceId};
use snafu::Snafu;

use crate::api::ApiRegistry;
use crate::error::Result;
use crate::views::{Fork, Snapshot};

/// Failure a service signals when it cannot convert a message.
///
/// An unrecognized message kind must be signaled through this error, never
/// by fabricating a transaction; the adapter turns it into a contract
/// violation with the service id and message kind attached.
#[derive(Debug, Snafu)]
pub enum ServiceError {
    /// The service does not recognize this message kind.
    #[snafu(display("Unrecognized message kind {kind}"))]
    UnknownMessageKind {
        /// The unrecognized kind.
        kind: MessageKind,
    },

    /// The payload failed to decode into the transaction the kind names.
    #[snafu(display("Transaction payload failed to decode: {source}"))]
    InvalidPayload {
        /// The underlying codec error.
        source: CodecError,
    },
}

/// An executable operation decoded from a transaction message.
///
/// Execution happens in the native pipeline against the fork it passes in;
/// the adapter only converts, never executes.
pub trait Transaction: Send {
    /// Applies this transaction's changes to the fork.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::StaleReference` if the fork was released, or
    /// `RuntimeError::Engine` on native failures.
    fn execute(&self, fork: &Fork) -> Result<()>;
}

impl std::fmt::Debug for dyn Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Transaction")
    }
}

/// A user-implemented service.
///
/// One instance lives for the service's process lifetime; the runtime may
/// call into it from multiple threads concurrently, so implementations hold
/// no call-scoped mutable state.
pub trait Service: Send + Sync {
    /// The service's identity, matched against every incoming message.
    fn id(&self) -> ServiceId;

    /// Human-readable service name.
    fn name(&self) -> &str;

    /// Converts a parsed message into an executable transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the kind is unrecognized or the
    /// payload does not decode - never a placeholder transaction.
    fn convert_transaction(
        &self,
        message: &BinaryMessage,
    ) -> std::result::Result<Box<dyn Transaction>, ServiceError>;

    /// Computes the hashes of the service's state as of `snapshot`.
    ///
    /// Indexes derived from the snapshot are valid only during this call;
    /// the adapter invalidates them when it returns.
    fn state_hashes(&self, snapshot: &Snapshot) -> Result<Vec<Hash>>;

    /// One-time initialization over the genesis fork.
    ///
    /// Returns the service's initial global configuration, or `None` if it
    /// has none.
    fn initialize(&self, fork: &Fork) -> Result<Option<String>>;

    /// Registers the service's public API handlers.
    fn wire_public_api(&self, _api: &mut ApiRegistry) {}

    /// Registers the service's private API handlers.
    fn wire_private_api(&self, _api: &mut ApiRegistry) {}
}
