//! Error types for the runtime bridge.
//!
//! Four kinds cross the adapter boundary:
//! - stale reference: an operation reached a released view or an index whose
//!   parent view was released; caught before any native access
//! - malformed: a transaction message failed to parse; rejects that message
//!   only
//! - contract violation: the user service failed to produce a transaction;
//!   a service defect surfaced with diagnosing context
//! - precondition failure: a null-sentinel handle where a real handle was
//!   required; an internal-caller defect
//!
//! Every kind propagates immediately to the adapter's caller; nothing is
//! retried inside this layer. Each variant maps to an [`ErrorCode`] for the
//! dispatcher boundary.

use oxbow_engine::EngineError;
use oxbow_types::{MessageError, MessageKind, ServiceId};
use snafu::{Location, Snafu};

use crate::service::ServiceError;

/// Unified result type for runtime bridge operations.
pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

/// Errors surfaced by the runtime bridge.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RuntimeError {
    /// Operation attempted on a released view, or on an index whose parent
    /// view was released.
    #[snafu(display("{operation} attempted on a released native handle"))]
    StaleReference {
        /// The operation that was attempted.
        operation: &'static str,
        #[snafu(implicit)]
        location: Location,
    },

    /// Transaction message failed to parse.
    #[snafu(display("Malformed transaction message: {source}"))]
    Malformed {
        /// The underlying parse error.
        source: MessageError,
        #[snafu(implicit)]
        location: Location,
    },

    /// The user service failed to produce a transaction for a message
    /// routed to it.
    #[snafu(display("Service {service_id} produced no transaction for message {kind}: {source}"))]
    ContractViolation {
        /// The service that violated its contract.
        service_id: ServiceId,
        /// The message kind it was asked to convert.
        kind: MessageKind,
        /// The failure the service signaled.
        source: ServiceError,
    },

    /// A null-sentinel handle was passed where a real handle was required.
    #[snafu(display("{operation} requires a non-null view handle"))]
    PreconditionFailed {
        /// The operation that was attempted.
        operation: &'static str,
        #[snafu(implicit)]
        location: Location,
    },

    /// A native engine operation failed.
    #[snafu(display("Engine operation failed: {source}"))]
    Engine {
        /// The underlying engine error.
        source: EngineError,
        #[snafu(implicit)]
        location: Location,
    },

    /// A service with this id is already registered with the runtime.
    #[snafu(display("Service {service_id} is already registered"))]
    DuplicateService {
        /// The colliding service id.
        service_id: ServiceId,
    },

    /// No registered service matches the message's declared identity.
    #[snafu(display("No service registered for {service_id}"))]
    UnknownService {
        /// The declared target service.
        service_id: ServiceId,
    },
}

impl RuntimeError {
    /// The machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            RuntimeError::StaleReference { .. } => ErrorCode::StaleReference,
            RuntimeError::Malformed { .. } => ErrorCode::MalformedMessage,
            RuntimeError::ContractViolation { .. } => ErrorCode::ContractViolation,
            RuntimeError::PreconditionFailed { .. } => ErrorCode::NullHandle,
            RuntimeError::Engine { .. } => ErrorCode::EngineFault,
            RuntimeError::DuplicateService { .. } => ErrorCode::DuplicateService,
            RuntimeError::UnknownService { .. } => ErrorCode::UnknownService,
        }
    }
}

/// Machine-readable error codes for the dispatcher boundary.
///
/// Codes are organized into ranges:
///
/// | Range       | Domain                                      |
/// |-------------|---------------------------------------------|
/// | 1000–1099   | Proxy lifecycle (stale handles, null handles) |
/// | 2000–2099   | Message parsing                             |
/// | 3000–3099   | Service contract and registration           |
/// | 4000–4099   | Native engine                               |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    /// Operation on a released view or stale index.
    StaleReference = 1000,
    /// Null-sentinel handle where a real handle was required.
    NullHandle = 1001,
    /// Transaction message failed to parse.
    MalformedMessage = 2000,
    /// Service failed to produce a transaction.
    ContractViolation = 3000,
    /// Duplicate service registration.
    DuplicateService = 3001,
    /// Message addressed to an unregistered service.
    UnknownService = 3002,
    /// Native engine operation failed.
    EngineFault = 4000,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a numeric code to an `ErrorCode`, returning `None` for
    /// unknown values.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1000 => Some(Self::StaleReference),
            1001 => Some(Self::NullHandle),
            2000 => Some(Self::MalformedMessage),
            3000 => Some(Self::ContractViolation),
            3001 => Some(Self::DuplicateService),
            3002 => Some(Self::UnknownService),
            4000 => Some(Self::EngineFault),
            _ => None,
        }
    }

    /// Whether this error is the caller's fault (a bad message) rather than
    /// a defect inside the boundary. Client-fault errors map to a client
    /// error response in a transport layer; everything else is a server
    /// error.
    #[must_use]
    pub const fn is_client_fault(self) -> bool {
        matches!(self, Self::MalformedMessage)
    }
}
