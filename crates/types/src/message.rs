//! Transaction wire message.
//!
//! A transaction message carries a fixed routing header followed by an
//! opaque payload understood only by the target service's converter.
//!
//! Header layout (big-endian, 8 bytes fixed):
//! - service_id: 2 bytes (u16 BE)
//! - kind: 2 bytes (u16 BE)
//! - payload_len: 4 bytes (u32 BE)
//!
//! The payload follows immediately and must be exactly `payload_len` bytes;
//! trailing garbage is rejected.

use snafu::{Snafu, ensure};

use crate::ids::{MessageKind, ServiceId};

/// Size of the fixed routing header in bytes.
pub const HEADER_LEN: usize = 8;

/// Errors returned when parsing a transaction message.
#[derive(Debug, Snafu)]
pub enum MessageError {
    /// The input is shorter than the fixed routing header.
    #[snafu(display("Message too short: {actual} bytes, header requires {HEADER_LEN}"))]
    Truncated {
        /// Actual input length.
        actual: usize,
    },

    /// The declared payload length does not match the bytes present.
    #[snafu(display("Declared payload length {declared} does not match {actual} payload bytes"))]
    LengthMismatch {
        /// Length declared in the header.
        declared: u32,
        /// Payload bytes actually present after the header.
        actual: usize,
    },
}

/// A typed transaction message: routing header plus opaque payload.
///
/// The bridge reads only the header; the payload is handed verbatim to the
/// target service's converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMessage {
    service_id: ServiceId,
    kind: MessageKind,
    payload: Vec<u8>,
}

impl BinaryMessage {
    /// Creates a message from its parts.
    pub fn new(service_id: ServiceId, kind: MessageKind, payload: Vec<u8>) -> Self {
        Self { service_id, kind, payload }
    }

    /// The service this message is addressed to.
    #[inline]
    #[must_use]
    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    /// The message kind within the target service.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// The opaque payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Parses a message from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `MessageError::Truncated` if the input is shorter than the
    /// header, or `MessageError::LengthMismatch` if the declared payload
    /// length disagrees with the bytes present.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        ensure!(bytes.len() >= HEADER_LEN, TruncatedSnafu { actual: bytes.len() });

        let service_id = ServiceId::new(u16::from_be_bytes([bytes[0], bytes[1]]));
        let kind = MessageKind::new(u16::from_be_bytes([bytes[2], bytes[3]]));
        let declared = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        let payload = &bytes[HEADER_LEN..];
        ensure!(
            payload.len() == declared as usize,
            LengthMismatchSnafu { declared, actual: payload.len() }
        );

        Ok(Self { service_id, kind, payload: payload.to_vec() })
    }

    /// Encodes the message to its wire representation.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&self.service_id.value().to_be_bytes());
        buf.extend_from_slice(&self.kind.value().to_be_bytes());
        buf.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }
}
