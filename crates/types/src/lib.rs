//! Core types for the Oxbow runtime bridge.
//!
//! This crate provides the foundational types shared by the engine boundary
//! and the service runtime:
//! - Identifier newtypes (`Handle`, `ServiceId`, `MessageKind`)
//! - Cryptographic hashing (SHA-256)
//! - Centralized postcard codec
//! - The transaction wire message and its routing header

#![deny(unsafe_code)]

pub mod codec;
pub mod hash;
pub mod ids;
pub mod message;

// Re-export commonly used types at crate root
pub use codec::{CodecError, decode, encode};
pub use hash::{EMPTY_HASH, Hash, hash_eq, sha256, sha256_concat};
pub use ids::{Handle, MessageKind, ServiceId};
pub use message::{BinaryMessage, HEADER_LEN, MessageError};
