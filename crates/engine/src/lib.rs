//! Native engine boundary for the Oxbow runtime bridge.
//!
//! The storage/consensus engine lives on the other side of this boundary and
//! owns every view and the data behind it. This crate provides:
//!
//! - [`EngineBridge`] - the abstracted native call surface the runtime uses
//! - [`InMemoryEngine`] - an in-process engine for tests and local runs

#![deny(unsafe_code)]

mod bridge;
mod memory;

pub use bridge::{EngineBridge, EngineError, Result};
pub use memory::InMemoryEngine;
