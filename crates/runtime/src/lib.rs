//! Service runtime bridge for the Oxbow engine.
//!
//! The native storage/consensus engine owns every database view and passes
//! this layer nothing but opaque handles. The hard problem is ownership and
//! lifetime correctness across that boundary: a view may be destroyed while
//! derived index objects obtained from it are still reachable, which is a
//! use-after-free hazard no garbage collector can catch because the memory
//! is not managed here. This crate provides:
//!
//! - [`NativeProxy`] - handle-owning proxy with guarded access and
//!   destroy-exactly-once release
//! - [`Snapshot`] / [`Fork`] - the two view variants over a native handle
//! - [`ViewRegistry`] - the child-liveness tracker that invalidates every
//!   index derived from a view when the view is released
//! - [`MapIndex`] / [`ListIndex`] - derived objects that fail with a stale
//!   reference error instead of touching freed native memory
//! - [`ServiceAdapter`] - the single per-service entry point the native
//!   runtime drives
//! - [`ServiceRuntime`] - adapter registry and transaction dispatch

#![deny(unsafe_code)]

mod adapter;
mod api;
mod config;
mod error;
mod indexes;
mod proxy;
mod registry;
mod runtime;
mod service;
mod telemetry;
mod views;

pub use adapter::ServiceAdapter;
pub use api::{ApiError, ApiHandler, ApiRegistry, ApiResult};
pub use config::{ConfigError, RuntimeConfig};
pub use error::{ErrorCode, Result, RuntimeError};
pub use indexes::{ListIndex, ListIndexMut, MapIndex, MapIndexMut};
pub use proxy::NativeProxy;
pub use registry::{IndexLease, ViewRegistry};
pub use runtime::ServiceRuntime;
pub use service::{Service, ServiceError, Transaction};
pub use telemetry::init_logging;
pub use views::{Fork, Snapshot};
