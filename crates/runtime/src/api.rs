//! Service API handler registry.
//!
//! The transport layer that actually serves requests lives outside this
//! crate; services register named handlers here and the transport mounts
//! whatever it finds. Handlers take request bytes and return response
//! bytes, keeping this seam free of any HTTP or JSON types.

use std::collections::HashMap;
use std::fmt;

use snafu::Snafu;

/// Errors a handler reports to the transport layer.
#[derive(Debug, Snafu)]
pub enum ApiError {
    /// The request was invalid; maps to a client error response.
    #[snafu(display("Bad request: {message}"))]
    BadRequest {
        /// What was wrong with the request.
        message: String,
    },

    /// The handler failed; maps to a generic server error response.
    #[snafu(display("Internal error: {message}"))]
    Internal {
        /// Failure description.
        message: String,
    },
}

/// Result type for API handlers.
pub type ApiResult = std::result::Result<Vec<u8>, ApiError>;

/// A mounted request handler.
pub type ApiHandler = Box<dyn Fn(&[u8]) -> ApiResult + Send + Sync>;

/// Named handler table a transport can mount.
#[derive(Default)]
pub struct ApiRegistry {
    handlers: HashMap<String, ApiHandler>,
}

impl ApiRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `path`, replacing any previous handler.
    pub fn handle<F>(&mut self, path: &str, handler: F)
    where
        F: Fn(&[u8]) -> ApiResult + Send + Sync + 'static,
    {
        self.handlers.insert(path.to_string(), Box::new(handler));
    }

    /// Looks up the handler mounted under `path`.
    #[must_use]
    pub fn handler(&self, path: &str) -> Option<&ApiHandler> {
        self.handlers.get(path)
    }

    /// Iterates over mounted paths.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Number of mounted handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ApiRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.handlers.keys().collect();
        paths.sort();
        f.debug_struct("ApiRegistry").field("paths", &paths).finish()
    }
}
