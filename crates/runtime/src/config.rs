//! Runtime configuration.

use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Default port for the public API transport.
const fn default_public_api_port() -> u16 {
    8000
}

/// Default tracing filter directive.
fn default_log_filter() -> String {
    "info".to_string()
}

/// Errors produced by configuration validation.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// A configuration value failed validation.
    #[snafu(display("Invalid configuration: {message}"))]
    Validation {
        /// What failed and why.
        message: String,
    },
}

/// Configuration of the service runtime.
///
/// # Example
///
/// ```no_run
/// # use oxbow_runtime::RuntimeConfig;
/// let config = RuntimeConfig::builder()
///     .public_api_port(8200)
///     .log_filter("oxbow_runtime=debug".to_string())
///     .build();
/// config.validate().expect("valid config");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct RuntimeConfig {
    /// Port the public API transport binds.
    #[serde(default = "default_public_api_port")]
    #[builder(default = default_public_api_port())]
    pub public_api_port: u16,
    /// Port the private API transport binds. `None` disables the private
    /// transport.
    #[serde(default)]
    pub private_api_port: Option<u16>,
    /// Tracing filter directive (e.g. `info`, `oxbow_runtime=debug`).
    #[serde(default = "default_log_filter")]
    #[builder(default = default_log_filter())]
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            public_api_port: default_public_api_port(),
            private_api_port: None,
            log_filter: default_log_filter(),
        }
    }
}

impl RuntimeConfig {
    /// Validate an existing configuration (e.g., after deserialization).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_api_port == 0 {
            return Err(ConfigError::Validation {
                message: "public_api_port must be > 0".to_string(),
            });
        }
        if let Some(port) = self.private_api_port {
            if port == 0 {
                return Err(ConfigError::Validation {
                    message: "private_api_port must be > 0 when set".to_string(),
                });
            }
            if port == self.public_api_port {
                return Err(ConfigError::Validation {
                    message: "private_api_port must differ from public_api_port".to_string(),
                });
            }
        }
        if self.log_filter.is_empty() {
            return Err(ConfigError::Validation {
                message: "log_filter must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
