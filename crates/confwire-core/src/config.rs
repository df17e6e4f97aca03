//! Top-level configuration file.
//!
//! ```toml
//! [logging]
//! profile = "production"
//!
//! [bootstrap]
//! app_id = "orders"
//! meta = "http://config-meta:8080"
//! namespaces = ["application", "db"]
//!
//! [publisher]
//! deleted_values = "last_known"
//! ```
//!
//! Every section is optional.

use serde::Deserialize;
use std::path::Path;

use crate::bootstrap::BootstrapOptions;
use crate::errors::{ConfwireError, Result};
use crate::logging_facility::Profile;
use crate::publisher::PublisherOptions;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfwireConfig {
    pub logging: LoggingOptions,
    pub bootstrap: BootstrapOptions,
    pub publisher: PublisherOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingOptions {
    pub profile: Profile,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            profile: Profile::Development,
        }
    }
}

impl ConfwireConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigFile` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_file_error = |message: String| ConfwireError::ConfigFile {
            path: path.display().to_string(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_file_error(e.to_string()))?;
        Self::from_toml_str(&text).map_err(|e| config_file_error(e.to_string()))
    }
}
