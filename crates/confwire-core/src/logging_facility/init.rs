//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use serde::Deserialize;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl Profile {
    /// Default filter directive when `RUST_LOG` is unset
    pub fn default_directive(&self) -> &'static str {
        match self {
            Profile::Development => "confwire=debug",
            Profile::Production => "confwire=info",
            Profile::Test => "off",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at process startup. Later calls are ignored, whatever profile
/// they pass. `RUST_LOG` overrides the profile's default filter.
///
/// # Profiles
///
/// - **Development**: Human-readable logs at debug level
/// - **Production**: JSON structured logs at info level
/// - **Test**: Bare registry; capture is installed via `init_test_capture()`
///
/// # Example
///
/// ```
/// use confwire_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
        // A subscriber installed elsewhere (e.g. test capture) wins.
        let _ = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}
