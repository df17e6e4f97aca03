//! Bootstrap attributes for the config-center client.
//!
//! The client reads its app id, meta server, cluster and namespaces from
//! system properties before any configuration source exists. This module
//! resolves those attributes from literal options, the environment and
//! fallback constants, then writes them into a [`SystemProperties`] table
//! without overwriting anything already there.

pub mod options;
pub mod resolver;
pub mod system_properties;

pub use options::{BootstrapOptions, ResolvedBootstrap};
pub use resolver::{ChainResolver, EnvResolver, MapResolver, PropertyResolver};
pub use system_properties::SystemProperties;
