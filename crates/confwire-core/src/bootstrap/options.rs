//! Bootstrap options and their resolution.
//!
//! Each attribute resolves as: literal override, then environment value,
//! then fallback constant. Blank literals and blank environment values
//! count as absent.

use confwire_core_types::Sensitive;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;

use super::resolver::PropertyResolver;
use super::system_properties::SystemProperties;
use crate::errors::{ConfwireError, Result};
use crate::{log_op_end, log_op_start};

pub const KEY_APP_ID: &str = "app.id";
pub const KEY_META: &str = "apollo.meta";
pub const KEY_CLUSTER: &str = "apollo.cluster";
pub const KEY_NAMESPACES: &str = "apollo.bootstrap.namespaces";
pub const KEY_ACCESS_KEY_SECRET: &str = "apollo.access-key.secret";

pub const DEFAULT_APP_ID: &str = "default";
pub const DEFAULT_META: &str = "";
pub const DEFAULT_CLUSTER: &str = "default";
pub const DEFAULT_NAMESPACE: &str = "application";
/// Lowest precedence among property sources.
pub const DEFAULT_ORDER: i32 = i32::MAX;
pub const DEFAULT_AUTO_REFRESHED: bool = true;

/// Literal bootstrap overrides, as written in code or a config file.
///
/// # Example
/// ```
/// use confwire_core::bootstrap::{BootstrapOptions, MapResolver};
///
/// let options = BootstrapOptions {
///     app_id: Some("orders".to_string()),
///     ..Default::default()
/// };
/// let env = MapResolver::new()
///     .with("app.id", "ignored")
///     .with("apollo.cluster", "shanghai");
///
/// let resolved = options.resolve(&env);
/// assert_eq!(resolved.app_id, "orders");
/// assert_eq!(resolved.cluster, "shanghai");
/// assert_eq!(resolved.namespaces, vec!["application"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapOptions {
    pub app_id: Option<String>,
    pub meta: Option<String>,
    pub cluster: Option<String>,
    pub namespaces: Option<Vec<String>>,
    pub order: Option<i32>,
    pub auto_refreshed: Option<bool>,
    pub access_key_secret: Option<Sensitive<String>>,
}

/// Fully resolved bootstrap attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBootstrap {
    pub app_id: String,
    /// Comma-separated meta-server URLs; empty when none is configured.
    pub meta: String,
    pub cluster: String,
    pub namespaces: Vec<String>,
    pub order: i32,
    pub auto_refreshed: bool,
    pub access_key_secret: Option<Sensitive<String>>,
}

impl BootstrapOptions {
    /// Parse options from TOML text.
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
        let text = std::fs::read_to_string(path).map_err(|e| ConfwireError::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|e| ConfwireError::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Resolve every attribute against `env`.
    ///
    /// Values are taken as given: a meta server without an `http(s)://`
    /// scheme is logged at warn and still resolved, since the client may
    /// accept it.
    pub fn resolve(&self, env: &dyn PropertyResolver) -> ResolvedBootstrap {
        let app_id = resolve_text(self.app_id.as_deref(), env, KEY_APP_ID, DEFAULT_APP_ID);
        let meta = resolve_text(self.meta.as_deref(), env, KEY_META, DEFAULT_META);
        let cluster = resolve_text(self.cluster.as_deref(), env, KEY_CLUSTER, DEFAULT_CLUSTER);

        let namespaces = self
            .namespaces
            .as_deref()
            .map(clean_namespaces)
            .filter(|ns| !ns.is_empty())
            .or_else(|| {
                env.resolve(KEY_NAMESPACES)
                    .map(|raw| clean_namespaces(&raw.split(',').collect::<Vec<_>>()))
                    .filter(|ns| !ns.is_empty())
            })
            .unwrap_or_else(|| vec![DEFAULT_NAMESPACE.to_string()]);

        let access_key_secret = self
            .access_key_secret
            .as_ref()
            .filter(|s| has_text(s.expose()))
            .cloned()
            .or_else(|| {
                env.resolve(KEY_ACCESS_KEY_SECRET)
                    .filter(|s| has_text(s))
                    .map(Sensitive::new)
            });

        warn_on_unusual_meta(&meta);

        ResolvedBootstrap {
            app_id,
            meta,
            cluster,
            namespaces,
            order: self.order.unwrap_or(DEFAULT_ORDER),
            auto_refreshed: self.auto_refreshed.unwrap_or(DEFAULT_AUTO_REFRESHED),
            access_key_secret,
        }
    }
}

impl ResolvedBootstrap {
    /// Namespaces joined the way the client expects them.
    pub fn namespaces_joined(&self) -> String {
        self.namespaces.join(",")
    }

    /// Write the bootstrap keys into `props`.
    ///
    /// Each key is set only if absent and only when its value has text.
    /// Returns the keys that were written.
    pub fn apply_to(&self, props: &SystemProperties) -> Vec<&'static str> {
        let start = Instant::now();
        log_op_start!("apply_bootstrap", app_id = self.app_id.as_str());

        let namespaces = self.namespaces_joined();
        let mut pairs: Vec<(&'static str, &str)> = vec![
            (KEY_APP_ID, self.app_id.as_str()),
            (KEY_META, self.meta.as_str()),
            (KEY_CLUSTER, self.cluster.as_str()),
            (KEY_NAMESPACES, namespaces.as_str()),
        ];
        if let Some(secret) = &self.access_key_secret {
            pairs.push((KEY_ACCESS_KEY_SECRET, secret.expose().as_str()));
        }

        let written: Vec<&'static str> = pairs
            .into_iter()
            .filter(|(key, value)| props.set_if_absent(key, value))
            .map(|(key, _)| key)
            .collect();

        log_op_end!(
            "apply_bootstrap",
            duration_ms = start.elapsed().as_millis() as u64,
            written = written.len()
        );
        written
    }
}

fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

fn resolve_text(
    literal: Option<&str>,
    env: &dyn PropertyResolver,
    key: &str,
    fallback: &str,
) -> String {
    literal
        .filter(|v| has_text(v))
        .map(str::to_string)
        .or_else(|| env.resolve(key).filter(|v| has_text(v)))
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn clean_namespaces<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|ns| ns.as_ref().trim())
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
        .collect()
}

fn warn_on_unusual_meta(meta: &str) {
    meta.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .filter(|url| !(url.starts_with("http://") || url.starts_with("https://")))
        .for_each(|url| {
            tracing::warn!(key = KEY_META, url = url, "meta server has no http(s) scheme");
        });
}
