//! Environment lookups for bootstrap attributes.

use std::collections::HashMap;

/// Source of environment values, keyed by dotted property name
/// (`app.id`, `apollo.meta`, ...).
pub trait PropertyResolver {
    fn resolve(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
///
/// `app.id` is looked up as `APP_ID`, `apollo.access-key.secret` as
/// `APOLLO_ACCESS_KEY_SECRET`: uppercase, with `.` and `-` mapped to `_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvResolver;

impl EnvResolver {
    pub fn env_var_name(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl PropertyResolver for EnvResolver {
    fn resolve(&self, key: &str) -> Option<String> {
        std::env::var(Self::env_var_name(key)).ok()
    }
}

/// In-memory resolver.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl PropertyResolver for MapResolver {
    fn resolve(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Tries each resolver in order; the first hit wins.
#[derive(Default)]
pub struct ChainResolver {
    resolvers: Vec<Box<dyn PropertyResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl PropertyResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }
}

impl PropertyResolver for ChainResolver {
    fn resolve(&self, key: &str) -> Option<String> {
        self.resolvers.iter().find_map(|r| r.resolve(key))
    }
}
