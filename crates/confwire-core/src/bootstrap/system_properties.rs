//! Owned system-property table the config-center client is bootstrapped from.

use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Thread-safe key/value table standing in for process-wide system
/// properties. One per application instance.
#[derive(Debug, Default)]
pub struct SystemProperties {
    values: RwLock<BTreeMap<String, String>>,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }

    /// Set `key` to `value` unless the key is already present or `value`
    /// is blank. Returns whether the table changed.
    pub fn set_if_absent(&self, key: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        let mut values = self.values.write();
        if values.contains_key(key) {
            return false;
        }
        values.insert(key.to_string(), value.to_string());
        true
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// Copy of every entry, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.values
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}
