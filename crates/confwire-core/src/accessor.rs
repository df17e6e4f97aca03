//! Property accessor trait and the in-memory implementation.
//!
//! An accessor is bound to exactly one configuration source when it is
//! built (typically a wrapper around the config-center client's cached
//! config for one namespace). The publisher only ever asks it for names and
//! values; how they are fetched is the accessor's business.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::Result;

/// Read access to the current properties of one configuration source.
///
/// Calls are expected to be fast in-memory reads against an already-fetched
/// cache. Implementations must be shareable across notifier threads.
pub trait PropertyAccessor: Send + Sync {
    /// All property names currently present, in the source's own order.
    ///
    /// # Errors
    ///
    /// Returns `ConfwireError::AccessorFailed` when the source cannot be read.
    fn property_names(&self) -> Result<Vec<String>>;

    /// Current value of one property, `None` if it is not present.
    ///
    /// # Errors
    ///
    /// Returns `ConfwireError::AccessorFailed` when the source cannot be read.
    fn property(&self, name: &str) -> Result<Option<Value>>;
}

/// Thread-safe in-memory accessor.
///
/// Useful as a stand-in for a config-center cache: tests and the CLI replay
/// mutate it between batches to model what the client would report.
///
/// # Example
/// ```
/// use confwire_core::accessor::{MapAccessor, PropertyAccessor};
/// use serde_json::json;
///
/// let accessor = MapAccessor::from_pairs([("timeout", json!(30))]);
/// accessor.set("retries", json!(3));
/// assert_eq!(accessor.property_names().unwrap(), vec!["retries", "timeout"]);
/// ```
#[derive(Debug, Default)]
pub struct MapAccessor {
    properties: RwLock<BTreeMap<String, Value>>,
}

impl MapAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let properties = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            properties: RwLock::new(properties),
        }
    }

    /// Insert or overwrite one property, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.properties.write().insert(name.into(), value)
    }

    /// Remove one property, returning its last value.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.properties.write().remove(name)
    }

    /// Swap the whole property set in one step.
    pub fn replace_all(&self, properties: BTreeMap<String, Value>) {
        *self.properties.write() = properties;
    }

    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }
}

impl PropertyAccessor for MapAccessor {
    fn property_names(&self) -> Result<Vec<String>> {
        Ok(self.properties.read().keys().cloned().collect())
    }

    fn property(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.properties.read().get(name).cloned())
    }
}
