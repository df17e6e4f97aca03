//! Point-in-time property snapshots.
//!
//! A [`Snapshot`] is always a full read of a source, never a patched copy of
//! an older one. Snapshots are immutable once built and are shared by `Arc`
//! between the registry and the events that reference them as "previous".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::accessor::PropertyAccessor;
use crate::errors::Result;

/// Full key/value state of one configuration source at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    source_name: String,
    captured_at: DateTime<Utc>,
    properties: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Build a snapshot from already-read properties.
    pub fn new(source_name: impl Into<String>, properties: BTreeMap<String, Value>) -> Self {
        Self {
            source_name: source_name.into(),
            captured_at: Utc::now(),
            properties,
        }
    }

    /// The snapshot of a source nothing is known about yet.
    pub fn empty(source_name: impl Into<String>) -> Self {
        Self::new(source_name, BTreeMap::new())
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Property names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

/// Read every property the accessor currently reports.
///
/// A name that is listed but has no value by the time it is read (the
/// source changed between the two calls) is stored as null, so the
/// snapshot keys are exactly the listed names.
///
/// # Errors
///
/// Propagates the accessor's error unchanged; no partial snapshot is built.
pub fn read_snapshot(source_name: &str, accessor: &dyn PropertyAccessor) -> Result<Snapshot> {
    let names = accessor.property_names()?;
    let mut properties = BTreeMap::new();
    for name in names {
        let value = accessor.property(&name)?.unwrap_or(Value::Null);
        properties.insert(name, value);
    }
    Ok(Snapshot::new(source_name, properties))
}
