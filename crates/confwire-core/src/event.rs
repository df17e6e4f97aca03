//! The aggregated change event handed to sinks.
//!
//! One event is built per change batch. It is a single flat value: the
//! three derived property subsets sit side by side instead of being wrapped
//! in per-kind sub-events.

use chrono::{DateTime, Utc};
use confwire_core_types::schema::{SUFFIX_ADDED, SUFFIX_DELETED, SUFFIX_MODIFIED};
use confwire_core_types::EventId;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::snapshot::Snapshot;

/// A named mapping of property name to value derived from one batch.
///
/// Names follow `<source>#added`, `<source>#modified`, `<source>#deleted`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySubset {
    name: String,
    properties: BTreeMap<String, Value>,
}

impl PropertySubset {
    pub fn new(name: impl Into<String>, properties: BTreeMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    pub fn added(source_name: &str, properties: BTreeMap<String, Value>) -> Self {
        Self::new(format!("{}{}", source_name, SUFFIX_ADDED), properties)
    }

    pub fn modified(source_name: &str, properties: BTreeMap<String, Value>) -> Self {
        Self::new(format!("{}{}", source_name, SUFFIX_MODIFIED), properties)
    }

    pub fn deleted(source_name: &str, properties: BTreeMap<String, Value>) -> Self {
        Self::new(format!("{}{}", source_name, SUFFIX_DELETED), properties)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Summary of one change batch for one source.
///
/// `previous` is the snapshot that was current when the batch arrived; it
/// is shared with the registry, not copied. Sinks may keep the event.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedChangeEvent {
    pub event_id: EventId,
    pub source_name: String,
    pub occurred_at: DateTime<Utc>,
    pub previous: Arc<Snapshot>,
    pub added: PropertySubset,
    pub modified: PropertySubset,
    pub deleted: PropertySubset,
    /// Keys whose change kind was not recognised and went to no subset.
    pub ignored_keys: Vec<String>,
}

impl AggregatedChangeEvent {
    /// Total number of keys placed in the three subsets.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }

    /// True when the batch placed nothing in any subset.
    ///
    /// Empty events are still published; deciding to skip them is up to
    /// the sink.
    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }
}
