//! Snapshot diff and change publisher.
//!
//! [`ChangePublisher`] keeps the last full snapshot of every registered
//! configuration source. For each change batch the notifier delivers, it
//! partitions the batch into added/modified/deleted subsets, publishes one
//! [`AggregatedChangeEvent`] to its sink, and then re-reads the whole source
//! to replace the retained snapshot.
//!
//! ## Guarantees
//!
//! - **One event per batch**: every successful partition yields exactly one
//!   publish, including for an empty batch.
//! - **Full re-snapshot**: after `on_batch` returns `Ok`, the retained
//!   snapshot is exactly what the accessor reported during the re-read.
//! - **Stale but consistent on failure**: if the sink or the accessor
//!   fails, the previous snapshot stays current and the error propagates.
//! - **Per-source isolation**: a batch for one source never reads or writes
//!   another source's entry. No registry lock is held while the sink runs
//!   or during the post-publish re-read, so a sink may call back into the
//!   publisher. The initial read in `register` does run under the entry
//!   lock (compute-if-absent), so accessors must not re-enter there.
//!
//! A single source must not be driven by two threads at once; batches for
//! different sources may run concurrently.

use chrono::Utc;
use confwire_core_types::EventId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::accessor::PropertyAccessor;
use crate::change::{ChangeBatch, ChangeKind};
use crate::errors::{ConfwireError, Result};
use crate::event::{AggregatedChangeEvent, PropertySubset};
use crate::sink::ChangeEventSink;
use crate::snapshot::{read_snapshot, Snapshot};
use crate::{log_op_end, log_op_error, log_op_start};

/// Which value a deleted key carries in the `#deleted` subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletedValuePolicy {
    /// The `new_value` the notifier reported, unchanged (often null).
    #[default]
    Reported,
    /// The value the key had before deletion: the reported `old_value`,
    /// else the previous snapshot's value, else the reported `new_value`.
    LastKnown,
}

/// Publisher tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublisherOptions {
    pub deleted_values: DeletedValuePolicy,
}

#[derive(Clone)]
struct TrackedSource {
    accessor: Arc<dyn PropertyAccessor>,
    snapshot: Arc<Snapshot>,
}

/// Registry of tracked sources plus the sink their events go to.
///
/// Owned by the hosting application; create one per application instance.
pub struct ChangePublisher {
    sources: DashMap<String, TrackedSource>,
    sink: Arc<dyn ChangeEventSink>,
    options: PublisherOptions,
}

impl ChangePublisher {
    pub fn new(sink: Arc<dyn ChangeEventSink>) -> Self {
        Self::with_options(sink, PublisherOptions::default())
    }

    pub fn with_options(sink: Arc<dyn ChangeEventSink>, options: PublisherOptions) -> Self {
        Self {
            sources: DashMap::new(),
            sink,
            options,
        }
    }

    pub fn options(&self) -> &PublisherOptions {
        &self.options
    }

    /// Begin tracking `source_name`, capturing its initial snapshot.
    ///
    /// First registration wins: if the name is already tracked this is a
    /// no-op, `accessor` is never read, and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Propagates an accessor failure during the initial read; the source
    /// is then left unregistered.
    pub fn register(
        &self,
        source_name: &str,
        accessor: Arc<dyn PropertyAccessor>,
    ) -> Result<bool> {
        let start = Instant::now();
        log_op_start!("register", source = source_name);

        // The initial read happens under the entry guard so that two racing
        // registrations cannot both install a snapshot.
        let result = match self.sources.entry(source_name.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                read_snapshot(source_name, accessor.as_ref()).map(|snapshot| {
                    vacant.insert(TrackedSource {
                        accessor,
                        snapshot: Arc::new(snapshot),
                    });
                    true
                })
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(inserted) => {
                log_op_end!(
                    "register",
                    duration_ms = duration_ms,
                    source = source_name,
                    inserted = *inserted
                );
            }
            Err(err) => {
                log_op_error!(
                    "register",
                    err.clone(),
                    duration_ms = duration_ms,
                    source = source_name
                );
            }
        }
        result
    }

    /// Process one change batch for a registered source.
    ///
    /// # Errors
    ///
    /// - `SourceNotRegistered` if `source_name` was never registered; nothing
    ///   is published.
    /// - Any sink error, with the snapshot left unchanged.
    /// - Any accessor error from the re-read, with the snapshot left unchanged
    ///   (the event has already been published).
    pub fn on_batch(&self, source_name: &str, batch: &ChangeBatch) -> Result<()> {
        let accessor = self
            .sources
            .get(source_name)
            .map(|tracked| tracked.accessor.clone());
        match accessor {
            Some(accessor) => self.on_batch_with(source_name, &accessor, batch),
            None => {
                let start = Instant::now();
                log_op_start!("on_batch", source = source_name, changed = batch.len());
                let err = ConfwireError::SourceNotRegistered {
                    source_name: source_name.to_string(),
                };
                log_op_error!(
                    "on_batch",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    source = source_name
                );
                Err(err)
            }
        }
    }

    /// Process one change batch using an explicitly supplied accessor.
    ///
    /// If no snapshot is retained for `source_name`, the previous snapshot is
    /// empty. On success the source is tracked with `accessor` from then on,
    /// replacing any accessor it was registered with, so the retained
    /// snapshot and later re-reads always come from the same accessor.
    ///
    /// # Errors
    ///
    /// Same as [`on_batch`](Self::on_batch), minus `SourceNotRegistered`.
    pub fn on_batch_with(
        &self,
        source_name: &str,
        accessor: &Arc<dyn PropertyAccessor>,
        batch: &ChangeBatch,
    ) -> Result<()> {
        let start = Instant::now();
        log_op_start!("on_batch", source = source_name, changed = batch.len());

        let result = self.process(source_name, accessor, batch);

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(summary) => {
                log_op_end!(
                    "on_batch",
                    duration_ms = duration_ms,
                    source = source_name,
                    event_id = summary.event_id.as_str(),
                    added = summary.added,
                    modified = summary.modified,
                    deleted = summary.deleted,
                    ignored = summary.ignored
                );
            }
            Err(err) => {
                log_op_error!(
                    "on_batch",
                    err.clone(),
                    duration_ms = duration_ms,
                    source = source_name
                );
            }
        }
        result.map(|_| ())
    }

    // The event itself moves into the sink; the summary is kept for logging.
    fn process(
        &self,
        source_name: &str,
        accessor: &Arc<dyn PropertyAccessor>,
        batch: &ChangeBatch,
    ) -> Result<EventSummary> {
        let previous = self
            .snapshot(source_name)
            .unwrap_or_else(|| Arc::new(Snapshot::empty(source_name)));

        let event = self.build_event(source_name, previous, batch);
        let summary = EventSummary::of(&event);

        self.sink.publish(event)?;

        let current = read_snapshot(source_name, accessor.as_ref())?;
        self.install(source_name, accessor, current);

        Ok(summary)
    }

    fn build_event(
        &self,
        source_name: &str,
        previous: Arc<Snapshot>,
        batch: &ChangeBatch,
    ) -> AggregatedChangeEvent {
        let mut added = BTreeMap::new();
        let mut modified = BTreeMap::new();
        let mut deleted = BTreeMap::new();
        let mut ignored_keys = Vec::new();

        for entry in batch.entries() {
            match entry.kind {
                ChangeKind::Added => {
                    added.insert(entry.key.clone(), entry.new_value.clone());
                }
                ChangeKind::Modified => {
                    modified.insert(entry.key.clone(), entry.new_value.clone());
                }
                ChangeKind::Deleted => {
                    let value = self.deleted_value(
                        &previous,
                        &entry.key,
                        &entry.new_value,
                        entry.old_value.as_ref(),
                    );
                    deleted.insert(entry.key.clone(), value);
                }
                ChangeKind::Unknown => {
                    tracing::warn!(
                        source = source_name,
                        key = entry.key.as_str(),
                        "ignoring change with unrecognised kind"
                    );
                    ignored_keys.push(entry.key.clone());
                }
            }
        }

        AggregatedChangeEvent {
            event_id: EventId::new(),
            source_name: source_name.to_string(),
            occurred_at: Utc::now(),
            previous,
            added: PropertySubset::added(source_name, added),
            modified: PropertySubset::modified(source_name, modified),
            deleted: PropertySubset::deleted(source_name, deleted),
            ignored_keys,
        }
    }

    fn deleted_value(
        &self,
        previous: &Snapshot,
        key: &str,
        reported: &Value,
        old_value: Option<&Value>,
    ) -> Value {
        match self.options.deleted_values {
            DeletedValuePolicy::Reported => reported.clone(),
            DeletedValuePolicy::LastKnown => old_value
                .or_else(|| previous.get(key))
                .unwrap_or(reported)
                .clone(),
        }
    }

    fn install(
        &self,
        source_name: &str,
        accessor: &Arc<dyn PropertyAccessor>,
        snapshot: Snapshot,
    ) {
        let snapshot = Arc::new(snapshot);
        match self.sources.entry(source_name.to_string()) {
            Entry::Occupied(mut occupied) => {
                let tracked = occupied.get_mut();
                tracked.accessor = accessor.clone();
                tracked.snapshot = snapshot;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(TrackedSource {
                    accessor: accessor.clone(),
                    snapshot,
                });
            }
        }
    }

    /// The retained snapshot for `source_name`, if tracked.
    pub fn snapshot(&self, source_name: &str) -> Option<Arc<Snapshot>> {
        self.sources
            .get(source_name)
            .map(|tracked| tracked.snapshot.clone())
    }

    pub fn is_registered(&self, source_name: &str) -> bool {
        self.sources.contains_key(source_name)
    }

    /// Tracked source names, sorted.
    pub fn source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Handle a notifier callback holds for one source.
#[derive(Clone)]
pub struct SourceListener {
    publisher: Arc<ChangePublisher>,
    source_name: String,
}

impl SourceListener {
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Forward one batch to the publisher.
    ///
    /// # Errors
    ///
    /// See [`ChangePublisher::on_batch`].
    pub fn on_batch(&self, batch: &ChangeBatch) -> Result<()> {
        self.publisher.on_batch(&self.source_name, batch)
    }
}

/// Listener creation needs the publisher behind an `Arc`, since the handle
/// outlives the call that creates it.
pub trait ListenerExt {
    /// A listener for `source_name`, or `None` if it is not registered.
    fn listener(&self, source_name: &str) -> Option<SourceListener>;
}

impl ListenerExt for Arc<ChangePublisher> {
    fn listener(&self, source_name: &str) -> Option<SourceListener> {
        self.is_registered(source_name).then(|| SourceListener {
            publisher: Arc::clone(self),
            source_name: source_name.to_string(),
        })
    }
}

struct EventSummary {
    event_id: EventId,
    added: usize,
    modified: usize,
    deleted: usize,
    ignored: usize,
}

impl EventSummary {
    fn of(event: &AggregatedChangeEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            added: event.added.len(),
            modified: event.modified.len(),
            deleted: event.deleted.len(),
            ignored: event.ignored_keys.len(),
        }
    }
}
