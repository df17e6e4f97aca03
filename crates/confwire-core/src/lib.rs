//! confwire core - config-center change tracking and bootstrap
//!
//! This crate binds a configuration-center client into an application's
//! property pipeline:
//! - Full snapshots of every tracked configuration source
//! - Partitioning of change batches into added/modified/deleted subsets
//! - One aggregated change event per batch, delivered to a pluggable sink
//! - Bootstrap attribute resolution (literal > environment > fallback)
//! - Structured logging and a two-layer error facility

pub mod accessor;
pub mod binding;
pub mod bootstrap;
pub mod change;
pub mod config;
pub mod errors;
pub mod event;
pub mod logging_facility;
pub mod publisher;
pub mod sink;
pub mod snapshot;

/// Shared types, re-exported so the logging macros resolve from any crate.
pub use confwire_core_types as types;

// Re-export commonly used types
pub use accessor::{MapAccessor, PropertyAccessor};
pub use binding::{bind_sources, BindReport, BoundSource};
pub use change::{ChangeBatch, ChangeEntry, ChangeKind};
pub use config::ConfwireConfig;
pub use errors::{ConfwireError, ExError, ExErrorKind, Result};
pub use event::{AggregatedChangeEvent, PropertySubset};
pub use publisher::{
    ChangePublisher, DeletedValuePolicy, ListenerExt, PublisherOptions, SourceListener,
};
pub use sink::{BroadcastSink, ChangeEventSink, CollectingSink, FanoutSink, FnSink};
pub use snapshot::Snapshot;
