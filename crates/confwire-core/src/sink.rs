//! Change-event sinks.
//!
//! The publisher hands every aggregated event to exactly one
//! [`ChangeEventSink`], synchronously, on the notifier's thread. Fan-out to
//! several listeners is a sink concern ([`FanoutSink`]), as is bridging
//! into async code ([`BroadcastSink`]).

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::errors::{ConfwireError, Result};
use crate::event::AggregatedChangeEvent;

/// Receiver of aggregated change events.
pub trait ChangeEventSink: Send + Sync {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Any error is returned to the caller of `on_batch` unchanged; the
    /// publisher does not retry and does not refresh the source snapshot.
    fn publish(&self, event: AggregatedChangeEvent) -> Result<()>;
}

impl<S: ChangeEventSink + ?Sized> ChangeEventSink for Arc<S> {
    fn publish(&self, event: AggregatedChangeEvent) -> Result<()> {
        (**self).publish(event)
    }
}

/// Sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<AggregatedChangeEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AggregatedChangeEvent> {
        self.events.lock().clone()
    }

    pub fn last(&self) -> Option<AggregatedChangeEvent> {
        self.events.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Take all recorded events, leaving the sink empty.
    pub fn drain(&self) -> Vec<AggregatedChangeEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl ChangeEventSink for CollectingSink {
    fn publish(&self, event: AggregatedChangeEvent) -> Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Sink backed by a closure.
///
/// # Example
/// ```
/// use confwire_core::sink::FnSink;
///
/// let sink = FnSink::new(|event| {
///     println!("{} changed {} keys", event.source_name, event.change_count());
///     Ok(())
/// });
/// # let _ = sink;
/// ```
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F>
where
    F: Fn(AggregatedChangeEvent) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ChangeEventSink for FnSink<F>
where
    F: Fn(AggregatedChangeEvent) -> Result<()> + Send + Sync,
{
    fn publish(&self, event: AggregatedChangeEvent) -> Result<()> {
        (self.f)(event)
    }
}

/// Sink that forwards each event to a list of sinks, in order.
///
/// Delivery stops at the first failing sink and that error is returned;
/// sinks after it do not see the event.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ChangeEventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn ChangeEventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn push(&mut self, sink: Arc<dyn ChangeEventSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ChangeEventSink for FanoutSink {
    fn publish(&self, event: AggregatedChangeEvent) -> Result<()> {
        let Some((last, rest)) = self.sinks.split_last() else {
            return Ok(());
        };
        for sink in rest {
            sink.publish(event.clone())?;
        }
        last.publish(event)
    }
}

/// Sink that forwards events into a `tokio` broadcast channel.
///
/// Sending never blocks, so this is safe to call from the notifier thread.
/// Having no subscribers is not an error: the event is simply dropped.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<AggregatedChangeEvent>,
}

impl BroadcastSink {
    /// Create a sink with a channel of the given capacity.
    ///
    /// Slow subscribers that fall more than `capacity` events behind see
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AggregatedChangeEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ChangeEventSink for BroadcastSink {
    fn publish(&self, event: AggregatedChangeEvent) -> Result<()> {
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        let source_name = event.source_name.clone();
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|e| ConfwireError::sink(source_name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PropertySubset;
    use crate::snapshot::Snapshot;
    use chrono::Utc;
    use confwire_core_types::EventId;
    use std::collections::BTreeMap;

    fn empty_event(source: &str) -> AggregatedChangeEvent {
        AggregatedChangeEvent {
            event_id: EventId::new(),
            source_name: source.to_string(),
            occurred_at: Utc::now(),
            previous: Arc::new(Snapshot::empty(source)),
            added: PropertySubset::added(source, BTreeMap::new()),
            modified: PropertySubset::modified(source, BTreeMap::new()),
            deleted: PropertySubset::deleted(source, BTreeMap::new()),
            ignored_keys: vec![],
        }
    }

    #[test]
    fn test_collecting_sink_drain() {
        let sink = CollectingSink::new();
        sink.publish(empty_event("a")).unwrap();
        sink.publish(empty_event("b")).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.last().unwrap().source_name, "b");

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fanout_delivers_in_order_and_stops_on_error() {
        let first = Arc::new(CollectingSink::new());
        let failing: Arc<dyn ChangeEventSink> =
            Arc::new(FnSink::new(|e: AggregatedChangeEvent| {
                Err(ConfwireError::sink(e.source_name, "listener rejected"))
            }));
        let never = Arc::new(CollectingSink::new());

        let fanout = FanoutSink::new()
            .with(first.clone())
            .with(failing)
            .with(never.clone());

        let err = fanout.publish(empty_event("app")).unwrap_err();
        assert!(matches!(err, ConfwireError::SinkFailed { .. }));
        assert_eq!(first.len(), 1);
        assert!(never.is_empty());
    }

    #[test]
    fn test_empty_fanout_is_ok() {
        assert!(FanoutSink::new().publish(empty_event("app")).is_ok());
    }

    #[test]
    fn test_broadcast_without_receivers_is_ok() {
        let sink = BroadcastSink::new(4);
        assert_eq!(sink.receiver_count(), 0);
        assert!(sink.publish(empty_event("app")).is_ok());
    }

    #[test]
    fn test_broadcast_delivers_to_subscribers() {
        let sink = BroadcastSink::new(4);
        let mut rx = sink.subscribe();
        sink.publish(empty_event("app")).unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.source_name, "app");
    }
}
