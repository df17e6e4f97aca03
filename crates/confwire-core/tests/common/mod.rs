use confwire_core::errors::{ConfwireError, Result};
use confwire_core::{ChangePublisher, CollectingSink, MapAccessor, PropertyAccessor};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Publisher wired to an in-memory sink
#[allow(dead_code)]
pub fn collecting_publisher() -> (ChangePublisher, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    (ChangePublisher::new(sink.clone()), sink)
}

/// Build an ordered property map from `(name, value)` pairs
#[allow(dead_code)]
pub fn props<const N: usize>(pairs: [(&str, Value); N]) -> BTreeMap<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Map accessor that counts reads and can be switched into a failing state
#[derive(Default)]
pub struct ProbeAccessor {
    inner: MapAccessor,
    reads: AtomicUsize,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl ProbeAccessor {
    pub fn new(initial: BTreeMap<String, Value>) -> Self {
        let inner = MapAccessor::new();
        inner.replace_all(initial);
        Self {
            inner,
            reads: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn map(&self) -> &MapAccessor {
        &self.inner
    }

    /// Number of `property_names` calls seen so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl PropertyAccessor for ProbeAccessor {
    fn property_names(&self) -> Result<Vec<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConfwireError::accessor("probe", "backing cache unavailable"));
        }
        self.inner.property_names()
    }

    fn property(&self, name: &str) -> Result<Option<Value>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConfwireError::accessor("probe", "backing cache unavailable"));
        }
        self.inner.property(name)
    }
}
