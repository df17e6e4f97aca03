//! Change batches as delivered by the config-center notifier.
//!
//! A batch is the notifier's view of one detected change: the keys it
//! considers changed, each tagged with a kind and the values it reported.
//! The publisher trusts these values; it does not re-derive them by
//! diffing snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of change reported for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    /// A kind this build does not recognise. Kept so that payloads from a
    /// newer notifier still parse; such entries land in no bucket.
    #[serde(other)]
    Unknown,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "ADDED",
            ChangeKind::Modified => "MODIFIED",
            ChangeKind::Deleted => "DELETED",
            ChangeKind::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub key: String,
    pub kind: ChangeKind,
    /// Value after the change, as reported. For deletions this is whatever
    /// the notifier put there, usually null.
    #[serde(default)]
    pub new_value: Value,
    /// Value before the change, if the notifier reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
}

impl ChangeEntry {
    pub fn added(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            kind: ChangeKind::Added,
            new_value: value,
            old_value: None,
        }
    }

    pub fn modified(key: impl Into<String>, old_value: Option<Value>, new_value: Value) -> Self {
        Self {
            key: key.into(),
            kind: ChangeKind::Modified,
            new_value,
            old_value,
        }
    }

    /// A deletion as most notifiers report it: old value known, new value null.
    pub fn deleted(key: impl Into<String>, old_value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            kind: ChangeKind::Deleted,
            new_value: Value::Null,
            old_value,
        }
    }

    pub fn with_kind(key: impl Into<String>, kind: ChangeKind, new_value: Value) -> Self {
        Self {
            key: key.into(),
            kind,
            new_value,
            old_value: None,
        }
    }
}

/// Ordered set of changed keys delivered in one notification.
///
/// Keys are unique: pushing an entry for a key already present replaces
/// the earlier entry in place, so the last report for a key wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeBatch {
    entries: Vec<ChangeEntry>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ChangeEntry) {
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, entry: ChangeEntry) -> Self {
        self.push(entry);
        self
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&ChangeEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn changed_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ChangeEntry> for ChangeBatch {
    fn from_iter<I: IntoIterator<Item = ChangeEntry>>(iter: I) -> Self {
        let mut batch = ChangeBatch::new();
        for entry in iter {
            batch.push(entry);
        }
        batch
    }
}

impl<'de> Deserialize<'de> for ChangeBatch {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<ChangeEntry>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
