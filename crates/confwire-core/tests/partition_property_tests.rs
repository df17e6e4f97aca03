#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Property tests for batch partitioning.

use confwire_core::{
    ChangeBatch, ChangeEntry, ChangeKind, ChangePublisher, CollectingSink, MapAccessor,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

fn kind_strategy() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Added),
        Just(ChangeKind::Modified),
        Just(ChangeKind::Deleted),
        Just(ChangeKind::Unknown),
    ]
}

fn entry_strategy() -> impl Strategy<Value = ChangeEntry> {
    ("[a-e]{1,2}", kind_strategy(), any::<i64>())
        .prop_map(|(key, kind, n)| ChangeEntry::with_kind(key, kind, json!(n)))
}

proptest! {
    #[test]
    fn prop_every_key_lands_in_exactly_one_place(
        entries in prop::collection::vec(entry_strategy(), 0..20)
    ) {
        let batch: ChangeBatch = entries.into_iter().collect();

        let sink = Arc::new(CollectingSink::new());
        let publisher = ChangePublisher::new(sink.clone());
        publisher.register("app", Arc::new(MapAccessor::new())).unwrap();
        publisher.on_batch("app", &batch).unwrap();

        let event = sink.last().unwrap();
        prop_assert_eq!(sink.len(), 1);

        let mut seen = BTreeSet::new();
        let places: [(ChangeKind, Vec<(&String, &Value)>); 3] = [
            (ChangeKind::Added, event.added.properties().iter().collect()),
            (ChangeKind::Modified, event.modified.properties().iter().collect()),
            (ChangeKind::Deleted, event.deleted.properties().iter().collect()),
        ];
        for (kind, subset) in &places {
            for (key, value) in subset {
                prop_assert!(seen.insert((*key).clone()), "key {} in two subsets", key);
                let reported = batch.get(key).unwrap();
                prop_assert_eq!(&reported.kind, kind);
                prop_assert_eq!(&reported.new_value, *value);
            }
        }
        for key in &event.ignored_keys {
            prop_assert!(seen.insert(key.clone()), "ignored key {} also in a subset", key);
            prop_assert_eq!(batch.get(key).unwrap().kind, ChangeKind::Unknown);
        }

        let changed: BTreeSet<String> = batch.changed_keys().map(str::to_string).collect();
        prop_assert_eq!(seen, changed);
    }
}
