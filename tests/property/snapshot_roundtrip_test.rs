//! Property-based tests for snapshot persistence round-trips.
//!
//! Encoding any valid snapshot and decoding it back, directly or through a
//! store load, must reproduce the same records in the same order, the same
//! labels and the same flags.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use redblue::database::MemoryKeyValueStore;
use redblue::managers::credential_store::{CredentialStore, CredentialStoreTrait};
use redblue::services::persistence::{decode_snapshot, encode_snapshot, LoadOutcome};
use redblue::types::credential::{dedup_labels, CredentialRecord, RecordStatus};
use redblue::types::snapshot::{StoreSnapshot, ThemeMode};

fn status_strategy() -> impl Strategy<Value = RecordStatus> {
    prop_oneof![
        Just(RecordStatus::Active),
        Just(RecordStatus::Archived),
        Just(RecordStatus::Trashed),
    ]
}

fn record_strategy() -> impl Strategy<Value = CredentialRecord> {
    (
        "[a-z0-9-]{1,12}",
        ".{1,20}",
        ".{1,20}",
        ".{1,30}",
        proptest::option::of(".{0,40}"),
        proptest::collection::vec("[A-Za-z]{1,8}", 0..4),
        0i64..4_000_000_000_000,
        status_strategy(),
    )
        .prop_map(|(id, account, username, secret, details, labels, created_at, status)| {
            let labels = dedup_labels(labels);
            CredentialRecord { id, account, username, secret, details, labels, created_at, status }
        })
}

fn snapshot_strategy() -> impl Strategy<Value = StoreSnapshot> {
    (
        proptest::collection::vec(record_strategy(), 0..12),
        proptest::collection::vec("[A-Za-z ]{1,10}", 0..6),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(records, labels, auto_backup_enabled, dark)| {
            // ids and label names must be unique for the snapshot to be valid
            let mut seen = HashSet::new();
            let records = records.into_iter().filter(|r| seen.insert(r.id.clone())).collect();
            StoreSnapshot {
                records,
                labels: dedup_labels(labels),
                auto_backup_enabled,
                theme_mode: if dark { ThemeMode::Dark } else { ThemeMode::Light },
            }
        })
}

// **Property: decode(encode(S)) == S**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn encode_decode_preserves_snapshot(snapshot in snapshot_strategy()) {
        let blob = encode_snapshot(&snapshot).expect("encoding never fails for valid snapshots");
        let decoded = decode_snapshot(&blob).expect("decoding our own blob must succeed");
        prop_assert_eq!(decoded, snapshot);
    }
}

// **Property: load(serialize(S)) == S through the store**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn store_load_reproduces_snapshot(snapshot in snapshot_strategy()) {
        let blob = encode_snapshot(&snapshot).unwrap();
        let kv = Arc::new(MemoryKeyValueStore::with_entry("pwdb.v1", &blob));
        let mut store = CredentialStore::new(kv, "pwdb.v1");

        prop_assert_eq!(store.load(), LoadOutcome::Restored);
        let loaded = store.snapshot();
        prop_assert_eq!(loaded.as_ref(), &snapshot);
    }
}

// **Property: arbitrary text never makes load fail**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn load_of_arbitrary_text_never_panics(raw in ".{0,200}") {
        let kv = Arc::new(MemoryKeyValueStore::with_entry("pwdb.v1", &raw));
        let mut store = CredentialStore::new(kv, "pwdb.v1");
        let outcome = store.load();
        let loaded = store.snapshot();
        match outcome {
            LoadOutcome::Recovered(_) => {
                prop_assert_eq!(loaded.as_ref(), &StoreSnapshot::default())
            }
            LoadOutcome::Restored => {}
            LoadOutcome::Empty => prop_assert!(false, "key was present"),
        }
    }
}

// **Property: decoded label sets never repeat a name**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn decoded_labels_are_unique(
        labels in proptest::collection::vec("[A-C]{1,2}", 0..10),
        record_labels in proptest::collection::vec("[A-C]{1,2}", 0..10),
    ) {
        let blob = serde_json::json!({
            "labels": labels,
            "records": [{
                "id": "a", "account": "x", "username": "u", "secret": "s",
                "createdAt": 1, "labels": record_labels
            }]
        });
        let decoded = decode_snapshot(&blob.to_string()).unwrap();

        let unique: HashSet<&String> = decoded.labels.iter().collect();
        prop_assert_eq!(unique.len(), decoded.labels.len());
        let unique: HashSet<&String> = decoded.records[0].labels.iter().collect();
        prop_assert_eq!(unique.len(), decoded.records[0].labels.len());
        for name in &labels {
            prop_assert!(decoded.labels.contains(name));
        }
    }
}
