//! Property-based tests for credential store mutations.
//!
//! Checks id uniqueness across adds, and that `id`/`createdAt` survive any
//! sequence of updates and moves.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use redblue::database::MemoryKeyValueStore;
use redblue::managers::credential_store::{CredentialStore, CredentialStoreTrait};
use redblue::types::credential::{CredentialPatch, NewCredential, RecordStatus};

fn setup() -> CredentialStore {
    let mut store = CredentialStore::new(Arc::new(MemoryKeyValueStore::new()), "pwdb.v1");
    store.load();
    store
}

fn status_strategy() -> impl Strategy<Value = RecordStatus> {
    prop_oneof![
        Just(RecordStatus::Active),
        Just(RecordStatus::Archived),
        Just(RecordStatus::Trashed),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Update { target: usize, patch: CredentialPatch },
    Move { target: usize, status: RecordStatus },
}

fn patch_strategy() -> impl Strategy<Value = CredentialPatch> {
    (
        proptest::option::of("[a-zA-Z]{0,10}"),
        proptest::option::of("[a-zA-Z]{0,10}"),
        proptest::option::of("[a-zA-Z0-9!]{0,10}"),
        proptest::option::of(".{0,10}"),
        proptest::option::of(proptest::collection::vec("[A-Z][a-z]{0,5}", 0..3)),
        proptest::option::of(status_strategy()),
    )
        .prop_map(|(account, username, secret, details, labels, status)| CredentialPatch {
            account,
            username,
            secret,
            details,
            labels,
            status,
        })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8, patch_strategy()).prop_map(|(target, patch)| Op::Update { target, patch }),
        (0usize..8, status_strategy()).prop_map(|(target, status)| Op::Move { target, status }),
    ]
}

// **Property: uniqueness**
//
// *For any* sequence of `add` calls, no two records share an `id`.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn added_records_have_unique_ids(
        accounts in proptest::collection::vec("[A-Za-z]{1,10}", 1..40),
    ) {
        let mut store = setup();
        for account in &accounts {
            store.add(NewCredential::new(account, "user", "secret")).unwrap();
        }

        let ids: HashSet<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        prop_assert_eq!(ids.len(), accounts.len());
        prop_assert_eq!(store.records().len(), accounts.len());
    }
}

// **Property: identity fields are immutable**
//
// *For any* sequence of updates and moves, every record keeps its `id` and
// `createdAt`, and the collection keeps its order.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn updates_and_moves_keep_identity_fields(
        count in 1usize..8,
        ops in proptest::collection::vec(op_strategy(), 0..30),
    ) {
        let mut store = setup();
        for i in 0..count {
            store.add(NewCredential::new(&format!("acct{i}"), "user", "secret")).unwrap();
        }
        let before: Vec<(String, i64)> =
            store.records().iter().map(|r| (r.id.clone(), r.created_at)).collect();

        for op in ops {
            match op {
                Op::Update { target, patch } => {
                    let id = before[target % count].0.clone();
                    store.update(&id, patch).unwrap();
                }
                Op::Move { target, status } => {
                    let id = before[target % count].0.clone();
                    store.move_to(&id, status).unwrap();
                    prop_assert_eq!(store.get(&id).unwrap().status, status);
                }
            }
        }

        let after: Vec<(String, i64)> =
            store.records().iter().map(|r| (r.id.clone(), r.created_at)).collect();
        prop_assert_eq!(after, before);
    }
}

// **Property: lookup misses change nothing**
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn operations_on_unknown_ids_leave_collection_unchanged(
        count in 0usize..6,
        missing in "[a-z]{1,12}",
        status in status_strategy(),
        patch in patch_strategy(),
    ) {
        let mut store = setup();
        for i in 0..count {
            store.add(NewCredential::new(&format!("acct{i}"), "user", "secret")).unwrap();
        }
        let before = store.snapshot();

        // generated ids are UUIDs, which never match [a-z]{1,12}
        prop_assert!(store.move_to(&missing, status).is_err());
        prop_assert!(store.update(&missing, patch).is_err());
        prop_assert!(store.delete(&missing).is_err());
        let after = store.snapshot();
        prop_assert_eq!(after.as_ref(), before.as_ref());
    }
}
