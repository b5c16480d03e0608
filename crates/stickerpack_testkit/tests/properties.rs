//! Ordering invariants over random edit sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use stickerpack_core::{
    CollectionEngine, EmptySetPolicy, EntityId, EntityStore, ObserveTarget, SlotLayout,
    StoreConfig,
};
use stickerpack_storage::InMemoryBackend;
use stickerpack_testkit::prelude::*;

fn tags(store: &EntityStore, set: EntityId) -> Vec<String> {
    store
        .members(set)
        .unwrap()
        .iter()
        .map(|s| s.emoji_tag())
        .collect()
}

fn assert_members_consistent(store: &EntityStore, set: EntityId) {
    let record = store.set(set).unwrap();
    let unique: HashSet<&EntityId> = record.stickers().iter().collect();
    assert_eq!(unique.len(), record.len(), "duplicate member");
    for id in record.stickers() {
        assert_eq!(store.sticker(*id).unwrap().set(), set);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn engine_matches_list_model(ops in edit_ops_strategy(40), leading_slot in any::<bool>()) {
        let layout = if leading_slot { SlotLayout::LeadingAddSlot } else { SlotLayout::Plain };
        let engine = CollectionEngine::new()
            .with_policy(EmptySetPolicy::KeepEmpty)
            .with_layout(layout);
        let mut store = EntityStore::open_in_memory().unwrap();
        let set = store.create_set();
        let mut model: Vec<String> = Vec::new();

        for op in &ops {
            apply_op(&engine, &mut store, set, op, &[7, 7, 7]).unwrap();
            apply_op_to_model(&mut model, op);
            assert_members_consistent(&store, set);
            prop_assert_eq!(tags(&store, set), model.clone());
        }
    }

    #[test]
    fn observer_diffs_replay_committed_order(ops in edit_ops_strategy(40)) {
        let engine = CollectionEngine::new().with_policy(EmptySetPolicy::KeepEmpty);
        let mut store = EntityStore::open_in_memory().unwrap();
        let set = store.create_set();
        store.commit().unwrap();

        let mirror: Arc<Mutex<Vec<EntityId>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&mirror);
        store.observe(ObserveTarget::Members(set), move |diff| {
            let mut list = sink.lock().unwrap();
            let next = diff.apply(&list);
            *list = next;
        });

        for op in &ops {
            apply_op(&engine, &mut store, set, op, &[7, 7, 7]).unwrap();
            if matches!(op, EditOp::Commit) {
                let committed = store.set(set).unwrap().stickers().to_vec();
                prop_assert_eq!(mirror.lock().unwrap().clone(), committed);
            }
        }

        store.commit().unwrap();
        let committed = store.set(set).unwrap().stickers().to_vec();
        prop_assert_eq!(mirror.lock().unwrap().clone(), committed);
    }

    #[test]
    fn reopen_recovers_committed_state(ops in edit_ops_strategy(30), compact in any::<bool>()) {
        let backend = InMemoryBackend::new();
        let config = StoreConfig::default().sync_on_commit(false).compact_threshold(0);
        let engine = CollectionEngine::new().with_policy(EmptySetPolicy::KeepEmpty);

        let mut store = EntityStore::open(config.clone(), Box::new(backend.clone())).unwrap();
        let set = store.create_set();
        for op in &ops {
            apply_op(&engine, &mut store, set, op, &[7, 7, 7]).unwrap();
        }
        store.commit().unwrap();
        if compact {
            store.compact().unwrap();
        }
        let expected = tags(&store, set);
        let sequence = store.sequence();
        drop(store);

        let reopened = EntityStore::open(config, Box::new(backend)).unwrap();
        prop_assert_eq!(reopened.sequence(), sequence);
        prop_assert_eq!(tags(&reopened, set), expected);
        assert_members_consistent(&reopened, set);
    }
}

#[test]
fn removing_every_member_deletes_set_by_default() {
    let mut store = TestStore::memory();
    let set = set_with_stickers(&mut store, 4);
    let engine = CollectionEngine::for_config(store.config());

    for remaining in (1..=4).rev() {
        let removal = engine.remove_at(&mut store, set, 0).unwrap();
        assert_eq!(removal.set_deleted, remaining == 1);
    }
    store.commit().unwrap();

    assert!(store.set(set).is_none());
    assert!(store.query(Default::default()).is_empty());
}
