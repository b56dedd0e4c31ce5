//! Record Store Invariant Tests
//!
//! Covers:
//! - store/get round trip starts at version 1, active
//! - each successful update bumps the version by exactly one
//! - key bindings are permanent, even after soft delete
//! - delete/reactivate preserves the stored value
//! - only the creator or administrator may modify a record
//! - the active counter always matches a scan
//! - the administrator handover scenario

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use keyledger::store::{ActorId, ManualClock, RecordStore, StoreError, StoreEvent};

// =============================================================================
// Test Utilities
// =============================================================================

fn admin() -> ActorId {
    ActorId::new("A")
}

fn user() -> ActorId {
    ActorId::new("U")
}

fn stranger() -> ActorId {
    ActorId::new("V")
}

fn new_store() -> RecordStore {
    RecordStore::new(admin())
}

/// Tiny deterministic generator so mixed sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

// =============================================================================
// Round trip and versioning
// =============================================================================

#[test]
fn test_store_then_get_returns_fresh_record() {
    let mut store = new_store();
    for (i, category) in ["", "cat1", "letters"].iter().enumerate() {
        let key = format!("key-{}", i);
        let value = format!("value-{}", i);
        let id = store
            .store(&user(), &key, &value, category)
            .unwrap()
            .into_value();

        let record = store.get(id).unwrap();
        assert_eq!(record.key, key);
        assert_eq!(record.value, value);
        assert_eq!(record.category, *category);
        assert_eq!(record.creator, user());
        assert_eq!(record.version, 1);
        assert!(record.active);
    }
}

#[test]
fn test_n_updates_yield_version_n_plus_one() {
    let mut store = new_store();
    let id = store.store(&user(), "k", "v0", "").unwrap().into_value();

    for n in 1..=25u64 {
        store.update(&user(), id, &format!("v{}", n)).unwrap();
        assert_eq!(store.get(id).unwrap().version, 1 + n);
    }
    assert_eq!(store.get(id).unwrap().value, "v25");
}

#[test]
fn test_failed_update_does_not_bump_version() {
    let mut store = new_store();
    let id = store.store(&user(), "k", "v", "").unwrap().into_value();

    assert!(store.update(&stranger(), id, "x").is_err());
    assert!(store.update(&user(), id, "").is_err());
    assert_eq!(store.get(id).unwrap().version, 1);
}

#[test]
fn test_update_advances_timestamp() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let mut store = RecordStore::with_clock(admin(), clock.clone());

    let id = store.store(&user(), "k", "v", "").unwrap().into_value();
    clock.advance(Duration::seconds(90));
    let events = store.update(&user(), id, "v2").unwrap().events;

    let record = store.get(id).unwrap();
    assert_eq!(record.last_modified, start + Duration::seconds(90));
    assert_eq!(events[0].timestamp(), record.last_modified);
}

// =============================================================================
// Key permanence
// =============================================================================

#[test]
fn test_bound_key_conflicts_even_when_inactive() {
    let mut store = new_store();
    let id = store.store(&user(), "k", "v", "").unwrap().into_value();

    assert_eq!(
        store.store(&stranger(), "k", "other", ""),
        Err(StoreError::KeyConflict("k".into()))
    );

    store.delete(&user(), id).unwrap();
    assert!(matches!(
        store.store(&user(), "k", "again", ""),
        Err(StoreError::KeyConflict(_))
    ));

    let status = store.key_exists("k");
    assert!(status.exists);
    assert!(!status.is_active);
    assert_eq!(store.all_keys(), vec!["k".to_string()]);
}

#[test]
fn test_rejected_store_does_not_consume_id() {
    let mut store = new_store();
    store.store(&user(), "a", "1", "").unwrap();
    assert!(store.store(&user(), "a", "2", "").is_err());
    assert!(store.store(&user(), "", "2", "").is_err());

    let id = store.store(&user(), "b", "2", "").unwrap().into_value();
    assert_eq!(id, 2);
    assert_eq!(store.total_records(), 2);
}

// =============================================================================
// Soft delete and reactivation
// =============================================================================

#[test]
fn test_delete_then_reactivate_preserves_value() {
    let mut store = new_store();
    let id = store.store(&user(), "k", "v1", "c").unwrap().into_value();
    store.update(&user(), id, "v2").unwrap();

    store.delete(&user(), id).unwrap();
    assert_eq!(store.get(id), Err(StoreError::Inactive(id)));
    assert!(matches!(store.get_by_key("k"), Err(StoreError::Inactive(_))));

    let reactivated = store.reactivate(&admin(), id).unwrap();
    assert!(reactivated.events.is_empty());

    let record = store.get(id).unwrap();
    assert_eq!(record.value, "v2");
    assert_eq!(record.version, 2);
}

#[test]
fn test_only_administrator_reactivates() {
    let mut store = new_store();
    let id = store.store(&user(), "k", "v", "").unwrap().into_value();
    store.delete(&user(), id).unwrap();

    assert!(matches!(
        store.reactivate(&user(), id),
        Err(StoreError::Unauthorized(_))
    ));
    store.reactivate(&admin(), id).unwrap();
    assert_eq!(
        store.reactivate(&admin(), id),
        Err(StoreError::AlreadyActive(id))
    );
}

#[test]
fn test_metadata_survives_delete() {
    let mut store = new_store();
    let id = store.store(&user(), "k", "v", "cat").unwrap().into_value();
    store.delete(&admin(), id).unwrap();

    let meta = store.record_metadata(id).unwrap();
    assert_eq!(meta.creator, user());
    assert_eq!(meta.category, "cat");
    assert_eq!(meta.version, 1);
}

// =============================================================================
// Authorization
// =============================================================================

#[test]
fn test_only_creator_or_admin_modify() {
    let mut store = new_store();
    let id = store.store(&user(), "k", "v", "").unwrap().into_value();

    assert!(matches!(
        store.update(&stranger(), id, "x"),
        Err(StoreError::Unauthorized(_))
    ));
    assert!(matches!(
        store.delete(&stranger(), id),
        Err(StoreError::Unauthorized(_))
    ));
    assert_eq!(store.get(id).unwrap().value, "v");

    store.update(&admin(), id, "by-admin").unwrap();
    store.update(&user(), id, "by-creator").unwrap();
    assert_eq!(store.get(id).unwrap().version, 3);
}

#[test]
fn test_transferred_admin_gains_and_loses_rights() {
    let mut store = new_store();
    let id = store.store(&user(), "k", "v", "").unwrap().into_value();

    let events = store
        .transfer_ownership(&admin(), &stranger())
        .unwrap()
        .events;
    assert!(matches!(
        &events[0],
        StoreEvent::OwnershipTransferred { previous_admin, new_admin, .. }
            if *previous_admin == admin() && *new_admin == stranger()
    ));

    assert!(matches!(
        store.delete(&admin(), id),
        Err(StoreError::Unauthorized(_))
    ));
    store.delete(&stranger(), id).unwrap();
    assert_eq!(store.stats().administrator, stranger());
}

// =============================================================================
// Active counter
// =============================================================================

#[test]
fn test_active_count_matches_scan_for_mixed_sequence() {
    let mut store = new_store();
    let mut rng = Lcg(7);
    let actors = [admin(), user(), stranger()];

    for step in 0..400 {
        let actor = &actors[rng.next(3) as usize];
        let total = store.total_records();
        match rng.next(4) {
            0 | 1 => {
                let _ = store.store(actor, &format!("k{}", step), "v", "");
            }
            2 if total > 0 => {
                let _ = store.delete(actor, 1 + rng.next(total));
            }
            3 if total > 0 => {
                let _ = store.reactivate(actor, 1 + rng.next(total));
            }
            _ => {
                let keys = vec![format!("b{}", step), format!("c{}", step)];
                let values = vec!["1".to_string(), "2".to_string()];
                let _ = store.bulk_store(actor, &keys, &values, "bulk");
            }
        }

        assert_eq!(
            store.active_record_count(),
            store.active_records().len() as u64,
            "active counter drifted at step {}",
            step
        );
    }
    store.state().verify().unwrap();
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_administrator_user_stranger_scenario() {
    let mut store = new_store();

    let id = store.store(&user(), "k1", "v1", "cat1").unwrap().into_value();
    assert_eq!(id, 1);
    let record = store.get(1).unwrap();
    assert_eq!(record.version, 1);
    assert!(record.active);

    store.update(&user(), 1, "v2").unwrap();
    let record = store.get(1).unwrap();
    assert_eq!(record.version, 2);
    assert_eq!(record.value, "v2");

    assert!(matches!(
        store.delete(&stranger(), 1),
        Err(StoreError::Unauthorized(_))
    ));
    let record = store.get(1).unwrap();
    assert!(record.active);
    assert_eq!(record.version, 2);

    store.delete(&admin(), 1).unwrap();
    assert!(!store.state().record(1).unwrap().active);

    assert!(matches!(
        store.store(&user(), "k1", "v3", "cat1"),
        Err(StoreError::KeyConflict(_))
    ));
    assert_eq!(store.user_records(&user()), vec![1]);
    assert_eq!(store.records_by_category("cat1"), vec![1]);
}
