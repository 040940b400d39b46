//! Shared behavioural checks every [`SpatialStore`] backend must pass.
//!
//! Backends call [`run_full_compliance`] from their own test module. Each
//! check uses its own key prefix so a shared backend (a live Redis server)
//! can run the whole suite without cross-talk between checks.

use crate::store::{GeoPoint, KM_PER_DEGREE, SpatialStore};

fn km(d: f64) -> f64 {
    d / KM_PER_DEGREE
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

/// Members inside the radius are returned; far members are not.
pub fn assert_radius_contains_near_members(store: &dyn SpatialStore) {
    let key = "compliance:radius:set";
    store.put(key, GeoPoint::new(km(1.0), km(1.0)), "near").unwrap();
    store.put(key, GeoPoint::new(km(2.0), km(0.0)), "edge").unwrap();
    store.put(key, GeoPoint::new(km(50.0), km(50.0)), "far").unwrap();

    let hits = sorted(store.radius(key, GeoPoint::new(0.0, 0.0), 3.0).unwrap());
    assert!(hits.contains(&"near".to_string()), "near member missing: {hits:?}");
    assert!(hits.contains(&"edge".to_string()), "edge member missing: {hits:?}");
    assert!(!hits.contains(&"far".to_string()), "far member returned: {hits:?}");

    store.member_remove(key, "near").unwrap();
    store.member_remove(key, "edge").unwrap();
    store.member_remove(key, "far").unwrap();
}

/// Putting an existing member moves it instead of duplicating it.
pub fn assert_put_moves_member(store: &dyn SpatialStore) {
    let key = "compliance:move:set";
    store.put(key, GeoPoint::new(0.0, 0.0), "m").unwrap();
    store.put(key, GeoPoint::new(km(40.0), km(40.0)), "m").unwrap();

    let at_origin = store.radius(key, GeoPoint::new(0.0, 0.0), 2.0).unwrap();
    assert!(at_origin.is_empty(), "stale position still indexed: {at_origin:?}");

    let at_new = store
        .radius(key, GeoPoint::new(km(40.0), km(40.0)), 2.0)
        .unwrap();
    assert_eq!(at_new, vec!["m".to_string()]);

    store.member_remove(key, "m").unwrap();
}

/// Removed members disappear; removing twice is harmless.
pub fn assert_member_remove(store: &dyn SpatialStore) {
    let key = "compliance:remove:set";
    store.put(key, GeoPoint::new(0.0, 0.0), "a").unwrap();
    store.put(key, GeoPoint::new(0.0, 0.0), "b").unwrap();
    store.member_remove(key, "a").unwrap();
    store.member_remove(key, "a").unwrap();

    let hits = store.radius(key, GeoPoint::new(0.0, 0.0), 1.0).unwrap();
    assert_eq!(hits, vec!["b".to_string()]);

    store.member_remove(key, "b").unwrap();
}

/// Radius queries on unknown keys are empty, not errors.
pub fn assert_unknown_key_is_empty(store: &dyn SpatialStore) {
    let hits = store
        .radius("compliance:missing:set", GeoPoint::new(0.0, 0.0), 100.0)
        .unwrap();
    assert!(hits.is_empty());
}

/// Records round-trip byte for byte and are replaced on write.
pub fn assert_record_lifecycle(store: &dyn SpatialStore) {
    let key = "compliance:record";
    assert_eq!(store.record_get(key).unwrap(), None);

    store.record_set(key, b"first").unwrap();
    assert_eq!(store.record_get(key).unwrap().as_deref(), Some(&b"first"[..]));

    store.record_set(key, &[0, 159, 255]).unwrap();
    assert_eq!(store.record_get(key).unwrap(), Some(vec![0, 159, 255]));

    store.record_delete(key).unwrap();
    assert_eq!(store.record_get(key).unwrap(), None);
    store.record_delete(key).unwrap();
}

/// Spatial sets and records live in separate namespaces.
pub fn assert_sets_and_records_are_independent(store: &dyn SpatialStore) {
    let key = "compliance:split";
    store.record_set(&format!("{key}:record"), b"x").unwrap();
    store.put(&format!("{key}:set"), GeoPoint::new(0.0, 0.0), "m").unwrap();

    store.member_remove(&format!("{key}:set"), "m").unwrap();
    assert_eq!(
        store.record_get(&format!("{key}:record")).unwrap().as_deref(),
        Some(&b"x"[..])
    );

    store.record_delete(&format!("{key}:record")).unwrap();
}

pub fn run_full_compliance(store: &dyn SpatialStore) {
    assert_radius_contains_near_members(store);
    assert_put_moves_member(store);
    assert_member_remove(store);
    assert_unknown_key_is_empty(store);
    assert_record_lifecycle(store);
    assert_sets_and_records_are_independent(store);
}
