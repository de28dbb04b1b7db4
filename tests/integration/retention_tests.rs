//! Retention bound and out-of-order delivery.

use protect_events::{EventConfig, MAX_RETAINED, UpdateProcessor};
use serde_json::json;

use super::fixtures::{add, update};

#[test]
fn default_bound_is_two_per_supported_camera() {
    let p = UpdateProcessor::new(EventConfig::default()).unwrap();
    assert_eq!(MAX_RETAINED, 512);
    assert_eq!(p.machine().capacity(), MAX_RETAINED);
}

#[test]
fn store_never_exceeds_bound() {
    let mut p = UpdateProcessor::new(EventConfig::default()).unwrap();
    for i in 0..(MAX_RETAINED + 10) {
        p.process(&add(&format!("e{i}"), json!({"type": "motion", "camera": "c"})), 0)
            .unwrap();
    }
    assert_eq!(p.machine().len(), MAX_RETAINED);
    assert!(p.machine().get("e9").is_none());
    assert!(p.machine().get("e10").is_some());
}

#[test]
fn update_for_evicted_event_is_dropped() {
    let mut p = UpdateProcessor::new(EventConfig {
        max_retained: 2,
        ..EventConfig::default()
    })
    .unwrap();

    for id in ["a", "b", "c"] {
        p.process(&add(id, json!({"type": "motion", "camera": "cam", "start": 1})), 0)
            .unwrap();
    }

    let out = p.process(&update("a", json!({"end": 2})), 0).unwrap();
    assert!(out.updates.is_empty());
    assert!(p.machine().get("a").is_none());
    assert_eq!(p.machine().event_ids().collect::<Vec<_>>(), ["b", "c"]);
}

#[test]
fn update_before_add_is_dropped_without_fabrication() {
    let mut p = UpdateProcessor::new(EventConfig::default()).unwrap();
    let out = p
        .process(&update("late", json!({"end": 10, "score": 99})), 0)
        .unwrap();
    assert!(out.updates.is_empty());
    assert!(p.machine().is_empty());

    let out = p
        .process(&add("late", json!({"type": "motion", "camera": "c", "start": 1})), 0)
        .unwrap();
    assert_eq!(out.updates[0].1.event_score, 0, "nothing from the early update leaked in");
}

#[test]
fn updates_do_not_refresh_eviction_order() {
    let mut p = UpdateProcessor::new(EventConfig {
        max_retained: 2,
        ..EventConfig::default()
    })
    .unwrap();

    p.process(&add("old", json!({"camera": "c"})), 0).unwrap();
    p.process(&add("mid", json!({"camera": "c"})), 0).unwrap();
    p.process(&update("old", json!({"score": 1})), 0).unwrap();
    p.process(&add("new", json!({"camera": "c"})), 0).unwrap();

    assert!(p.machine().get("old").is_none());
}
