//! End-to-end event scenarios: message bytes in, projections out.

use protect_events::events::EventType;
use protect_events::{EventConfig, UpdateProcessor};
use serde_json::json;

use super::fixtures::{CAMERA, add, smart_detect_add, update};

fn processor(minimum_score: i64) -> UpdateProcessor {
    UpdateProcessor::new(EventConfig {
        minimum_score,
        ..EventConfig::default()
    })
    .unwrap()
}

#[test]
fn motion_turns_on_once_score_clears_threshold() {
    let mut p = processor(50);

    let out = p
        .process(
            &add("e1", json!({"type": "motion", "camera": "c1", "start": 1000, "score": 10})),
            2000,
        )
        .unwrap();
    assert_eq!(out.updates.len(), 1);
    assert!(!out.updates[0].1.event_on);

    let out = p.process(&update("e1", json!({"score": 80})), 2000).unwrap();
    let (camera, ev) = &out.updates[0];
    assert_eq!(camera, "c1");
    assert!(ev.event_on);
    assert_eq!(ev.event_score, 80);
    assert_eq!(ev.event_type, Some(EventType::Motion));
}

#[test]
fn motion_end_turns_off_and_sets_length() {
    let mut p = processor(50);
    p.process(
        &add("m", json!({"type": "motion", "camera": "c1", "start": 1_605_421_315_759_i64, "score": 90})),
        0,
    )
    .unwrap();
    assert!(p.camera_state("c1").unwrap().event_on);

    let out = p
        .process(&update("m", json!({"end": 1_605_421_330_342_i64, "score": 46})), 0)
        .unwrap();
    let ev = &out.updates[0].1;
    assert!(!ev.event_on);
    assert!((ev.event_length - 14.583).abs() < 1e-9);
    assert_eq!(ev.event_start.as_deref(), Some("2020-11-15 06:21:55"));
}

#[test]
fn open_ring_is_on_unconditionally() {
    let mut p = processor(50);
    let out = p
        .process(
            &add("e2", json!({"type": "ring", "camera": "c1", "start": 1000})),
            i64::MAX / 2,
        )
        .unwrap();
    assert!(out.updates[0].1.event_ring_on);
    assert!(out.updates[0].1.last_ring.is_some());
}

#[test]
fn finished_ring_honours_trailing_window() {
    let mut p = processor(50);
    p.process(&add("e2", json!({"type": "ring", "camera": "c1", "start": 1000})), 0)
        .unwrap();

    let out = p.process(&update("e2", json!({"end": 1500})), 3500).unwrap();
    assert!(out.updates[0].1.event_ring_on, "ring inside the window stays on");

    let out = p
        .process(&update("e2", json!({"end": 1500})), 1_000_000)
        .unwrap();
    assert!(!out.updates[0].1.event_ring_on, "ring outside the window is off");
}

#[test]
fn ended_smart_detect_reports_objects_regardless_of_score() {
    let mut p = processor(99);
    let mut body = smart_detect_add("sd", 1000, 1);
    body["end"] = json!(2000);

    let out = p.process(&add("sd", body), 0).unwrap();
    let ev = &out.updates[0].1;
    assert_eq!(ev.event_object, ["person"]);
    assert!(!ev.event_on);
}

#[test]
fn smart_detect_lifecycle() {
    let mut p = processor(50);
    let out = p
        .process(&add("sd", smart_detect_add("sd", 1_605_421_197_481, 98)), 0)
        .unwrap();
    assert!(out.updates[0].1.event_on);
    assert_eq!(out.updates[0].1.event_object, ["person"]);
    assert_eq!(out.updates[0].0, CAMERA);

    let out = p
        .process(&update("sd", json!({"end": 1_605_421_366_608_i64, "score": 52})), 0)
        .unwrap();
    assert!(!out.updates[0].1.event_on);
    assert_eq!(out.updates[0].1.event_object, ["person"], "types kept from the add");
}

#[test]
fn thumbnail_survives_later_updates_in_camera_state() {
    let mut p = processor(50);
    p.process(
        &add(
            "t",
            json!({"type": "motion", "camera": "c1", "start": 1000, "score": 70, "thumbnail": "e-t"}),
        ),
        0,
    )
    .unwrap();
    let out = p.process(&update("t", json!({"heatmap": "e-h"})), 0).unwrap();

    assert_eq!(out.updates[0].1.event_thumbnail.as_deref(), Some("e-t"));
    let state = p.camera_state("c1").unwrap();
    assert_eq!(state.event_thumbnail.as_deref(), Some("e-t"));
    assert_eq!(state.event_heatmap.as_deref(), Some("e-h"));
}

#[test]
fn events_for_different_cameras_are_independent() {
    let mut p = processor(50);
    p.process(&add("a", json!({"type": "motion", "camera": "c1", "start": 1, "score": 90})), 0)
        .unwrap();
    p.process(&add("b", json!({"type": "ring", "camera": "c2", "start": 1})), 0)
        .unwrap();

    assert!(p.camera_state("c1").unwrap().event_on);
    assert!(!p.camera_state("c1").unwrap().event_ring_on);
    assert!(p.camera_state("c2").unwrap().event_ring_on);
    assert_eq!(p.cameras().count(), 2);
}
