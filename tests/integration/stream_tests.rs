//! Framing and protocol failures surfaced through the processor.
//!
//! Framing errors end the message; a bad packet only skips itself.

use protect_events::error::{Error, EventError, FrameError, MalformedReason, PayloadError};
use protect_events::ws::codec::{PayloadFormat, encode_frame};
use protect_events::{EventConfig, UpdateProcessor};
use serde_json::json;

use super::fixtures::{add, envelope, message, update};

fn processor() -> UpdateProcessor {
    UpdateProcessor::new(EventConfig::default()).unwrap()
}

#[test]
fn several_packets_in_one_message_apply_in_order() {
    let mut p = processor();
    let msg = message(
        &[
            (envelope("add", "e"), json!({"type": "motion", "camera": "c", "start": 1, "score": 5})),
            (envelope("update", "e"), json!({"score": 95})),
            (envelope("update", "e"), json!({"end": 1001})),
        ],
        false,
    );

    let out = p.process(&msg, 0).unwrap();
    assert_eq!(out.updates.len(), 3);
    assert!(!out.updates[0].1.event_on);
    assert!(out.updates[1].1.event_on);
    assert!(!out.updates[2].1.event_on);
    assert!((out.updates[2].1.event_length - 1.0).abs() < 1e-9);
}

#[test]
fn truncated_message_is_malformed() {
    let mut p = processor();
    let mut msg = add("e", json!({"camera": "c"}));
    msg.truncate(msg.len() - 1);

    assert_eq!(
        p.process(&msg, 0).unwrap_err(),
        Error::Frame(FrameError::MalformedFrame(MalformedReason::LengthExceedsBuffer))
    );
    assert!(p.machine().is_empty(), "failed message must not touch the store");
}

#[test]
fn unknown_format_is_surfaced() {
    let mut p = processor();
    let mut msg = add("e", json!({"camera": "c"}));
    msg[1] = 4;
    assert_eq!(
        p.process(&msg, 0).unwrap_err(),
        Error::Frame(FrameError::UnknownPayloadFormat(4))
    );
}

#[test]
fn corrupt_compressed_payload_is_decompression_error() {
    let mut p = processor();
    let mut msg = Vec::new();
    msg.extend_from_slice(&[1, 1, 1, 0, 0, 0, 0, 4, 0xde, 0xad, 0xbe, 0xef]);
    encode_frame(2, PayloadFormat::Json, b"{}", false, &mut msg).unwrap();

    assert_eq!(
        p.process(&msg, 0).unwrap_err(),
        Error::Frame(FrameError::DecompressionError)
    );
}

#[test]
fn string_data_frame_is_not_an_event() {
    let mut p = processor();
    let mut msg = Vec::new();
    encode_frame(1, PayloadFormat::Json, envelope("add", "e").to_string().as_bytes(), false, &mut msg)
        .unwrap();
    encode_frame(2, PayloadFormat::Utf8String, b"hello", false, &mut msg).unwrap();

    let out = p.process(&msg, 0).unwrap();
    assert_eq!(
        out.errors,
        [Error::Payload(PayloadError::NotJson(PayloadFormat::Utf8String))]
    );
    assert!(out.updates.is_empty());
    assert!(p.machine().is_empty());
}

#[test]
fn invalid_action_is_surfaced_not_swallowed() {
    let mut p = processor();
    let out = p
        .process(&message(&[(envelope("remove", "e"), json!({"camera": "c"}))], true), 0)
        .unwrap();
    assert_eq!(
        out.errors,
        [Error::Event(EventError::InvalidAction("remove".into()))]
    );
    assert!(out.updates.is_empty());
}

#[test]
fn foreign_model_packet_does_not_hide_following_event() {
    let mut p = processor();
    let camera_packet = (
        json!({"action": "add", "modelKey": "camera", "id": "cam", "newUpdateId": "u"}),
        json!({"name": "Front door"}),
    );
    let event_packet = (
        envelope("add", "e1"),
        json!({"type": "motion", "camera": "c1", "start": 1000, "score": 80}),
    );

    let out = p.process(&message(&[camera_packet, event_packet], true), 2000).unwrap();

    assert_eq!(
        out.errors,
        [Error::Event(EventError::UnsupportedModel("camera".into()))]
    );
    assert_eq!(out.updates.len(), 1);
    assert_eq!(out.updates[0].0, "c1");
    assert!(out.updates[0].1.event_on);
    assert!(p.machine().get("e1").is_some());
}

#[test]
fn framing_error_after_good_packet_keeps_earlier_work() {
    let mut p = processor();
    let mut msg = add("e", json!({"type": "motion", "camera": "c", "start": 1}));
    msg.extend_from_slice(&[1, 1, 0, 0, 0, 0, 0, 99]);

    assert_eq!(
        p.process(&msg, 0).unwrap_err(),
        Error::Frame(FrameError::MalformedFrame(MalformedReason::LengthExceedsBuffer))
    );
    assert!(p.machine().get("e").is_some());
}

#[test]
fn stream_continues_after_a_bad_message() {
    let mut p = processor();
    let _ = p.process(&[1, 2, 3], 0);

    let out = p
        .process(&add("e", json!({"type": "ring", "camera": "c", "start": 1})), 0)
        .unwrap();
    assert_eq!(out.updates.len(), 1);

    let out = p.process(&update("e", json!({"end": 2})), 0).unwrap();
    assert_eq!(out.updates.len(), 1);
}

#[test]
fn system_event_without_camera_is_silently_dropped() {
    let mut p = processor();
    let out = p
        .process(&add("sys", json!({"type": "provision", "partition": null})), 0)
        .unwrap();
    assert!(out.updates.is_empty());
    assert_eq!(p.dropped_count(), 1);
}
