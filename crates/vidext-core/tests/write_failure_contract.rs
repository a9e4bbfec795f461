//! Contract Test: Write Failures Are Surfaced
//!
//! Constraints verified:
//! - Every video id change produces exactly one write of that value
//! - A rejected write keeps the local value (optimistic UI)
//! - The rejection is reported through the handle, the event channel, the
//!   field's sync status and the rendered view
//! - A later successful write clears the reported failure

mod common;

use common::*;
use serde_json::json;
use vidext_core::{Error, FieldSync, OptionShape, WriteEvent};

#[tokio::test]
async fn each_video_id_change_writes_exactly_once() {
    let store = RecordingFieldStore::new();
    let (mut controller, _events) = mount(&store, OptionShape::Split);

    let inputs = ["", "dQw4w9WgXcQ", "  padded  ", "ünïcødé/../?x=1"];
    for input in inputs {
        controller.change_video_id(input).settled().await.unwrap();
        assert_eq!(controller.video_id(), input);
    }

    assert_eq!(
        store.writes_to("videoId"),
        inputs.iter().map(|v| Some(json!(v))).collect::<Vec<_>>()
    );
    assert_eq!(store.writes().len(), inputs.len());

    controller.unmount().await.unwrap();
}

#[tokio::test]
async fn rejected_write_is_reported_everywhere() {
    let store = RecordingFieldStore::new();
    store.fail_field("videoId");
    let (mut controller, events) = mount(&store, OptionShape::Split);

    let result = controller.change_video_id("abc").settled().await;
    assert!(matches!(result, Err(Error::FieldStore(_))), "{:?}", result);

    // Local value is kept
    assert_eq!(controller.video_id(), "abc");

    assert!(controller.sync_status("videoId").is_failed());
    assert_eq!(controller.sync_status("platform"), FieldSync::Idle);

    let view = controller.view();
    assert_eq!(view.sync_errors.len(), 1);
    assert_eq!(view.sync_errors[0].field, "videoId");
    assert!(view.sync_errors[0].error.contains("rejected by host"));

    controller.unmount().await.unwrap();

    let seen = collect_events(events).await;
    assert!(seen.iter().any(|e| matches!(
        e,
        WriteEvent::Failed { field, seq: 1, .. } if field == "videoId"
    )));
    assert_eq!(seen.last(), Some(&WriteEvent::Stopped { writes_applied: 1 }));
}

#[tokio::test]
async fn later_success_clears_failure() {
    let store = RecordingFieldStore::new();
    store.fail_field("videoId");
    let (mut controller, _events) = mount(&store, OptionShape::Split);

    assert!(controller.change_video_id("a").settled().await.is_err());
    assert!(controller.sync_status("videoId").is_failed());

    store.heal_field("videoId");
    controller.change_video_id("ab").settled().await.unwrap();

    assert!(matches!(
        controller.sync_status("videoId"),
        FieldSync::Committed { seq: 2, .. }
    ));
    assert!(controller.view().sync_errors.is_empty());

    controller.unmount().await.unwrap();
}

#[tokio::test]
async fn superseded_failure_stays_pending() {
    let store = RecordingFieldStore::new();
    store.fail_field("videoId");
    let gated = GatedFieldStore::new(store.clone());
    let (mut controller, _events) = mount(&gated, OptionShape::Split);

    let first = controller.change_video_id("a");
    let _second = controller.change_video_id("ab");

    // First write fails while the second is still queued
    gated.release(1);
    assert!(first.settled().await.is_err());
    assert!(controller.sync_status("videoId").is_pending());

    store.heal_field("videoId");
    gated.release(1);
    controller.unmount().await.unwrap();
    assert_eq!(store.writes_to("videoId").len(), 2);
}

#[tokio::test]
async fn failed_option_write_keeps_local_selection() {
    let store = RecordingFieldStore::with_fields([("platform", json!("youtube"))]);
    store.fail_field("youtubeOptions");
    let (mut controller, _events) = mount(&store, OptionShape::Split);

    assert!(controller.change_option("loop", "1").settled().await.is_err());

    let view = controller.view();
    let looped = view.option_selector("loop").expect("loop selector shown");
    assert_eq!(looped.select.selected, "1");
    assert_eq!(view.sync_errors[0].field, "youtubeOptions");

    controller.unmount().await.unwrap();
}
