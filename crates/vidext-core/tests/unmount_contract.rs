//! Contract Test: Unmount
//!
//! Constraints verified:
//! - `unmount()` returns only after every queued write settled
//! - Dropping the controller does not cancel queued writes
//! - The writer reports that it stopped

mod common;

use common::*;
use serde_json::json;
use std::time::Duration;
use vidext_core::{FieldStore, OptionShape, WriteEvent};

#[tokio::test]
async fn unmount_drains_queued_writes() {
    let store = RecordingFieldStore::new();
    let gated = GatedFieldStore::new(store.clone());
    let (mut controller, events) = mount(&gated, OptionShape::Split);

    controller.change_platform("youtube");
    controller.change_video_id("abc");
    controller.change_option("mute", "1");

    let unmount = tokio::spawn(controller.unmount());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!unmount.is_finished(), "unmount waits for gated writes");

    gated.release(4);
    let result = tokio::time::timeout(Duration::from_secs(5), unmount).await;
    assert!(result.is_ok(), "unmount should finish once writes settle");
    result.unwrap().unwrap().unwrap();

    assert_eq!(store.writes().len(), 4);
    assert_eq!(store.get_value("platform"), Some(json!("youtube")));
    assert_eq!(
        store.get_value("youtubeOptions"),
        Some(json!({ "default": {}, "custom": { "mute": "1" } }))
    );

    let seen = collect_events(events).await;
    assert_eq!(seen.last(), Some(&WriteEvent::Stopped { writes_applied: 4 }));
}

#[tokio::test]
async fn dropped_controller_still_completes_writes() {
    let store = RecordingFieldStore::new();
    let gated = GatedFieldStore::new(store.clone());
    let (mut controller, _events) = mount(&gated, OptionShape::Split);

    let pending = controller.change_video_id("kept");
    drop(controller);

    gated.release(1);
    tokio::time::timeout(Duration::from_secs(5), pending.settled())
        .await
        .expect("write settles after drop")
        .expect("write succeeds");

    assert_eq!(store.get_value("videoId"), Some(json!("kept")));
}
