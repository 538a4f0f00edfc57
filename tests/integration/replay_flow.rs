//! Integration tests for replaying stored requests against a live server

use std::collections::BTreeMap;
use std::time::Duration;

use super::common::{create_test_core, spawn_target, IMAGE_BYTES};
use base64::engine::general_purpose;
use base64::Engine as _;
use posto::{NewNode, NodeUpdate, PostoCore, PostoError, TransportErrorKind};
use serde_json::Value;

fn stored_request(core: &PostoCore, update: NodeUpdate) -> i64 {
    let c = core.create_collection("target").unwrap();
    let id = core.create_node(&NewNode::request(c, None, "req")).unwrap();
    core.update_node(id, &update).unwrap();
    id
}

#[tokio::test]
async fn test_stored_request_replays_with_headers_and_body() {
    let base = spawn_target().await;
    let (core, _dir) = create_test_core();
    let id = stored_request(
        &core,
        NodeUpdate {
            method: Some("PUT".to_string()),
            url: Some(format!("{}/echo", base)),
            headers: Some(BTreeMap::from([
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("Content-Type".to_string(), "text/plain".to_string()),
            ])),
            body: Some("raw body".to_string()),
            ..Default::default()
        },
    );

    let outcome = core.replay_node(id, None).await.unwrap();
    assert_eq!(outcome.status, 200);
    assert!(!outcome.is_binary);

    let echoed: Value = serde_json::from_str(&outcome.body).unwrap();
    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["authorization"], "Bearer abc");
    assert_eq!(echoed["content_type"], "text/plain");
    assert_eq!(echoed["body"], "raw body");
}

#[tokio::test]
async fn test_unset_method_replays_as_get_without_payload() {
    let base = spawn_target().await;
    let (core, _dir) = create_test_core();
    let id = stored_request(
        &core,
        NodeUpdate {
            url: Some(format!("{}/echo", base)),
            body: Some("should not be sent".to_string()),
            ..Default::default()
        },
    );

    let outcome = core.replay_node(id, None).await.unwrap();
    let echoed: Value = serde_json::from_str(&outcome.body).unwrap();
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["content_type"], "application/json");
    assert_eq!(echoed["body"], "");
}

#[tokio::test]
async fn test_binary_response_is_base64() {
    let base = spawn_target().await;
    let (core, _dir) = create_test_core();
    let id = stored_request(
        &core,
        NodeUpdate {
            url: Some(format!("{}/image", base)),
            ..Default::default()
        },
    );

    let outcome = core.replay_node(id, None).await.unwrap();
    assert_eq!(outcome.content_type, "image/png");
    assert!(outcome.is_binary);
    assert_eq!(
        general_purpose::STANDARD.decode(outcome.body).unwrap(),
        IMAGE_BYTES
    );
}

#[tokio::test]
async fn test_slow_target_times_out() {
    let base = spawn_target().await;
    let (core, _dir) = create_test_core();
    let id = stored_request(
        &core,
        NodeUpdate {
            url: Some(format!("{}/slow", base)),
            ..Default::default()
        },
    );

    let err = core
        .replay_node(id, Some(Duration::from_millis(100)))
        .await
        .unwrap_err();
    match err {
        PostoError::Transport(e) => assert_eq!(e.kind, TransportErrorKind::Timeout),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_storage_stays_usable_while_replay_is_in_flight() {
    let base = spawn_target().await;
    let (core, _dir) = create_test_core();
    let slow = stored_request(
        &core,
        NodeUpdate {
            url: Some(format!("{}/slow", base)),
            ..Default::default()
        },
    );

    let replay = core.replay_node(slow, Some(Duration::from_millis(300)));
    let storage = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        core.create_collection("during replay").unwrap();
        core.list_collections().unwrap().len()
    };
    let (replayed, collections) = tokio::join!(replay, storage);

    assert_eq!(collections, 2);
    assert!(matches!(replayed, Err(PostoError::Transport(_))));
}
