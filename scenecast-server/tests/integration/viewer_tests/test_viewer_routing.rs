use scenecast_core::{CloseCode, Envelope, PlayerId, SceneId};
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::TestHub;

#[tokio::test]
async fn test_player_id_is_overwritten_with_connection_id() {
    init_tracing();
    let mut hub = TestHub::new();
    let mut relay = hub.relay().await;
    let _host = hub.host("plaza", "Fixed", None).await;
    let (viewer, player) = hub.viewer("Fixed", None).await.unwrap();
    relay.clear();

    hub.send(
        &viewer,
        json!({"type": "answer", "sceneId": "plaza", "playerId": "99", "sdp": "v=0"}),
    )
    .await;

    assert_eq!(
        relay.received(),
        vec![Envelope::Answer {
            scene_id: Some(SceneId::from("plaza")),
            player_id: Some(player),
            sdp: "v=0".into(),
        }]
    );
    assert_ne!(player, PlayerId(99));
}

#[tokio::test]
async fn test_subscribe_becomes_scene_connected() {
    init_tracing();
    let mut hub = TestHub::new();
    let mut relay = hub.relay().await;
    let _host = hub.host("plaza", "Fixed", None).await;
    let (viewer, player) = hub.viewer("Fixed", None).await.unwrap();
    relay.clear();

    hub.send(&viewer, json!({"type": "subscribe", "sceneId": "plaza"}))
        .await;

    assert_eq!(
        relay.received(),
        vec![Envelope::SceneConnected {
            scene_id: Some(SceneId::from("plaza")),
            player_id: Some(player),
        }]
    );
    assert_eq!(
        hub.hub.viewers.attached_to(&SceneId::from("plaza")),
        vec![player]
    );
}

#[tokio::test]
async fn test_subscribe_by_streamer_id_reaches_relay() {
    init_tracing();
    let mut hub = TestHub::new();
    let mut relay = hub.relay().await;
    let _host = hub.host("plaza", "Fixed", None).await;
    let (viewer, player) = hub.viewer("Fixed", None).await.unwrap();
    relay.clear();

    hub.send(&viewer, json!({"type": "subscribe", "streamerId": "plaza"}))
        .await;

    assert_eq!(
        relay.received(),
        vec![Envelope::SceneConnected {
            scene_id: Some(SceneId::from("plaza")),
            player_id: Some(player),
        }]
    );
}

#[tokio::test]
async fn test_subscribe_to_unknown_scene_closes_viewer() {
    init_tracing();
    let mut hub = TestHub::new();
    let _relay = hub.relay().await;
    let _host = hub.host("plaza", "Fixed", None).await;
    let (mut viewer, _) = hub.viewer("Fixed", None).await.unwrap();

    hub.send(&viewer, json!({"type": "subscribe", "sceneId": "nowhere"}))
        .await;

    assert_eq!(viewer.close_code(), Some(CloseCode::HostNotFound));
}

#[tokio::test]
async fn test_list_streamers_before_admission() {
    init_tracing();
    let mut hub = TestHub::new();
    let _b = hub.host("beta", "Fixed", None).await;
    let _a = hub.host("alpha", "Fixed", None).await;

    let mut viewer = hub.connect(scenecast_server::Party::Viewer).await;
    hub.send(&viewer, json!({"type": "listStreamers"})).await;

    assert_eq!(
        viewer.received(),
        vec![Envelope::StreamerList {
            ids: vec![SceneId::from("alpha"), SceneId::from("beta")]
        }]
    );
}

#[tokio::test]
async fn test_unparseable_frame_closes_with_policy_violation() {
    init_tracing();
    let mut hub = TestHub::new();
    let _host = hub.host("plaza", "Fixed", None).await;
    let (mut viewer, _) = hub.viewer("Fixed", None).await.unwrap();

    hub.send_raw(&viewer, "{{{ definitely not json").await;

    assert_eq!(viewer.close_code(), Some(CloseCode::PolicyViolation));
}

#[tokio::test]
async fn test_unknown_type_is_dropped_and_connection_survives() {
    init_tracing();
    let mut hub = TestHub::new();
    let _host = hub.host("plaza", "Fixed", None).await;
    let (mut viewer, _) = hub.viewer("Fixed", None).await.unwrap();
    viewer.clear();

    hub.send(&viewer, json!({"type": "teleport", "x": 1})).await;
    hub.send(&viewer, json!({"type": "ping"})).await;

    assert_eq!(viewer.received(), vec![Envelope::Pong { time: None }]);
    assert_eq!(viewer.close_code(), None);
}

#[tokio::test]
async fn test_frames_before_user_info_are_dropped() {
    init_tracing();
    let mut hub = TestHub::new();
    let mut relay = hub.relay().await;
    let _host = hub.host("plaza", "Fixed", None).await;

    let viewer = hub.connect(scenecast_server::Party::Viewer).await;
    hub.send(&viewer, json!({"type": "subscribe", "sceneId": "plaza"}))
        .await;

    assert!(relay.received().is_empty());
}
