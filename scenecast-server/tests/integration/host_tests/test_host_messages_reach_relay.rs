use scenecast_core::{CloseCode, Envelope, SceneId};
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::TestHub;

#[tokio::test]
async fn test_host_offer_is_stamped_with_its_scene() {
    init_tracing();
    let mut hub = TestHub::new();
    let mut relay = hub.relay().await;
    let host = hub.host("plaza", "Fixed", None).await;

    hub.send(
        &host,
        json!({"type": "offer", "sceneId": "somewhere-else", "sdp": "v=0"}),
    )
    .await;

    assert_eq!(
        relay.received(),
        vec![Envelope::Offer {
            scene_id: Some(SceneId::from("plaza")),
            player_id: None,
            sdp: "v=0".into(),
            sfu: false,
        }]
    );
}

#[tokio::test]
async fn test_host_can_kick_viewer() {
    init_tracing();
    let mut hub = TestHub::new();
    let mut host = hub.host("plaza", "Fixed", None).await;
    let (mut viewer, player) = hub.viewer("Fixed", None).await.unwrap();
    host.clear();

    hub.send(
        &host,
        json!({"type": "disconnectPlayer", "playerId": player, "reason": "afk"}),
    )
    .await;

    assert_eq!(viewer.close_code(), Some(CloseCode::KickedByHost));
    assert!(!hub.hub.viewers.contains(&player));
    assert_eq!(
        host.received(),
        vec![Envelope::PlayerGoingAway { player_id: player }]
    );
}

#[tokio::test]
async fn test_failed_host_data_channels_close_viewer() {
    init_tracing();
    let mut hub = TestHub::new();
    let host = hub.host("plaza", "Fixed", None).await;
    let (mut viewer, player) = hub.viewer("Fixed", None).await.unwrap();

    hub.send(
        &host,
        json!({"type": "streamerDataChannelsFailed", "playerId": player}),
    )
    .await;

    assert_eq!(viewer.close_code(), Some(CloseCode::PluginAbnormalClose));
}

#[tokio::test]
async fn test_disconnect_scene_reaches_relay_and_viewers() {
    init_tracing();
    let mut hub = TestHub::new();
    let mut relay = hub.relay().await;
    let host = hub.host("plaza", "Fixed", None).await;
    let (mut viewer, _) = hub.viewer("Fixed", None).await.unwrap();
    relay.clear();
    viewer.clear();

    hub.send(&host, json!({"type": "disconnectScene"})).await;

    let expected = Envelope::DisconnectScene {
        scene_id: Some(SceneId::from("plaza")),
    };
    assert_eq!(relay.received(), vec![expected.clone()]);
    assert_eq!(viewer.received(), vec![expected]);
}
