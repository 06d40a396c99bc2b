use crate::integration::init_tracing;
use crate::utils::{RoomEvent, TestRelay};
use anyhow::Result;
use scenecast_core::{Envelope, PlayerId, SceneId};
use scenecast_relay::{HubNotifier, RoomObserver, StreamPair};

fn scene(id: &str) -> Option<SceneId> {
    Some(SceneId::from(id))
}

async fn publish(relay: &TestRelay, id: &str) -> Result<SceneId> {
    relay
        .service
        .handle(Envelope::Offer {
            scene_id: scene(id),
            player_id: None,
            sdp: "v=0\r\n".to_string(),
            sfu: false,
        })
        .await;
    let scene = SceneId::from(id);
    relay.settle(&scene).await?;
    Ok(scene)
}

async fn join(relay: &TestRelay, scene: &SceneId, player: u32) -> Result<()> {
    relay
        .service
        .handle(Envelope::SceneConnected {
            scene_id: Some(scene.clone()),
            player_id: Some(PlayerId(player)),
        })
        .await;
    relay.settle(scene).await?;
    Ok(())
}

#[tokio::test]
async fn test_offer_creates_room_and_answers() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();

    let scene = publish(&relay, "scene-a").await?;

    assert!(relay.rooms.has_room(&scene));
    assert_eq!(relay.observer.events(), vec![RoomEvent::PublishAnswer { scene }]);
    Ok(())
}

#[tokio::test]
async fn test_viewer_for_missing_room_gets_error() {
    init_tracing();
    let relay = TestRelay::new();

    relay
        .service
        .handle(Envelope::SceneConnected {
            scene_id: scene("nowhere"),
            player_id: Some(PlayerId(3)),
        })
        .await;

    assert_eq!(
        relay.observer.events(),
        vec![RoomEvent::ViewerFailed {
            scene: SceneId::from("nowhere"),
            player: PlayerId(3)
        }]
    );
    assert_eq!(relay.rooms.room_count(), 0);
}

#[tokio::test]
async fn test_scene_disconnected_without_scene_leaves_every_room() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    let a = publish(&relay, "scene-a").await?;
    let b = publish(&relay, "scene-b").await?;
    join(&relay, &a, 5).await?;
    join(&relay, &b, 5).await?;
    join(&relay, &b, 6).await?;

    relay
        .service
        .handle(Envelope::SceneDisconnected {
            scene_id: None,
            player_id: Some(PlayerId(5)),
        })
        .await;

    assert_eq!(relay.settle(&a).await?.viewer_count(), 0);
    let snapshot = relay.settle(&b).await?;
    assert_eq!(snapshot.viewer_count(), 1);
    assert!(snapshot.shard_of(PlayerId(6)).is_some());
    Ok(())
}

#[tokio::test]
async fn test_streamer_disconnected_deletes_rooms() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    let a = publish(&relay, "scene-a").await?;
    let b = publish(&relay, "scene-b").await?;
    join(&relay, &a, 1).await?;

    relay
        .service
        .handle(Envelope::StreamerDisconnected { scene_id: Some(a.clone()) })
        .await;
    assert!(!relay.rooms.has_room(&a));
    assert!(relay.rooms.has_room(&b));

    relay
        .service
        .handle(Envelope::DisconnectScene { scene_id: None })
        .await;
    assert_eq!(relay.rooms.room_count(), 0);
    assert_eq!(relay.engine.live_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_data_channel_requests_reach_room() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    let a = publish(&relay, "scene-a").await?;
    join(&relay, &a, 8).await?;
    relay.observer.clear();

    relay
        .service
        .handle(Envelope::DataChannelRequest {
            scene_id: Some(a.clone()),
            player_id: Some(PlayerId(8)),
        })
        .await;
    relay
        .service
        .handle(Envelope::PeerDataChannelsReady {
            scene_id: None,
            player_id: Some(PlayerId(8)),
        })
        .await;
    relay
        .service
        .handle(Envelope::CloseDataChannelRequest {
            scene_id: Some(a.clone()),
            player_id: Some(PlayerId(8)),
        })
        .await;
    relay.settle(&a).await?;

    let kinds: Vec<&str> = relay
        .observer
        .events()
        .iter()
        .map(|e| match e {
            RoomEvent::PeerDataChannels { .. } => "peer",
            RoomEvent::StreamerDataChannels { .. } => "streamer",
            RoomEvent::DataChannelsClosed { .. } => "closed",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["peer", "streamer", "closed"]);
    assert_eq!(relay.settle(&a).await?.host_slots_in_use, 0);
    Ok(())
}

#[tokio::test]
async fn test_viewer_answer_and_ice_are_accepted() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    let a = publish(&relay, "scene-a").await?;
    join(&relay, &a, 2).await?;

    relay
        .service
        .handle(Envelope::Answer {
            scene_id: Some(a.clone()),
            player_id: Some(PlayerId(2)),
            sdp: "v=0\r\n".to_string(),
        })
        .await;
    relay
        .service
        .handle(Envelope::IceCandidate {
            scene_id: Some(a.clone()),
            player_id: Some(PlayerId(2)),
            candidate: serde_json::json!({ "candidate": "" }),
        })
        .await;
    relay.settle(&a).await?;

    assert_eq!(
        relay
            .observer
            .count(|e| matches!(e, RoomEvent::ViewerFailed { .. })),
        0
    );
    Ok(())
}

#[tokio::test]
async fn test_notifier_speaks_hub_protocol() {
    let (notifier, mut outbox) = HubNotifier::new();
    let a = SceneId::from("scene-a");

    notifier
        .on_viewer_offer(&a, PlayerId(3), "v=0\r\n".to_string())
        .await;
    notifier
        .on_streamer_data_channels(&a, PlayerId(3), StreamPair { send: 1, recv: 2 })
        .await;
    notifier
        .on_viewer_failed(&a, PlayerId(3), "gone".to_string())
        .await;

    let offer = outbox.recv().await.unwrap();
    assert!(matches!(
        offer,
        Envelope::Offer { player_id: Some(PlayerId(3)), sfu: true, .. }
    ));
    let channels = serde_json::to_value(outbox.recv().await.unwrap()).unwrap();
    assert_eq!(channels["type"], "streamerDataChannels");
    assert_eq!(channels["playerId"], "3");
    assert_eq!(channels["sendStreamId"], 1);
    assert_eq!(channels["recvStreamId"], 2);
    let error = outbox.recv().await.unwrap();
    assert_eq!(error.kind(), "error");
    assert_eq!(error.player_id(), Some(PlayerId(3)));
}
