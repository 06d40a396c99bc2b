use crate::integration::init_tracing;
use crate::utils::{RecordingObserver, RoomEvent, TestRelay};
use anyhow::Result;
use scenecast_core::{PlayerId, SceneId};
use scenecast_relay::{FailPoint, MemoryEngine, Room, RoomCommand, RoomSettings};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

// main worker + router + transport + 2 producers, then per shard worker + router + 2 pipes
const PUBLISHED_RESOURCES: usize = 5 + 3 * 4;

#[tokio::test]
async fn test_create_room_is_idempotent() {
    init_tracing();
    let relay = TestRelay::new();
    let scene = SceneId::from("scene-a");

    assert!(relay.rooms.create_room(&scene));
    assert!(!relay.rooms.create_room(&scene));
    assert_eq!(relay.rooms.room_count(), 1);
    assert_eq!(relay.engine.live_count(), 0);
}

#[tokio::test]
async fn test_publish_builds_every_shard() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    let scene = relay.published("scene-a").await?;

    let snapshot = relay.settle(&scene).await?;
    assert_eq!(snapshot.producers, 2);
    assert_eq!(snapshot.shards.len(), 3);
    assert_eq!(relay.engine.live_count(), PUBLISHED_RESOURCES);
    assert_eq!(
        relay.observer.events(),
        vec![RoomEvent::PublishAnswer {
            scene: scene.clone()
        }]
    );
    Ok(())
}

#[tokio::test]
async fn test_republish_rebuilds_room() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    let scene = relay.published("scene-a").await?;
    relay.viewer(&scene, 4).await?;

    let snapshot = relay
        .command(
            &scene,
            RoomCommand::Publish {
                offer: "v=0\r\n".to_string(),
            },
        )
        .await?;

    assert!(snapshot.published);
    assert_eq!(snapshot.viewer_count(), 0);
    assert_eq!(relay.engine.live_count(), PUBLISHED_RESOURCES);
    assert_eq!(
        relay
            .observer
            .count(|e| matches!(e, RoomEvent::PublishAnswer { .. })),
        2
    );
    Ok(())
}

#[tokio::test]
async fn test_republish_reports_dropped_viewers() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    let scene = relay.published("scene-a").await?;
    relay.viewer(&scene, 4).await?;
    relay.viewer(&scene, 5).await?;
    relay.observer.clear();

    relay
        .command(
            &scene,
            RoomCommand::Publish {
                offer: "v=0\r\n".to_string(),
            },
        )
        .await?;

    let events = relay.observer.events();
    assert_eq!(
        &events[..2],
        &[
            RoomEvent::ViewerFailed {
                scene: scene.clone(),
                player: PlayerId(4),
            },
            RoomEvent::ViewerFailed {
                scene: scene.clone(),
                player: PlayerId(5),
            },
        ]
    );
    assert_eq!(events[2], RoomEvent::PublishAnswer { scene });
    Ok(())
}

#[tokio::test]
async fn test_failed_publish_releases_partial_resources() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    relay.engine.fail_on(FailPoint::PipeProducer);
    let scene = SceneId::from("scene-a");
    relay.rooms.create_room(&scene);

    let snapshot = relay
        .command(
            &scene,
            RoomCommand::Publish {
                offer: "v=0\r\n".to_string(),
            },
        )
        .await?;

    assert!(!snapshot.published);
    assert_eq!(relay.engine.live_count(), 0);
    assert!(relay.observer.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_delete_room_releases_everything() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    let scene = relay.published("scene-a").await?;
    for player in 1..=5 {
        relay.viewer(&scene, player).await?;
    }
    relay.open_data_channels(&scene, 2).await?;
    assert!(relay.engine.live_count() > PUBLISHED_RESOURCES);

    assert!(relay.rooms.delete_room(&scene).await);

    assert_eq!(relay.engine.live_count(), 0);
    assert!(!relay.rooms.has_room(&scene));
    assert!(!relay.rooms.delete_room(&scene).await);
    assert!(
        !relay
            .rooms
            .send(&scene, RoomCommand::AddViewer { player: PlayerId(1) })
            .await
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_all_rooms() -> Result<()> {
    init_tracing();
    let relay = TestRelay::new();
    relay.published("scene-a").await?;
    relay.published("scene-b").await?;
    assert_eq!(relay.engine.live_count(), 2 * PUBLISHED_RESOURCES);

    relay.rooms.delete_all_rooms().await;

    assert_eq!(relay.rooms.room_count(), 0);
    assert_eq!(relay.engine.live_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_commands_queued_behind_shutdown_are_ignored() {
    init_tracing();
    let engine = Arc::new(MemoryEngine::new());
    let observer = RecordingObserver::default();
    let (tx, rx) = mpsc::channel(16);
    let room = Room::new(
        SceneId::from("scene-a"),
        engine.clone(),
        Arc::new(observer.clone()),
        RoomSettings::default(),
        rx,
    );

    let (done, finished) = oneshot::channel();
    let (late_done, late_finished) = oneshot::channel();
    tx.send(RoomCommand::Publish {
        offer: "v=0\r\n".to_string(),
    })
    .await
    .unwrap();
    tx.send(RoomCommand::Shutdown { done }).await.unwrap();
    tx.send(RoomCommand::AddViewer { player: PlayerId(3) })
        .await
        .unwrap();
    tx.send(RoomCommand::Shutdown { done: late_done })
        .await
        .unwrap();

    room.run().await;

    assert!(finished.await.is_ok());
    assert!(late_finished.await.is_ok());
    assert_eq!(engine.live_count(), 0);
    assert_eq!(
        observer.events(),
        vec![RoomEvent::PublishAnswer {
            scene: SceneId::from("scene-a")
        }]
    );
    assert!(tx.send(RoomCommand::AddViewer { player: PlayerId(4) }).await.is_err());
}
