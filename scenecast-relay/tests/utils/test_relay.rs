use super::RecordingObserver;
use anyhow::{Context, Result, ensure};
use scenecast_core::{PlayerId, SceneId};
use scenecast_relay::{
    MemoryEngine, RelayEngine, RelayService, RoomCommand, RoomManager, RoomObserver, RoomSettings,
    RoomSnapshot,
};
use std::sync::Arc;

/// Room manager over an in-memory engine, with every notification recorded.
pub struct TestRelay {
    pub engine: Arc<MemoryEngine>,
    pub observer: RecordingObserver,
    pub rooms: RoomManager,
    pub service: RelayService,
}

impl TestRelay {
    pub fn new() -> Self {
        Self::with_settings(RoomSettings::default())
    }

    pub fn with_settings(settings: RoomSettings) -> Self {
        let engine = Arc::new(MemoryEngine::new());
        let observer = RecordingObserver::default();
        let shared: Arc<dyn RoomObserver> = Arc::new(observer.clone());
        let rooms = RoomManager::new(engine.clone() as Arc<dyn RelayEngine>, shared.clone(), settings);
        let service = RelayService::new(rooms.clone(), shared);
        Self {
            engine,
            observer,
            rooms,
            service,
        }
    }

    /// Waits until every command queued on the room so far has run.
    pub async fn settle(&self, scene: &SceneId) -> Result<RoomSnapshot> {
        self.rooms
            .snapshot(scene)
            .await
            .with_context(|| format!("room {} is gone", scene))
    }

    pub async fn command(&self, scene: &SceneId, command: RoomCommand) -> Result<RoomSnapshot> {
        ensure!(self.rooms.send(scene, command).await, "no room {}", scene);
        self.settle(scene).await
    }

    pub async fn published(&self, scene: &str) -> Result<SceneId> {
        let scene = SceneId::from(scene);
        self.rooms.create_room(&scene);
        let snapshot = self
            .command(
                &scene,
                RoomCommand::Publish {
                    offer: "v=0\r\ns=render host\r\n".to_string(),
                },
            )
            .await?;
        ensure!(snapshot.published, "room {} did not publish", scene);
        Ok(scene)
    }

    pub async fn viewer(&self, scene: &SceneId, player: u32) -> Result<RoomSnapshot> {
        self.command(
            scene,
            RoomCommand::AddViewer {
                player: PlayerId(player),
            },
        )
        .await
    }

    pub async fn open_data_channels(&self, scene: &SceneId, player: u32) -> Result<RoomSnapshot> {
        self.command(
            scene,
            RoomCommand::OpenDataChannels {
                player: PlayerId(player),
            },
        )
        .await
    }
}
