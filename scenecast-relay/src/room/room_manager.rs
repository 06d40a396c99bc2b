use super::{Room, RoomCommand, RoomObserver, RoomSettings, RoomSnapshot};
use crate::engine::RelayEngine;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use scenecast_core::SceneId;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<SceneId, mpsc::Sender<RoomCommand>>>,
    engine: Arc<dyn RelayEngine>,
    observer: Arc<dyn RoomObserver>,
    settings: RoomSettings,
}

impl RoomManager {
    pub fn new(
        engine: Arc<dyn RelayEngine>,
        observer: Arc<dyn RoomObserver>,
        settings: RoomSettings,
    ) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            engine,
            observer,
            settings,
        }
    }

    /// Starts a room actor for `scene` unless one is already running.
    /// Returns whether a new room was created.
    pub fn create_room(&self, scene: &SceneId) -> bool {
        match self.rooms.entry(scene.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                info!(%scene, "Creating room");
                let (tx, rx) = mpsc::channel(100);
                let room = Room::new(
                    scene.clone(),
                    self.engine.clone(),
                    self.observer.clone(),
                    self.settings.clone(),
                    rx,
                );
                tokio::spawn(room.run());
                slot.insert(tx);
                true
            }
        }
    }

    pub fn has_room(&self, scene: &SceneId) -> bool {
        self.rooms.contains_key(scene)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<SceneId> {
        let mut ids: Vec<SceneId> = self.rooms.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    fn sender(&self, scene: &SceneId) -> Option<mpsc::Sender<RoomCommand>> {
        self.rooms.get(scene).map(|entry| entry.value().clone())
    }

    /// Queues `command` on the room for `scene`. False if there is no such room.
    pub async fn send(&self, scene: &SceneId, command: RoomCommand) -> bool {
        let Some(tx) = self.sender(scene) else {
            return false;
        };
        if let Err(e) = tx.send(command).await {
            warn!(%scene, "Room is gone, dropping {}", e.0.kind());
            return false;
        }
        true
    }

    /// Queues a command built by `make` on every room.
    pub async fn send_all(&self, make: impl Fn() -> RoomCommand) {
        for scene in self.room_ids() {
            self.send(&scene, make()).await;
        }
    }

    pub async fn snapshot(&self, scene: &SceneId) -> Option<RoomSnapshot> {
        let (reply, rx) = oneshot::channel();
        if !self.send(scene, RoomCommand::Inspect { reply }).await {
            return None;
        }
        rx.await.ok()
    }

    /// Removes the room and waits until it has released its engine resources.
    pub async fn delete_room(&self, scene: &SceneId) -> bool {
        let Some((_, tx)) = self.rooms.remove(scene) else {
            return false;
        };
        let (done, finished) = oneshot::channel();
        if tx.send(RoomCommand::Shutdown { done }).await.is_ok() {
            let _ = finished.await;
        }
        info!(%scene, "Room deleted");
        true
    }

    pub async fn delete_all_rooms(&self) {
        for scene in self.room_ids() {
            self.delete_room(&scene).await;
        }
    }
}
