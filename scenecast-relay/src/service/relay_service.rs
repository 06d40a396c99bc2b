use crate::room::{RoomCommand, RoomManager, RoomObserver};
use scenecast_core::{Envelope, PlayerId, SceneId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies hub messages to the room set.
#[derive(Clone)]
pub struct RelayService {
    rooms: RoomManager,
    observer: Arc<dyn RoomObserver>,
}

impl RelayService {
    pub fn new(rooms: RoomManager, observer: Arc<dyn RoomObserver>) -> Self {
        Self { rooms, observer }
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    pub async fn handle(&self, msg: Envelope) {
        match msg {
            Envelope::Config { .. } => debug!("Hub sent config"),

            Envelope::Offer {
                scene_id: Some(scene),
                sdp,
                ..
            } => {
                self.rooms.create_room(&scene);
                self.rooms
                    .send(&scene, RoomCommand::Publish { offer: sdp })
                    .await;
            }

            Envelope::Answer {
                scene_id: Some(scene),
                player_id: Some(player),
                sdp,
            } => {
                if !self
                    .rooms
                    .send(&scene, RoomCommand::ViewerAnswer { player, sdp })
                    .await
                {
                    warn!(%scene, %player, "Answer for a scene without a room");
                }
            }

            Envelope::SceneConnected {
                scene_id: Some(scene),
                player_id: Some(player),
            } => {
                if !self
                    .rooms
                    .send(&scene, RoomCommand::AddViewer { player })
                    .await
                {
                    warn!(%scene, %player, "Viewer joined a scene with no room");
                    self.observer
                        .on_viewer_failed(&scene, player, format!("no room for scene {}", scene))
                        .await;
                }
            }

            Envelope::SceneDisconnected {
                scene_id,
                player_id: Some(player),
            } => {
                self.dispatch(scene_id, || RoomCommand::RemoveViewer { player })
                    .await
            }

            Envelope::StreamerDisconnected { scene_id } | Envelope::DisconnectScene { scene_id } => {
                match scene_id {
                    Some(scene) => {
                        self.rooms.delete_room(&scene).await;
                    }
                    None => {
                        info!("Dropping every room");
                        self.rooms.delete_all_rooms().await;
                    }
                }
            }

            Envelope::DataChannelRequest {
                scene_id,
                player_id: Some(player),
            } => {
                self.dispatch(scene_id, || RoomCommand::OpenDataChannels { player })
                    .await
            }

            Envelope::PeerDataChannelsReady {
                scene_id,
                player_id: Some(player),
            } => {
                self.dispatch(scene_id, || RoomCommand::DataChannelsReady { player })
                    .await
            }

            Envelope::CloseDataChannelRequest {
                scene_id,
                player_id: Some(player),
            } => {
                self.dispatch(scene_id, || RoomCommand::CloseDataChannels { player })
                    .await
            }

            // The relay gathers its own candidates.
            Envelope::IceCandidate { .. } => {}

            Envelope::Ping { .. } | Envelope::Pong { .. } => {}

            other => warn!(kind = other.kind(), "Unhandled hub message"),
        }
    }

    /// Sends to the named room, or to every room when the hub omitted the scene.
    async fn dispatch(&self, scene: Option<SceneId>, make: impl Fn() -> RoomCommand) {
        match scene {
            Some(scene) => {
                if !self.rooms.send(&scene, make()).await {
                    debug!(%scene, "No room for command");
                }
            }
            None => self.rooms.send_all(make).await,
        }
    }

    /// Worker shard `player` occupies in `scene`.
    pub async fn shard_of(&self, scene: &SceneId, player: PlayerId) -> Option<usize> {
        self.rooms.snapshot(scene).await?.shard_of(player)
    }
}
