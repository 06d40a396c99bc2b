use super::dispatcher::{Attachment, Dispatcher};
use crate::registry::{ConnectionHandle, HostInfo};
use scenecast_core::{CameraMode, CloseCode, ConnectionId, Envelope, PlayerId, SceneId};
use tracing::{info, warn};

impl Dispatcher {
    pub(crate) fn on_host_connected(&mut self, handle: ConnectionHandle) {
        info!("Render host connected: {}", handle.id());

        handle.send(&Envelope::Config {
            peer_connection_options: self.hub.config.peer_connection_options.clone(),
        });
        handle.send(&Envelope::Identify);
        self.connections
            .insert(handle.id(), Attachment::PendingHost(handle));
    }

    pub(crate) fn on_host_message(
        &mut self,
        conn: ConnectionId,
        attachment: Attachment,
        msg: Envelope,
    ) {
        match msg {
            Envelope::Ping { time } => {
                let handle = match &attachment {
                    Attachment::PendingHost(handle) => Some(handle.clone()),
                    Attachment::Host(scene) => self.hub.hosts.handle(scene),
                    _ => None,
                };
                if let Some(handle) = handle {
                    handle.send(&Envelope::Pong { time });
                }
            }

            Envelope::EndpointId {
                id,
                camera_mode,
                player_id,
            } => self.register_host(
                conn,
                attachment,
                id,
                camera_mode.unwrap_or_default(),
                player_id,
            ),

            other => {
                let Attachment::Host(scene) = attachment else {
                    warn!(
                        "Render host {} sent {} before endpointId, dropping",
                        conn,
                        other.kind()
                    );
                    return;
                };
                self.route_host_message(scene, other);
            }
        }
    }

    fn register_host(
        &mut self,
        conn: ConnectionId,
        attachment: Attachment,
        scene: SceneId,
        camera_mode: CameraMode,
        bound_player: Option<PlayerId>,
    ) {
        let handle = match attachment {
            Attachment::PendingHost(handle) => handle,
            Attachment::Host(previous) => {
                let Some(entry) = self.hub.hosts.remove_if_current(&previous, conn) else {
                    return;
                };
                if previous != scene {
                    info!(scene = %previous, "Render host re-identified as {}", scene);
                    self.to_relay(&Envelope::StreamerDisconnected {
                        scene_id: Some(previous),
                    });
                }
                entry.handle
            }
            _ => return,
        };

        let info = HostInfo {
            camera_mode,
            bound_player,
        };
        if let Some(replaced) = self.hub.hosts.insert(scene.clone(), handle.clone(), info) {
            let replaced_conn = replaced.handle.id();
            if replaced_conn != conn {
                warn!(scene = %scene, "Scene already had a render host, closing the old one");
                self.connections.remove(&replaced_conn);
                replaced.handle.close(CloseCode::DuplicateIdentity);
            }
        }
        self.connections.insert(conn, Attachment::Host(scene.clone()));

        info!(scene = %scene, mode = %camera_mode, "Render host registered");

        if self.hub.relay.is_attached() {
            handle.send(&Envelope::SfuConnected);
        }
    }

    fn route_host_message(&mut self, scene: SceneId, msg: Envelope) {
        match msg {
            mut msg @ (Envelope::Offer { .. }
            | Envelope::Answer { .. }
            | Envelope::IceCandidate { .. }) => {
                msg.stamp_scene(Some(scene));
                self.to_relay(&msg);
            }

            Envelope::DisconnectPlayer { player_id, reason } => {
                info!(
                    scene = %scene,
                    player = %player_id,
                    "Render host kicked viewer: {}",
                    reason.as_deref().unwrap_or("no reason")
                );
                self.evict_viewer(player_id, CloseCode::KickedByHost);
            }

            Envelope::DisconnectScene { .. } => {
                let msg = Envelope::DisconnectScene {
                    scene_id: Some(scene),
                };
                self.to_relay(&msg);
                self.hub.viewers.broadcast(&msg);
            }

            Envelope::StreamerDataChannelsFailed { player_id, .. } => {
                warn!(scene = %scene, player = %player_id, "Render host data channels failed");
                self.evict_viewer(player_id, CloseCode::PluginAbnormalClose);
            }

            other => warn!(
                scene = %scene,
                "Unsupported message {} from render host",
                other.kind()
            ),
        }
    }

    pub(crate) fn on_host_disconnected(&mut self, conn: ConnectionId, scene: SceneId) {
        if self.hub.hosts.remove_if_current(&scene, conn).is_none() {
            return;
        }
        info!(scene = %scene, "Render host disconnected");

        self.to_relay(&Envelope::StreamerDisconnected {
            scene_id: Some(scene.clone()),
        });

        let affected = if self.hub.hosts.is_empty() {
            self.hub.viewers.keys()
        } else {
            self.hub.viewers.attached_to(&scene)
        };
        for player in affected {
            self.evict_viewer(player, CloseCode::HostNotFound);
        }
    }
}
