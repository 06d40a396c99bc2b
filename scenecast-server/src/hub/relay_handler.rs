use super::dispatcher::{Attachment, Dispatcher};
use crate::registry::ConnectionHandle;
use scenecast_core::{CloseCode, ConnectionId, Envelope};
use tracing::{debug, info, warn};

const RELAY_ID: &str = "SFU";

impl Dispatcher {
    pub(crate) fn on_relay_connected(&mut self, handle: ConnectionHandle) {
        if !self.hub.relay.attach(handle.clone()) {
            warn!("Relay already attached, refusing {}", handle.id());
            handle.close(CloseCode::TryAgainLater);
            return;
        }
        info!("Relay connected: {}", handle.id());

        handle.send(&Envelope::Config {
            peer_connection_options: self.hub.config.peer_connection_options.clone(),
        });
        self.connections.insert(handle.id(), Attachment::Relay);
        self.hub.hosts.broadcast(&Envelope::SfuConnected);
    }

    pub(crate) fn on_relay_message(&mut self, msg: Envelope) {
        match msg {
            Envelope::Ping { time } => {
                self.hub.relay.send(&Envelope::Pong { time });
            }

            Envelope::Offer {
                scene_id,
                player_id: Some(player),
                sdp,
                sfu,
            } => {
                let msg = Envelope::Offer {
                    scene_id,
                    player_id: None,
                    sdp,
                    sfu,
                };
                if !self.hub.viewers.send(&player, &msg) {
                    warn!(player = %player, "Relay offer for unknown viewer");
                }
            }

            msg @ Envelope::Answer {
                scene_id: Some(_), ..
            } => {
                let Some(scene) = msg.scene_id().cloned() else {
                    return;
                };
                if !self.hub.hosts.send(&scene, &msg) {
                    warn!(scene = %scene, "Relay answer for unknown render host");
                    return;
                }
                let bound = self.hub.hosts.with_meta(&scene, |info| {
                    info.bound_player.filter(|_| info.camera_mode.is_free_camera())
                });
                if let Some(Some(player)) = bound {
                    self.hub.viewers.send(
                        &player,
                        &Envelope::StreamerReady {
                            scene_id: scene.clone(),
                        },
                    );
                }
            }

            Envelope::StreamerDataChannels {
                scene_id: Some(scene),
                player_id,
                send_stream_id,
                recv_stream_id,
                ..
            } => {
                let msg = Envelope::StreamerDataChannels {
                    scene_id: Some(scene.clone()),
                    player_id,
                    sfu_id: Some(RELAY_ID.to_string()),
                    send_stream_id,
                    recv_stream_id,
                };
                if !self.hub.hosts.send(&scene, &msg) {
                    warn!(scene = %scene, "Data channels for unknown render host");
                }
            }

            msg @ Envelope::StreamerDataChannelsClosed {
                scene_id: Some(_), ..
            } => {
                if let Some(scene) = msg.scene_id() {
                    self.hub.hosts.send(scene, &msg);
                }
            }

            Envelope::PeerDataChannels {
                scene_id,
                player_id: Some(player),
                send_stream_id,
                recv_stream_id,
            } => {
                self.hub
                    .viewers
                    .update_meta(&player, |info| info.data_channel_ready = true);
                let msg = Envelope::PeerDataChannels {
                    scene_id,
                    player_id: None,
                    send_stream_id,
                    recv_stream_id,
                };
                if !self.hub.viewers.send(&player, &msg) {
                    warn!(player = %player, "Data channels for unknown viewer");
                }
            }

            Envelope::Error {
                player_id, reason, ..
            } => {
                warn!(
                    player = %player_id,
                    "Relay reported an error: {}",
                    reason.as_deref().unwrap_or("unspecified")
                );
                self.evict_viewer(player_id, CloseCode::RelayAbnormalClose);
            }

            Envelope::IceCandidate { .. } => debug!("Ignoring ICE candidate from relay"),

            other => warn!("Unsupported message {} from relay", other.kind()),
        }
    }

    pub(crate) fn on_relay_disconnected(&mut self, conn: ConnectionId) {
        if !self.hub.relay.detach(conn) {
            return;
        }
        warn!("Relay disconnected, closing all viewers");

        for player in self.hub.viewers.keys() {
            self.evict_viewer(player, CloseCode::RelayAbnormalClose);
        }
        self.hub.hosts.broadcast(&Envelope::SfuDisconnected);
    }
}
