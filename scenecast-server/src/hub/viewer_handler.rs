use super::HubEvent;
use super::dispatcher::{Admission, Attachment, Dispatcher};
use crate::error::CredentialError;
use crate::identity::Occupancy;
use crate::registry::{ConnectionHandle, ViewerInfo};
use scenecast_core::{CloseCode, ConnectionId, Envelope, PlayerId};
use tracing::{debug, info, warn};

impl Dispatcher {
    pub(crate) fn on_viewer_connected(&mut self, handle: ConnectionHandle) {
        if self.hub.hosts.is_empty() {
            warn!("Viewer {} connected with no render host available", handle.id());
            handle.close(CloseCode::HostNotFound);
            return;
        }
        debug!("Viewer connected: {}", handle.id());
        self.connections
            .insert(handle.id(), Attachment::PendingViewer(handle));
    }

    pub(crate) fn on_viewer_message(
        &mut self,
        conn: ConnectionId,
        attachment: Attachment,
        msg: Envelope,
    ) {
        let handle = match &attachment {
            Attachment::PendingViewer(handle) | Attachment::VerifyingViewer(handle, _) => {
                Some(handle.clone())
            }
            Attachment::Viewer(player) => self.hub.viewers.handle(player),
            _ => None,
        };
        let Some(handle) = handle else {
            debug!("Viewer {} already gone", conn);
            return;
        };

        match msg {
            Envelope::Ping { time } => handle.send(&Envelope::Pong { time }),

            Envelope::ListStreamers => {
                let mut ids = self.hub.hosts.keys();
                ids.sort();
                handle.send(&Envelope::StreamerList { ids });
            }

            Envelope::UserInfo {
                camera_mode,
                account_id,
                token,
            } => match attachment {
                Attachment::PendingViewer(_) => {
                    let admission = Admission {
                        camera_mode: camera_mode.unwrap_or_default(),
                        account_id,
                    };
                    self.verify_viewer(handle, admission, token)
                }
                _ => warn!("Viewer {} sent userInfo twice, dropping", conn),
            },

            other => match attachment {
                Attachment::Viewer(player) => self.route_viewer_message(player, other),
                _ => warn!(
                    "Viewer {} sent {} before admission, dropping",
                    conn,
                    other.kind()
                ),
            },
        }
    }

    /// Consults the credential oracle off the dispatcher task; the verdict comes back as
    /// [`HubEvent::Verified`].
    fn verify_viewer(&mut self, handle: ConnectionHandle, admission: Admission, token: Option<String>) {
        let conn = handle.id();
        let account_id = admission.account_id.clone();
        self.connections
            .insert(conn, Attachment::VerifyingViewer(handle, admission));

        let verifier = self.hub.verifier.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let verdict = verifier
                .verify(token.as_deref(), account_id.as_deref())
                .await;
            match events.upgrade() {
                Some(events) => {
                    let _ = events.send(HubEvent::Verified { conn, verdict });
                }
                None => debug!("Hub dispatcher gone before verdict for {}", conn),
            }
        });
    }

    pub(crate) fn on_viewer_verified(
        &mut self,
        conn: ConnectionId,
        verdict: Result<(), CredentialError>,
    ) {
        let Some(Attachment::VerifyingViewer(handle, admission)) = self.connections.remove(&conn)
        else {
            debug!("Verdict for {} arrived after it left", conn);
            return;
        };

        if let Err(e) = verdict {
            warn!("Refusing viewer {}: {}", conn, e);
            handle.close(CloseCode::CredentialError);
            return;
        }
        self.admit_viewer(handle, admission);
    }

    fn admit_viewer(&mut self, handle: ConnectionHandle, admission: Admission) {
        let Admission {
            camera_mode,
            account_id,
        } = admission;

        if let Some(account) = account_id.as_deref() {
            if let Some(prior) = self.hub.viewers.find_by_account(account) {
                info!(player = %prior, "Account connected again, closing the earlier viewer");
                self.evict_viewer(prior, CloseCode::DuplicateIdentity);
            }
        }

        let occupancy = Occupancy::from_registries(&self.hub.hosts, &self.hub.viewers);
        let allocation = match self.identities.get_free(camera_mode, &occupancy) {
            Ok(allocation) => allocation,
            Err(e) => {
                warn!("Refusing viewer {}: {}", handle.id(), e);
                handle.close(CloseCode::CapacityFull);
                return;
            }
        };

        let player = allocation.player_id;
        let info = ViewerInfo::new(camera_mode, allocation.pool, account_id);
        self.hub.viewers.insert(player, handle.clone(), info);
        self.connections
            .insert(handle.id(), Attachment::Viewer(player));

        info!(player = %player, mode = %camera_mode, "Viewer admitted");

        handle.send(&Envelope::Config {
            peer_connection_options: self.hub.config.peer_connection_options.clone(),
        });
        handle.send(&Envelope::AssignedId { player_id: player });
        self.hub.hosts.broadcast(&Envelope::PlayerConnected {
            player_id: player,
            data_channel: true,
            sfu: true,
        });
        self.broadcast_player_count();
    }

    fn route_viewer_message(&mut self, player: PlayerId, msg: Envelope) {
        match msg {
            Envelope::Subscribe { scene_id, .. } | Envelope::SceneConnected { scene_id, .. } => {
                let Some(scene) = scene_id else {
                    warn!(player = %player, "Subscribe without sceneId, dropping");
                    return;
                };
                if !self.hub.hosts.contains(&scene) {
                    warn!(player = %player, scene = %scene, "Viewer asked for an unknown scene");
                    self.evict_viewer(player, CloseCode::HostNotFound);
                    return;
                }
                self.hub.viewers.update_meta(&player, |info| {
                    info.scenes.insert(scene.clone());
                });
                self.to_relay(&Envelope::SceneConnected {
                    scene_id: Some(scene),
                    player_id: Some(player),
                });
            }

            Envelope::SceneDisconnected { scene_id, .. } => {
                if let Some(scene) = &scene_id {
                    self.hub.viewers.update_meta(&player, |info| {
                        info.scenes.remove(scene);
                    });
                }
                self.to_relay(&Envelope::SceneDisconnected {
                    scene_id,
                    player_id: Some(player),
                });
            }

            mut msg @ (Envelope::Offer { .. }
            | Envelope::Answer { .. }
            | Envelope::IceCandidate { .. }
            | Envelope::DataChannelRequest { .. }
            | Envelope::PeerDataChannelsReady { .. }
            | Envelope::CloseDataChannelRequest { .. }) => {
                msg.stamp_player(Some(player));
                self.to_relay(&msg);
            }

            Envelope::Stats { data } => debug!(player = %player, stats = %data, "Viewer stats"),

            other => warn!(
                player = %player,
                "Unsupported message {} from viewer",
                other.kind()
            ),
        }
    }

    /// Closes a viewer from the hub side and runs the departure notifications now.
    pub(crate) fn evict_viewer(&mut self, player: PlayerId, code: CloseCode) {
        let Some(handle) = self.hub.viewers.handle(&player) else {
            debug!(player = %player, "Viewer already gone");
            return;
        };
        let conn = handle.id();
        self.connections.remove(&conn);
        handle.close(code);
        self.retire_viewer(player, conn, code);
    }

    /// Departure notifications. Runs at most once per viewer connection.
    pub(crate) fn retire_viewer(&mut self, player: PlayerId, conn: ConnectionId, code: CloseCode) {
        if self.hub.viewers.remove_if_current(&player, conn).is_none() {
            return;
        }
        info!(player = %player, code = code.code(), "Viewer left");

        let notice = if code == CloseCode::CameraChange {
            Envelope::PlayerDisconnected { player_id: player }
        } else {
            Envelope::PlayerGoingAway { player_id: player }
        };
        self.hub.hosts.broadcast(&notice);

        if self.hub.relay.is_attached() {
            self.hub.relay.send(&Envelope::SceneDisconnected {
                scene_id: None,
                player_id: Some(player),
            });
        }
        self.broadcast_player_count();
    }
}
