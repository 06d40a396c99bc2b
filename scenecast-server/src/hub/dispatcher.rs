use crate::hub::{Hub, HubEvent, Party};
use crate::identity::IdentityAllocator;
use crate::registry::ConnectionHandle;
use scenecast_core::{CameraMode, CloseCode, ConnectionId, Envelope, PlayerId, SceneId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Where a live socket currently stands.
#[derive(Debug, Clone)]
pub(crate) enum Attachment {
    PendingHost(ConnectionHandle),
    Host(SceneId),
    PendingViewer(ConnectionHandle),
    VerifyingViewer(ConnectionHandle, Admission),
    Viewer(PlayerId),
    Relay,
}

/// What a viewer asked for in `userInfo`, held while its credential is checked.
#[derive(Debug, Clone)]
pub(crate) struct Admission {
    pub camera_mode: CameraMode,
    pub account_id: Option<String>,
}

/// Single consumer of [`HubEvent`]s. Each event is handled to completion before the next.
pub struct Dispatcher {
    pub(crate) hub: Arc<Hub>,
    pub(crate) identities: IdentityAllocator,
    pub(crate) connections: HashMap<ConnectionId, Attachment>,
    pub(crate) events_tx: mpsc::WeakUnboundedSender<HubEvent>,
    events_rx: mpsc::UnboundedReceiver<HubEvent>,
}

impl Dispatcher {
    pub fn new(hub: Arc<Hub>) -> (Self, mpsc::UnboundedSender<HubEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let identities =
            IdentityAllocator::new(hub.config.max_player_controllers, &hub.config.pools);
        let dispatcher = Self {
            hub,
            identities,
            connections: HashMap::new(),
            events_tx: events_tx.downgrade(),
            events_rx,
        };
        (dispatcher, events_tx)
    }

    pub async fn run(mut self) {
        info!("Hub dispatcher started");

        while let Some(event) = self.events_rx.recv().await {
            self.handle_event(event).await;
        }

        info!("Hub dispatcher finished");
    }

    /// Handles queued events until no viewer is waiting on a credential verdict.
    pub async fn settle(&mut self) {
        loop {
            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_event(event).await;
            }
            let verifying = self
                .connections
                .values()
                .any(|a| matches!(a, Attachment::VerifyingViewer(..)));
            if !verifying {
                return;
            }
            match self.events_rx.recv().await {
                Some(event) => self.handle_event(event).await,
                None => return,
            }
        }
    }

    pub async fn handle_event(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected { party, handle } => match party {
                Party::Host => self.on_host_connected(handle),
                Party::Viewer => self.on_viewer_connected(handle),
                Party::Relay => self.on_relay_connected(handle),
            },

            HubEvent::Frame { conn, text } => {
                let Some(attachment) = self.connections.get(&conn).cloned() else {
                    debug!("Frame from unknown connection {}", conn);
                    return;
                };

                let msg = match Envelope::parse(&text) {
                    Ok(msg) => msg,
                    Err(e) if e.is_malformed() => {
                        warn!("Closing {} after unparseable frame: {}", conn, e);
                        self.close_connection(conn, &attachment, CloseCode::PolicyViolation);
                        return;
                    }
                    Err(e) => {
                        warn!("Dropping unsupported frame from {}: {}", conn, e);
                        return;
                    }
                };

                match attachment {
                    Attachment::PendingHost(_) | Attachment::Host(_) => {
                        self.on_host_message(conn, attachment, msg)
                    }
                    Attachment::PendingViewer(_)
                    | Attachment::VerifyingViewer(..)
                    | Attachment::Viewer(_) => self.on_viewer_message(conn, attachment, msg),
                    Attachment::Relay => self.on_relay_message(msg),
                }
            }

            HubEvent::Disconnected { conn, code } => {
                let Some(attachment) = self.connections.remove(&conn) else {
                    return;
                };
                match attachment {
                    Attachment::PendingHost(_)
                    | Attachment::PendingViewer(_)
                    | Attachment::VerifyingViewer(..) => {
                        debug!("Unregistered connection {} closed", conn);
                    }
                    Attachment::Host(scene) => self.on_host_disconnected(conn, scene),
                    Attachment::Viewer(player) => {
                        self.retire_viewer(player, conn, code.unwrap_or(CloseCode::Normal))
                    }
                    Attachment::Relay => self.on_relay_disconnected(conn),
                }
            }

            HubEvent::Verified { conn, verdict } => self.on_viewer_verified(conn, verdict),
        }
    }

    fn close_connection(&self, conn: ConnectionId, attachment: &Attachment, code: CloseCode) {
        let handle = match attachment {
            Attachment::PendingHost(handle)
            | Attachment::PendingViewer(handle)
            | Attachment::VerifyingViewer(handle, _) => Some(handle.clone()),
            Attachment::Host(scene) => self.hub.hosts.handle(scene),
            Attachment::Viewer(player) => self.hub.viewers.handle(player),
            Attachment::Relay => self.hub.relay.handle(),
        };
        match handle {
            Some(handle) if handle.id() == conn => handle.close(code),
            _ => debug!("Connection {} already replaced", conn),
        }
    }

    /// Sends to the relay, logging when none is attached.
    pub(crate) fn to_relay(&self, msg: &Envelope) {
        if !self.hub.relay.send(msg) {
            warn!("No relay attached, dropping {}", msg.kind());
        }
    }

    pub(crate) fn broadcast_player_count(&self) {
        self.hub.viewers.broadcast(&Envelope::PlayerCount {
            count: self.hub.viewers.len(),
        });
    }
}
