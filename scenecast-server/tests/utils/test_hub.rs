use anyhow::{Context, Result};
use scenecast_core::{CloseCode, Envelope, PlayerId};
use scenecast_server::{
    AcceptAll, CredentialVerifier, Dispatcher, Hub, HubConfig, HubEvent, Party,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::test_peer::TestPeer;

/// Drives a dispatcher directly, one event at a time, without sockets.
pub struct TestHub {
    pub hub: Arc<Hub>,
    dispatcher: Dispatcher,
    _events: mpsc::UnboundedSender<HubEvent>,
}

impl TestHub {
    pub fn new() -> Self {
        Self::with(HubConfig::default(), Arc::new(AcceptAll))
    }

    pub fn with(config: HubConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let hub = Arc::new(Hub::new(config, verifier));
        let (dispatcher, events) = Dispatcher::new(hub.clone());
        Self {
            hub,
            dispatcher,
            _events: events,
        }
    }

    pub async fn connect(&mut self, party: Party) -> TestPeer {
        let peer = TestPeer::new();
        self.dispatcher
            .handle_event(HubEvent::Connected {
                party,
                handle: peer.handle.clone(),
            })
            .await;
        peer
    }

    pub async fn send(&mut self, peer: &TestPeer, msg: Value) {
        self.send_raw(peer, &msg.to_string()).await;
    }

    pub async fn send_raw(&mut self, peer: &TestPeer, text: &str) {
        self.send_unsettled(peer, text).await;
        self.settle().await;
    }

    /// Hands a frame to the dispatcher without waiting for credential verdicts.
    pub async fn send_unsettled(&mut self, peer: &TestPeer, text: &str) {
        self.dispatcher
            .handle_event(HubEvent::Frame {
                conn: peer.id(),
                text: text.to_string(),
            })
            .await;
    }

    pub async fn settle(&mut self) {
        self.dispatcher.settle().await;
    }

    pub async fn disconnect(&mut self, peer: &TestPeer, code: Option<CloseCode>) {
        self.dispatcher
            .handle_event(HubEvent::Disconnected {
                conn: peer.id(),
                code,
            })
            .await;
    }

    /// Connects a render host and completes the endpoint handshake.
    pub async fn host(&mut self, scene: &str, mode: &str, player: Option<u32>) -> TestPeer {
        let mut peer = self.connect(Party::Host).await;
        let mut msg = json!({"type": "endpointId", "id": scene, "cameraMode": mode});
        if let Some(player) = player {
            msg["playerId"] = json!(player.to_string());
        }
        self.send(&peer, msg).await;
        peer.clear();
        peer
    }

    pub async fn relay(&mut self) -> TestPeer {
        let mut peer = self.connect(Party::Relay).await;
        peer.clear();
        peer
    }

    /// Connects a viewer, sends `userInfo` and returns the assigned slot id.
    pub async fn viewer(&mut self, mode: &str, account: Option<&str>) -> Result<(TestPeer, PlayerId)> {
        let mut peer = self.connect(Party::Viewer).await;
        let mut msg = json!({"type": "userInfo", "cameraMode": mode});
        if let Some(account) = account {
            msg["accountId"] = json!(account);
        }
        self.send(&peer, msg).await;

        let player = peer
            .received()
            .into_iter()
            .find_map(|env| match env {
                Envelope::AssignedId { player_id } => Some(player_id),
                _ => None,
            })
            .context("viewer was not assigned a player id")?;
        Ok((peer, player))
    }
}

impl Default for TestHub {
    fn default() -> Self {
        Self::new()
    }
}
