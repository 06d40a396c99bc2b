use crate::room::{RoomObserver, StreamPair};
use async_trait::async_trait;
use scenecast_core::{Envelope, PlayerId, SceneId};
use tokio::sync::mpsc;
use tracing::debug;

/// Turns room notifications into hub messages and queues them for the hub link.
#[derive(Clone)]
pub struct HubNotifier {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl HubNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn push(&self, msg: Envelope) {
        if self.tx.send(msg).is_err() {
            debug!("Hub link closed, dropping relay notification");
        }
    }
}

#[async_trait]
impl RoomObserver for HubNotifier {
    async fn on_publish_answer(&self, scene: &SceneId, sdp: String) {
        self.push(Envelope::Answer {
            scene_id: Some(scene.clone()),
            player_id: None,
            sdp,
        });
    }

    async fn on_viewer_offer(&self, scene: &SceneId, player: PlayerId, sdp: String) {
        self.push(Envelope::Offer {
            scene_id: Some(scene.clone()),
            player_id: Some(player),
            sdp,
            sfu: true,
        });
    }

    async fn on_peer_data_channels(&self, scene: &SceneId, player: PlayerId, streams: StreamPair) {
        self.push(Envelope::PeerDataChannels {
            scene_id: Some(scene.clone()),
            player_id: Some(player),
            send_stream_id: streams.send,
            recv_stream_id: streams.recv,
        });
    }

    async fn on_streamer_data_channels(
        &self,
        scene: &SceneId,
        player: PlayerId,
        streams: StreamPair,
    ) {
        self.push(Envelope::StreamerDataChannels {
            scene_id: Some(scene.clone()),
            player_id: player,
            sfu_id: None,
            send_stream_id: streams.send,
            recv_stream_id: streams.recv,
        });
    }

    async fn on_data_channels_closed(&self, scene: &SceneId, player: PlayerId) {
        self.push(Envelope::StreamerDataChannelsClosed {
            scene_id: Some(scene.clone()),
            player_id: player,
        });
    }

    async fn on_viewer_failed(&self, scene: &SceneId, player: PlayerId, reason: String) {
        self.push(Envelope::Error {
            scene_id: Some(scene.clone()),
            player_id: player,
            reason: Some(reason),
        });
    }
}
