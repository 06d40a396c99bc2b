use async_trait::async_trait;
use scenecast_core::{PlayerId, SceneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPair {
    pub send: u16,
    pub recv: u16,
}

/// Outbound side of a room: everything it has to tell the hub.
#[async_trait]
pub trait RoomObserver: Send + Sync + 'static {
    async fn on_publish_answer(&self, scene: &SceneId, sdp: String);

    async fn on_viewer_offer(&self, scene: &SceneId, player: PlayerId, sdp: String);

    /// Stream ids the viewer should bind, from the viewer's point of view.
    async fn on_peer_data_channels(&self, scene: &SceneId, player: PlayerId, streams: StreamPair);

    /// Stream ids the render host should bind for this viewer.
    async fn on_streamer_data_channels(
        &self,
        scene: &SceneId,
        player: PlayerId,
        streams: StreamPair,
    );

    async fn on_data_channels_closed(&self, scene: &SceneId, player: PlayerId);

    async fn on_viewer_failed(&self, scene: &SceneId, player: PlayerId, reason: String);
}
