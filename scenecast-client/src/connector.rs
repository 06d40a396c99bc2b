use crate::HandoffError;
use async_trait::async_trait;
use scenecast_core::{CloseCode, SceneId};
use std::sync::Arc;

/// A viewer's room-client session with one scene.
#[async_trait]
pub trait SceneLink: Send + Sync + 'static {
    fn scene_id(&self) -> &SceneId;

    /// True once the scene's media is actually arriving on this link.
    async fn is_media_flowing(&self) -> bool;

    async fn close(&self, code: CloseCode);
}

#[async_trait]
pub trait SceneConnector: Send + Sync + 'static {
    /// Opens a session with `scene` without disturbing any existing one.
    async fn connect(&self, scene: &SceneId) -> Result<Arc<dyn SceneLink>, HandoffError>;
}
