use crate::registry::ConnectionRegistry;
use scenecast_core::{CameraMode, PlayerId, SceneId};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerInfo {
    pub camera_mode: CameraMode,
    /// Pool the slot id was taken from. Differs from `camera_mode` after a fallback.
    pub pool: CameraMode,
    pub account_id: Option<String>,
    pub data_channel_ready: bool,
    pub scenes: BTreeSet<SceneId>,
}

impl ViewerInfo {
    pub fn new(camera_mode: CameraMode, pool: CameraMode, account_id: Option<String>) -> Self {
        Self {
            camera_mode,
            pool,
            account_id,
            data_channel_ready: false,
            scenes: BTreeSet::new(),
        }
    }
}

pub type ViewerRegistry = ConnectionRegistry<PlayerId, ViewerInfo>;

impl ViewerRegistry {
    pub fn find_by_account(&self, account_id: &str) -> Option<PlayerId> {
        self.find(|_, info| info.account_id.as_deref() == Some(account_id))
            .into_iter()
            .next()
    }

    pub fn attached_to(&self, scene: &SceneId) -> Vec<PlayerId> {
        self.find(|_, info| info.scenes.contains(scene))
    }
}
