use crate::registry::ConnectionRegistry;
use scenecast_core::{CameraMode, PlayerId, SceneId, SceneSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub camera_mode: CameraMode,
    /// Viewer slot a free-camera host is bound to.
    pub bound_player: Option<PlayerId>,
}

pub type HostRegistry = ConnectionRegistry<SceneId, HostInfo>;

impl HostRegistry {
    /// Free-camera hosts of `mode` that declared a viewer slot, ordered by scene id.
    pub fn bound_players(&self, mode: CameraMode) -> Vec<(SceneId, PlayerId)> {
        let mut bound: Vec<_> = self
            .snapshot()
            .into_iter()
            .filter(|(_, info)| info.camera_mode == mode)
            .filter_map(|(scene, info)| info.bound_player.map(|player| (scene, player)))
            .collect();
        bound.sort();
        bound
    }

    pub fn summaries(&self) -> Vec<SceneSummary> {
        let mut scenes: Vec<_> = self
            .snapshot()
            .into_iter()
            .map(|(scene_id, info)| SceneSummary {
                scene_id,
                camera_mode: info.camera_mode,
                player_id: info.bound_player,
            })
            .collect();
        scenes.sort_by(|a, b| a.scene_id.cmp(&b.scene_id));
        scenes
    }
}
