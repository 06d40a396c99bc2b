use scenecast_core::{HandoffMessage, HandoffResult, PlayerId, SceneId, SceneTarget};

/// What a hand-off session reports back to the viewer application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffEvent {
    Prepared { scene: SceneId, result: bool },
    Committed { scene: SceneId, result: bool },
    Cancelled { scene: SceneId, result: bool },
    /// The prepare window ran out before a commit.
    Expired { scene: SceneId },
    /// Ask the render host to select the new live scene's camera.
    CameraSelect { scene: SceneId },
    /// The live connection now points at `scene`.
    SceneChanged { scene: SceneId },
}

impl HandoffEvent {
    pub fn scene(&self) -> &SceneId {
        match self {
            HandoffEvent::Prepared { scene, .. }
            | HandoffEvent::Committed { scene, .. }
            | HandoffEvent::Cancelled { scene, .. }
            | HandoffEvent::Expired { scene }
            | HandoffEvent::CameraSelect { scene }
            | HandoffEvent::SceneChanged { scene } => scene,
        }
    }

    /// Message to send back over the data channel, if the event has one.
    /// An expiry answers as a successful cancel.
    pub fn to_message(&self, player: Option<PlayerId>) -> Option<HandoffMessage> {
        let result = |result: bool, scene: &SceneId| HandoffResult {
            result,
            player_id: player,
            scene_id: scene.clone(),
        };
        match self {
            HandoffEvent::Prepared { scene, result: ok } => {
                Some(HandoffMessage::CameraSwitchPrepareResponse(result(*ok, scene)))
            }
            HandoffEvent::Committed { scene, result: ok } => {
                Some(HandoffMessage::CameraSwitchResponse(result(*ok, scene)))
            }
            HandoffEvent::Cancelled { scene, result: ok } => {
                Some(HandoffMessage::CameraSwitchCancelResponse(result(*ok, scene)))
            }
            HandoffEvent::Expired { scene } => {
                Some(HandoffMessage::CameraSwitchCancelResponse(result(true, scene)))
            }
            HandoffEvent::CameraSelect { scene } => {
                Some(HandoffMessage::CameraSelectRequest(SceneTarget {
                    scene_id: scene.clone(),
                }))
            }
            HandoffEvent::SceneChanged { .. } => None,
        }
    }
}
