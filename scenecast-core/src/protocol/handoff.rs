use crate::model::{PlayerId, SceneId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTarget {
    pub scene_id: SceneId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffResult {
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    pub scene_id: SceneId,
}

/// Scene hand-off (camera switch) messages carried over the data channel as `{type, data}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum HandoffMessage {
    CameraSwitchPrepareRequest(SceneTarget),
    CameraSwitchPrepareResponse(HandoffResult),
    CameraSwitchRequest(SceneTarget),
    CameraSwitchResponse(HandoffResult),
    CameraSwitchCancelRequest(SceneTarget),
    CameraSwitchCancelResponse(HandoffResult),
    CameraSelectRequest(SceneTarget),
}
