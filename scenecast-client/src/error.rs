use scenecast_core::{ProtocolError, SceneId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("failed to connect to scene {scene}: {reason}")]
    Connect { scene: SceneId, reason: String },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("invalid hand-off payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("opcode {0} does not carry hand-off messages")]
    UnexpectedFrame(u8),

    #[error("hand-off session has stopped")]
    Stopped,
}
