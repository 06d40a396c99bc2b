use crate::engine::{ResourceId, WorkerId};
use crate::slots::SlotError;
use scenecast_core::{PlayerId, SceneId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown resource {0}")]
    UnknownResource(ResourceId),

    #[error("{op} rejected: {reason}")]
    Rejected { op: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Slots(#[from] SlotError),

    #[error("scene {0} has no producers yet")]
    NotPublished(SceneId),

    #[error("viewer {0} is not in this scene")]
    UnknownViewer(PlayerId),

    #[error("relay worker {0} died")]
    WorkerDied(WorkerId),

    #[error("relay engine event stream closed")]
    EngineGone,

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
