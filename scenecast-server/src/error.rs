use scenecast_core::CameraMode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
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

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("no free player slot for camera mode {0}")]
    CapacityFull(CameraMode),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("missing credential")]
    Missing,

    #[error("credential rejected")]
    Rejected,
}
