pub use scenecast_core::model::{CameraMode, CloseCode, PlayerId, SceneId};

pub mod model {
    pub use scenecast_core::model::*;
}

pub mod protocol {
    pub use scenecast_core::protocol::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use scenecast_server::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use scenecast_relay::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use scenecast_client::*;
}
