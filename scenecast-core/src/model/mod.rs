mod camera;
mod close_code;
mod connection;
mod player;
mod scene;

pub use camera::CameraMode;
pub use close_code::CloseCode;
pub use connection::ConnectionId;
pub use player::PlayerId;
pub use scene::SceneId;
