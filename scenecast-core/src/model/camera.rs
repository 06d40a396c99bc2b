use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Camera mode a viewer asks for and a render host serves.
///
/// Free-camera modes are bound to a render host: the viewer slot id is the one the
/// host declared. Fixed modes draw from the generic id range.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Default)]
pub enum CameraMode {
    Fixed,
    #[default]
    ThirdPerson,
    FixedAi,
    ThirdPersonAi,
}

impl CameraMode {
    pub const ALL: [CameraMode; 4] = [
        CameraMode::Fixed,
        CameraMode::ThirdPerson,
        CameraMode::FixedAi,
        CameraMode::ThirdPersonAi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CameraMode::Fixed => "Fixed",
            CameraMode::ThirdPerson => "3rdPerson",
            CameraMode::FixedAi => "FixedAI",
            CameraMode::ThirdPersonAi => "3rdPersonAI",
        }
    }

    /// Unknown names fall back to free-camera.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "Fixed" => CameraMode::Fixed,
            "FixedAI" => CameraMode::FixedAi,
            "3rdPersonAI" => CameraMode::ThirdPersonAi,
            _ => CameraMode::ThirdPerson,
        }
    }

    pub fn is_free_camera(self) -> bool {
        matches!(self, CameraMode::ThirdPerson | CameraMode::ThirdPersonAi)
    }

    pub fn is_automated(self) -> bool {
        matches!(self, CameraMode::FixedAi | CameraMode::ThirdPersonAi)
    }
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CameraMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CameraMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CameraMode::parse_lenient(&raw))
    }
}
