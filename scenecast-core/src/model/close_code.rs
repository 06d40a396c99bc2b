/// WebSocket close codes used between the hub, viewers, hosts and the relay.
/// The numeric values are part of the wire contract.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
#[repr(u16)]
pub enum CloseCode {
    Normal = 1000,
    PolicyViolation = 1008,
    TryAgainLater = 1013,
    CameraChange = 3001,
    HostNotFound = 3002,
    AbnormalClose = 3006,
    RelayAbnormalClose = 3007,
    PluginAbnormalClose = 3008,
    CredentialError = 3009,
    PlayerAlreadyExists = 3016,
    KickedByHost = 3017,
    CapacityFull = 3018,
    DuplicateIdentity = 3019,
    HostDisconnected = 3020,
}

impl CloseCode {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        let known = match code {
            1000 => CloseCode::Normal,
            1008 => CloseCode::PolicyViolation,
            1013 => CloseCode::TryAgainLater,
            3001 => CloseCode::CameraChange,
            3002 => CloseCode::HostNotFound,
            3006 => CloseCode::AbnormalClose,
            3007 => CloseCode::RelayAbnormalClose,
            3008 => CloseCode::PluginAbnormalClose,
            3009 => CloseCode::CredentialError,
            3016 => CloseCode::PlayerAlreadyExists,
            3017 => CloseCode::KickedByHost,
            3018 => CloseCode::CapacityFull,
            3019 => CloseCode::DuplicateIdentity,
            3020 => CloseCode::HostDisconnected,
            _ => return None,
        };
        Some(known)
    }

    pub fn reason(self) -> &'static str {
        match self {
            CloseCode::Normal => "Normal closure",
            CloseCode::PolicyViolation => "Cannot parse message",
            CloseCode::TryAgainLater => "Relay already connected",
            CloseCode::CameraChange => "Camera changed",
            CloseCode::HostNotFound => "Render host not found",
            CloseCode::AbnormalClose => "Abnormal close",
            CloseCode::RelayAbnormalClose => "Relay closed abnormally",
            CloseCode::PluginAbnormalClose => "Host data channels failed",
            CloseCode::CredentialError => "Credential rejected",
            CloseCode::PlayerAlreadyExists => "Player already exists",
            CloseCode::KickedByHost => "Kicked by render host",
            CloseCode::CapacityFull => "No free player slot",
            CloseCode::DuplicateIdentity => "Duplicate identity",
            CloseCode::HostDisconnected => "Render host disconnected",
        }
    }
}
