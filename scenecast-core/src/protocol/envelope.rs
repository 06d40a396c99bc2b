use crate::model::{CameraMode, PlayerId, SceneId};
use crate::protocol::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON text frame exchanged between the hub, render hosts, viewers and the relay.
///
/// `sceneId` and `playerId` are addressing fields. The hub overwrites them with the
/// authoritative value for whichever party sent the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Envelope {
    Config {
        #[serde(default)]
        peer_connection_options: Value,
    },
    Identify,
    EndpointId {
        id: SceneId,
        #[serde(default)]
        camera_mode: Option<CameraMode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<Value>,
    },

    Offer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        sdp: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        sfu: bool,
    },
    Answer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        sdp: String,
    },
    IceCandidate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        candidate: Value,
    },

    DisconnectPlayer {
        player_id: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    DisconnectScene {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
    },
    StreamerDataChannelsFailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        player_id: PlayerId,
    },
    SfuConnected,
    SfuDisconnected,
    StreamerReady {
        scene_id: SceneId,
    },
    StreamerDisconnected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
    },

    UserInfo {
        #[serde(default)]
        camera_mode: Option<CameraMode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    Subscribe {
        #[serde(default, alias = "streamerId", skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    SceneConnected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    SceneDisconnected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    DataChannelRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    PeerDataChannelsReady {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    CloseDataChannelRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    PeerDataChannels {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        send_stream_id: u16,
        recv_stream_id: u16,
    },
    StreamerDataChannels {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        player_id: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sfu_id: Option<String>,
        send_stream_id: u16,
        recv_stream_id: u16,
    },
    StreamerDataChannelsClosed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        player_id: PlayerId,
    },

    #[serde(rename = "playerId")]
    AssignedId {
        player_id: PlayerId,
    },
    PlayerCount {
        count: usize,
    },
    PlayerConnected {
        player_id: PlayerId,
        #[serde(default)]
        data_channel: bool,
        #[serde(default)]
        sfu: bool,
    },
    PlayerDisconnected {
        player_id: PlayerId,
    },
    PlayerGoingAway {
        player_id: PlayerId,
    },
    ListStreamers,
    StreamerList {
        ids: Vec<SceneId>,
    },
    Stats {
        #[serde(default)]
        data: Value,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene_id: Option<SceneId>,
        player_id: PlayerId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl Envelope {
    /// Parses a text frame, separating non-JSON input from well-formed but unsupported messages.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;
        serde_json::from_value(value).map_err(ProtocolError::Unsupported)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Unsupported)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Config { .. } => "config",
            Envelope::Identify => "identify",
            Envelope::EndpointId { .. } => "endpointId",
            Envelope::Ping { .. } => "ping",
            Envelope::Pong { .. } => "pong",
            Envelope::Offer { .. } => "offer",
            Envelope::Answer { .. } => "answer",
            Envelope::IceCandidate { .. } => "iceCandidate",
            Envelope::DisconnectPlayer { .. } => "disconnectPlayer",
            Envelope::DisconnectScene { .. } => "disconnectScene",
            Envelope::StreamerDataChannelsFailed { .. } => "streamerDataChannelsFailed",
            Envelope::SfuConnected => "sfuConnected",
            Envelope::SfuDisconnected => "sfuDisconnected",
            Envelope::StreamerReady { .. } => "streamerReady",
            Envelope::StreamerDisconnected { .. } => "streamerDisconnected",
            Envelope::UserInfo { .. } => "userInfo",
            Envelope::Subscribe { .. } => "subscribe",
            Envelope::SceneConnected { .. } => "sceneConnected",
            Envelope::SceneDisconnected { .. } => "sceneDisconnected",
            Envelope::DataChannelRequest { .. } => "dataChannelRequest",
            Envelope::PeerDataChannelsReady { .. } => "peerDataChannelsReady",
            Envelope::CloseDataChannelRequest { .. } => "closeDataChannelRequest",
            Envelope::PeerDataChannels { .. } => "peerDataChannels",
            Envelope::StreamerDataChannels { .. } => "streamerDataChannels",
            Envelope::StreamerDataChannelsClosed { .. } => "streamerDataChannelsClosed",
            Envelope::AssignedId { .. } => "playerId",
            Envelope::PlayerCount { .. } => "playerCount",
            Envelope::PlayerConnected { .. } => "playerConnected",
            Envelope::PlayerDisconnected { .. } => "playerDisconnected",
            Envelope::PlayerGoingAway { .. } => "playerGoingAway",
            Envelope::ListStreamers => "listStreamers",
            Envelope::StreamerList { .. } => "streamerList",
            Envelope::Stats { .. } => "stats",
            Envelope::Error { .. } => "error",
        }
    }

    /// Scene the frame is addressed to, if the message type carries one.
    pub fn scene_id(&self) -> Option<&SceneId> {
        match self {
            Envelope::Offer { scene_id, .. }
            | Envelope::Answer { scene_id, .. }
            | Envelope::IceCandidate { scene_id, .. }
            | Envelope::DisconnectScene { scene_id }
            | Envelope::StreamerDataChannelsFailed { scene_id, .. }
            | Envelope::StreamerDisconnected { scene_id }
            | Envelope::Subscribe { scene_id, .. }
            | Envelope::SceneConnected { scene_id, .. }
            | Envelope::SceneDisconnected { scene_id, .. }
            | Envelope::DataChannelRequest { scene_id, .. }
            | Envelope::PeerDataChannelsReady { scene_id, .. }
            | Envelope::CloseDataChannelRequest { scene_id, .. }
            | Envelope::PeerDataChannels { scene_id, .. }
            | Envelope::StreamerDataChannels { scene_id, .. }
            | Envelope::StreamerDataChannelsClosed { scene_id, .. }
            | Envelope::Error { scene_id, .. } => scene_id.as_ref(),
            Envelope::StreamerReady { scene_id } => Some(scene_id),
            _ => None,
        }
    }

    /// Viewer the frame is addressed to, if the message type carries one.
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            Envelope::Offer { player_id, .. }
            | Envelope::Answer { player_id, .. }
            | Envelope::IceCandidate { player_id, .. }
            | Envelope::Subscribe { player_id, .. }
            | Envelope::SceneConnected { player_id, .. }
            | Envelope::SceneDisconnected { player_id, .. }
            | Envelope::DataChannelRequest { player_id, .. }
            | Envelope::PeerDataChannelsReady { player_id, .. }
            | Envelope::CloseDataChannelRequest { player_id, .. }
            | Envelope::PeerDataChannels { player_id, .. } => *player_id,
            Envelope::DisconnectPlayer { player_id, .. }
            | Envelope::StreamerDataChannelsFailed { player_id, .. }
            | Envelope::StreamerDataChannels { player_id, .. }
            | Envelope::StreamerDataChannelsClosed { player_id, .. }
            | Envelope::AssignedId { player_id }
            | Envelope::PlayerConnected { player_id, .. }
            | Envelope::PlayerDisconnected { player_id }
            | Envelope::PlayerGoingAway { player_id }
            | Envelope::Error { player_id, .. } => Some(*player_id),
            _ => None,
        }
    }

    /// Overwrites the optional `playerId` field. Returns false for types that have none.
    pub fn stamp_player(&mut self, id: Option<PlayerId>) -> bool {
        match self {
            Envelope::Offer { player_id, .. }
            | Envelope::Answer { player_id, .. }
            | Envelope::IceCandidate { player_id, .. }
            | Envelope::Subscribe { player_id, .. }
            | Envelope::SceneConnected { player_id, .. }
            | Envelope::SceneDisconnected { player_id, .. }
            | Envelope::DataChannelRequest { player_id, .. }
            | Envelope::PeerDataChannelsReady { player_id, .. }
            | Envelope::CloseDataChannelRequest { player_id, .. }
            | Envelope::PeerDataChannels { player_id, .. } => {
                *player_id = id;
                true
            }
            _ => false,
        }
    }

    /// Overwrites the optional `sceneId` field. Returns false for types that have none.
    pub fn stamp_scene(&mut self, id: Option<SceneId>) -> bool {
        match self {
            Envelope::Offer { scene_id, .. }
            | Envelope::Answer { scene_id, .. }
            | Envelope::IceCandidate { scene_id, .. }
            | Envelope::DisconnectScene { scene_id }
            | Envelope::StreamerDataChannelsFailed { scene_id, .. }
            | Envelope::StreamerDisconnected { scene_id }
            | Envelope::StreamerDataChannels { scene_id, .. }
            | Envelope::StreamerDataChannelsClosed { scene_id, .. } => {
                *scene_id = id;
                true
            }
            _ => false,
        }
    }
}

/// One row of the HTTP scene listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub scene_id: SceneId,
    pub camera_mode: CameraMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "sceneList")]
pub struct SceneListing {
    pub scenes: Vec<SceneSummary>,
}
