use scenecast_core::{PlayerId, SceneId};
use tokio::sync::oneshot;

/// Commands a room actor executes one at a time, in arrival order.
#[derive(Debug)]
pub enum RoomCommand {
    /// The render host sent a new offer. Any previous publication is torn down first.
    Publish { offer: String },

    /// Attach a viewer to its shard and produce an offer for it.
    AddViewer { player: PlayerId },

    ViewerAnswer { player: PlayerId, sdp: String },

    RemoveViewer { player: PlayerId },

    OpenDataChannels { player: PlayerId },

    /// The viewer has its side of the data channels up.
    DataChannelsReady { player: PlayerId },

    CloseDataChannels { player: PlayerId },

    Inspect { reply: oneshot::Sender<RoomSnapshot> },

    /// Release every engine resource, then acknowledge on `done`.
    Shutdown { done: oneshot::Sender<()> },
}

impl RoomCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            RoomCommand::Publish { .. } => "publish",
            RoomCommand::AddViewer { .. } => "add_viewer",
            RoomCommand::ViewerAnswer { .. } => "viewer_answer",
            RoomCommand::RemoveViewer { .. } => "remove_viewer",
            RoomCommand::OpenDataChannels { .. } => "open_data_channels",
            RoomCommand::DataChannelsReady { .. } => "data_channels_ready",
            RoomCommand::CloseDataChannels { .. } => "close_data_channels",
            RoomCommand::Inspect { .. } => "inspect",
            RoomCommand::Shutdown { .. } => "shutdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub scene_id: SceneId,
    pub published: bool,
    pub producers: usize,
    /// Viewers per worker shard, sorted.
    pub shards: Vec<Vec<PlayerId>>,
    /// Data-channel slots held on the render host's transport.
    pub host_slots_in_use: usize,
}

impl RoomSnapshot {
    pub fn shard_of(&self, player: PlayerId) -> Option<usize> {
        self.shards.iter().position(|shard| shard.contains(&player))
    }

    pub fn viewer_count(&self) -> usize {
        self.shards.iter().map(Vec::len).sum()
    }
}
