use super::{DataChannels, StreamPair};
use crate::engine::{ConsumerId, RelayEngine, ResourceId, TransportId, close_all};
use crate::slots::StreamSlotAllocator;
use scenecast_core::PlayerId;

/// A viewer attached to one worker shard.
#[derive(Debug)]
pub struct Peer {
    pub player: PlayerId,
    pub transport: TransportId,
    pub consumers: Vec<ConsumerId>,
    /// Stream ids on `transport`.
    pub slots: StreamSlotAllocator,
    pub data: Option<DataChannels>,
}

impl Peer {
    pub fn new(
        player: PlayerId,
        transport: TransportId,
        consumers: Vec<ConsumerId>,
        slots: StreamSlotAllocator,
    ) -> Self {
        Self {
            player,
            transport,
            consumers,
            slots,
            data: None,
        }
    }

    pub fn peer_streams(&self) -> Option<StreamPair> {
        self.data.as_ref().map(|data| data.peer)
    }

    pub fn streamer_streams(&self) -> Option<StreamPair> {
        self.data.as_ref().map(|data| data.streamer)
    }

    /// Tears down the data path. Host-side slots are returned to `host_slots`.
    pub async fn close_data_channels(
        &mut self,
        engine: &dyn RelayEngine,
        host_slots: Option<&mut StreamSlotAllocator>,
    ) -> bool {
        let Some(data) = self.data.take() else {
            return false;
        };
        let stranded = data.legs.tear_down(engine, host_slots, &mut self.slots).await;
        if stranded > 0 {
            tracing::warn!(player = %self.player, stranded, "Stream slots held after failed close");
        }
        true
    }

    /// Releases everything the peer owns on the engine.
    pub async fn close(
        mut self,
        engine: &dyn RelayEngine,
        host_slots: Option<&mut StreamSlotAllocator>,
    ) {
        self.close_data_channels(engine, host_slots).await;
        let resources: Vec<ResourceId> = self
            .consumers
            .iter()
            .map(|id| ResourceId::from(*id))
            .chain(std::iter::once(ResourceId::from(self.transport)))
            .collect();
        close_all(engine, resources).await;
    }
}
