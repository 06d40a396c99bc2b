use super::StreamPair;
use crate::engine::{RelayEngine, ResourceId, RouterId, TransportId};
use crate::slots::StreamSlotAllocator;
use crate::RelayError;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSide {
    Host,
    Viewer,
}

#[derive(Debug, Clone, Copy)]
struct Leg {
    resource: ResourceId,
    slot: Option<(SlotSide, u16)>,
}

/// Engine resources backing one viewer's data channels, in creation order.
#[derive(Debug, Default)]
pub struct LegSet {
    legs: Vec<Leg>,
}

impl LegSet {
    fn push(&mut self, resource: impl Into<ResourceId>, slot: Option<(SlotSide, u16)>) {
        self.legs.push(Leg {
            resource: resource.into(),
            slot,
        });
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Closes every leg newest first. A slot goes back to its allocator only
    /// after the engine confirms the leg holding it is gone; otherwise it stays
    /// allocated. Returns the number of slots left held.
    pub async fn tear_down(
        self,
        engine: &dyn RelayEngine,
        mut host_slots: Option<&mut StreamSlotAllocator>,
        viewer_slots: &mut StreamSlotAllocator,
    ) -> usize {
        let mut stranded = 0;
        for leg in self.legs.into_iter().rev() {
            match engine.close(leg.resource).await {
                Ok(()) => {
                    let released = match leg.slot {
                        Some((SlotSide::Host, slot)) => host_slots
                            .as_deref_mut()
                            .map(|slots| slots.release(slot)),
                        Some((SlotSide::Viewer, slot)) => Some(viewer_slots.release(slot)),
                        None => None,
                    };
                    if let Some(Err(e)) = released {
                        warn!(resource = %leg.resource, "Slot bookkeeping mismatch: {}", e);
                    }
                }
                Err(e) => {
                    warn!(resource = %leg.resource, "Data-channel leg did not close: {}", e);
                    if leg.slot.is_some() {
                        stranded += 1;
                    }
                }
            }
        }
        stranded
    }
}

/// A viewer's bidirectional data path through the relay.
#[derive(Debug)]
pub struct DataChannels {
    pub legs: LegSet,
    /// Ids on the viewer's transport.
    pub peer: StreamPair,
    /// Ids on the render host's transport.
    pub streamer: StreamPair,
    /// Whether the render host has been told about `streamer`.
    pub announced: bool,
}

/// Both ends a data path spans.
#[derive(Debug, Clone, Copy)]
pub struct DataPath {
    pub host_transport: TransportId,
    pub host_router: RouterId,
    pub viewer_transport: TransportId,
    pub viewer_router: RouterId,
}

impl DataChannels {
    /// Wires host to viewer and viewer to host. On failure every leg created so
    /// far is torn down before the error is returned.
    pub async fn open(
        engine: &dyn RelayEngine,
        path: DataPath,
        host_slots: &mut StreamSlotAllocator,
        viewer_slots: &mut StreamSlotAllocator,
    ) -> Result<Self, RelayError> {
        let mut legs = LegSet::default();
        match Self::wire(engine, &mut legs, host_slots, viewer_slots, path).await {
            Ok((peer, streamer)) => Ok(Self {
                legs,
                peer,
                streamer,
                announced: false,
            }),
            Err(e) => {
                legs.tear_down(engine, Some(host_slots), viewer_slots).await;
                Err(e)
            }
        }
    }

    async fn wire(
        engine: &dyn RelayEngine,
        legs: &mut LegSet,
        host_slots: &mut StreamSlotAllocator,
        viewer_slots: &mut StreamSlotAllocator,
        path: DataPath,
    ) -> Result<(StreamPair, StreamPair), RelayError> {
        // render host -> viewer
        let host_send = host_slots.allocate()?;
        let producer = match engine
            .create_data_producer(path.host_transport, host_send)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                let _ = host_slots.release(host_send);
                return Err(e.into());
            }
        };
        legs.push(producer, Some((SlotSide::Host, host_send)));
        let piped = engine
            .pipe_data_producer(producer, path.host_router, path.viewer_router)
            .await?;
        legs.push(piped, None);

        let viewer_recv = viewer_slots.allocate()?;
        match engine
            .create_data_consumer(path.viewer_transport, piped, viewer_recv)
            .await
        {
            Ok(id) => legs.push(id, Some((SlotSide::Viewer, viewer_recv))),
            Err(e) => {
                let _ = viewer_slots.release(viewer_recv);
                return Err(e.into());
            }
        }

        // viewer -> render host
        let viewer_send = viewer_slots.allocate()?;
        let producer = match engine
            .create_data_producer(path.viewer_transport, viewer_send)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                let _ = viewer_slots.release(viewer_send);
                return Err(e.into());
            }
        };
        legs.push(producer, Some((SlotSide::Viewer, viewer_send)));
        let piped = engine
            .pipe_data_producer(producer, path.viewer_router, path.host_router)
            .await?;
        legs.push(piped, None);

        let host_recv = host_slots.allocate()?;
        match engine
            .create_data_consumer(path.host_transport, piped, host_recv)
            .await
        {
            Ok(id) => legs.push(id, Some((SlotSide::Host, host_recv))),
            Err(e) => {
                let _ = host_slots.release(host_recv);
                return Err(e.into());
            }
        }

        Ok((
            StreamPair {
                send: viewer_send,
                recv: viewer_recv,
            },
            StreamPair {
                send: host_send,
                recv: host_recv,
            },
        ))
    }
}
