use super::*;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Engine operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum FailPoint {
    CreateWorker,
    CreateRouter,
    CreateTransport,
    Publish,
    PipeProducer,
    Subscribe,
    ApplyAnswer,
    CreateDataProducer,
    PipeDataProducer,
    CreateDataConsumer,
    Close,
}

impl FailPoint {
    fn op(self) -> &'static str {
        match self {
            FailPoint::CreateWorker => "create_worker",
            FailPoint::CreateRouter => "create_router",
            FailPoint::CreateTransport => "create_transport",
            FailPoint::Publish => "publish",
            FailPoint::PipeProducer => "pipe_producer",
            FailPoint::Subscribe => "subscribe",
            FailPoint::ApplyAnswer => "apply_answer",
            FailPoint::CreateDataProducer => "create_data_producer",
            FailPoint::PipeDataProducer => "pipe_data_producer",
            FailPoint::CreateDataConsumer => "create_data_consumer",
            FailPoint::Close => "close",
        }
    }
}

/// In-process engine that tracks resource lifetimes without moving media.
///
/// It rejects a stream id that is already bound on the same transport, so
/// allocator mistakes surface as errors instead of silent channel crosstalk.
pub struct MemoryEngine {
    next_id: AtomicU64,
    live: DashSet<ResourceId>,
    streams: DashMap<ResourceId, (TransportId, u16)>,
    failures: DashSet<FailPoint>,
    slot_capacity: u16,
    tracks_per_offer: usize,
    events: broadcast::Sender<EngineEvent>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::with_slot_capacity(1024)
    }

    pub fn with_slot_capacity(slot_capacity: u16) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            next_id: AtomicU64::new(1),
            live: DashSet::new(),
            streams: DashMap::new(),
            failures: DashSet::new(),
            slot_capacity,
            // audio + video
            tracks_per_offer: 2,
            events,
        }
    }

    pub fn fail_on(&self, point: FailPoint) {
        self.failures.insert(point);
    }

    pub fn clear_failure(&self, point: FailPoint) {
        self.failures.remove(&point);
    }

    /// Number of resources created and not yet closed.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, resource: impl Into<ResourceId>) -> bool {
        self.live.contains(&resource.into())
    }

    /// Stream ids currently bound on `transport`, sorted.
    pub fn bound_streams(&self, transport: TransportId) -> Vec<u16> {
        let mut ids: Vec<u16> = self
            .streams
            .iter()
            .filter(|entry| entry.value().0 == transport)
            .map(|entry| entry.value().1)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Simulates a worker process crash.
    pub fn kill_worker(&self, worker: WorkerId) {
        self.live.remove(&ResourceId::from(worker));
        let _ = self.events.send(EngineEvent::WorkerDied(worker));
    }

    fn check(&self, point: FailPoint) -> Result<(), EngineError> {
        if self.failures.contains(&point) {
            return Err(EngineError::Rejected {
                op: point.op(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn require(&self, resource: impl Into<ResourceId>) -> Result<(), EngineError> {
        let resource = resource.into();
        if self.live.contains(&resource) {
            Ok(())
        } else {
            Err(EngineError::UnknownResource(resource))
        }
    }

    fn mint<T: Copy + Into<ResourceId>>(&self, make: impl FnOnce(u64) -> T) -> T {
        let id = make(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.live.insert(id.into());
        id
    }

    fn bind_stream(
        &self,
        op: &'static str,
        transport: TransportId,
        stream_id: u16,
    ) -> Result<(), EngineError> {
        if stream_id >= self.slot_capacity {
            return Err(EngineError::Rejected {
                op,
                reason: format!("stream id {} out of range", stream_id),
            });
        }
        let taken = self
            .streams
            .iter()
            .any(|entry| *entry.value() == (transport, stream_id));
        if taken {
            return Err(EngineError::Rejected {
                op,
                reason: format!("stream id {} already bound on {}", stream_id, transport),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RelayEngine for MemoryEngine {
    async fn create_worker(&self) -> Result<WorkerId, EngineError> {
        self.check(FailPoint::CreateWorker)?;
        Ok(self.mint(WorkerId))
    }

    async fn create_router(&self, worker: WorkerId) -> Result<RouterId, EngineError> {
        self.check(FailPoint::CreateRouter)?;
        self.require(worker)?;
        Ok(self.mint(RouterId))
    }

    async fn create_transport(&self, router: RouterId) -> Result<TransportInfo, EngineError> {
        self.check(FailPoint::CreateTransport)?;
        self.require(router)?;
        Ok(TransportInfo {
            id: self.mint(TransportId),
            slot_capacity: self.slot_capacity,
        })
    }

    async fn publish(&self, transport: TransportId, offer: &str) -> Result<Published, EngineError> {
        self.check(FailPoint::Publish)?;
        self.require(transport)?;
        if offer.trim().is_empty() {
            return Err(EngineError::Rejected {
                op: "publish",
                reason: "empty offer".to_string(),
            });
        }
        let producers = (0..self.tracks_per_offer)
            .map(|_| self.mint(ProducerId))
            .collect();
        Ok(Published {
            producers,
            answer: format!("v=0\r\ns=answer {}\r\n", transport),
        })
    }

    async fn pipe_producer(
        &self,
        producer: ProducerId,
        from: RouterId,
        to: RouterId,
    ) -> Result<ProducerId, EngineError> {
        self.check(FailPoint::PipeProducer)?;
        self.require(producer)?;
        self.require(from)?;
        self.require(to)?;
        Ok(self.mint(ProducerId))
    }

    async fn subscribe(
        &self,
        transport: TransportId,
        producers: &[ProducerId],
    ) -> Result<Subscription, EngineError> {
        self.check(FailPoint::Subscribe)?;
        self.require(transport)?;
        for producer in producers {
            self.require(*producer)?;
        }
        let consumers = producers.iter().map(|_| self.mint(ConsumerId)).collect();
        Ok(Subscription {
            consumers,
            offer: format!("v=0\r\ns=offer {}\r\n", transport),
        })
    }

    async fn apply_answer(&self, transport: TransportId, answer: &str) -> Result<(), EngineError> {
        self.check(FailPoint::ApplyAnswer)?;
        self.require(transport)?;
        if answer.trim().is_empty() {
            return Err(EngineError::Rejected {
                op: "apply_answer",
                reason: "empty answer".to_string(),
            });
        }
        Ok(())
    }

    async fn create_data_producer(
        &self,
        transport: TransportId,
        stream_id: u16,
    ) -> Result<DataProducerId, EngineError> {
        self.check(FailPoint::CreateDataProducer)?;
        self.require(transport)?;
        self.bind_stream("create_data_producer", transport, stream_id)?;
        let id = self.mint(DataProducerId);
        self.streams.insert(id.into(), (transport, stream_id));
        Ok(id)
    }

    async fn pipe_data_producer(
        &self,
        producer: DataProducerId,
        from: RouterId,
        to: RouterId,
    ) -> Result<DataProducerId, EngineError> {
        self.check(FailPoint::PipeDataProducer)?;
        self.require(producer)?;
        self.require(from)?;
        self.require(to)?;
        Ok(self.mint(DataProducerId))
    }

    async fn create_data_consumer(
        &self,
        transport: TransportId,
        producer: DataProducerId,
        stream_id: u16,
    ) -> Result<DataConsumerId, EngineError> {
        self.check(FailPoint::CreateDataConsumer)?;
        self.require(transport)?;
        self.require(producer)?;
        self.bind_stream("create_data_consumer", transport, stream_id)?;
        let id = self.mint(DataConsumerId);
        self.streams.insert(id.into(), (transport, stream_id));
        Ok(id)
    }

    async fn close(&self, resource: ResourceId) -> Result<(), EngineError> {
        self.check(FailPoint::Close)?;
        if self.live.remove(&resource).is_none() {
            return Err(EngineError::UnknownResource(resource));
        }
        self.streams.remove(&resource);
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}
