//! Seam between room orchestration and the media engine that actually moves
//! RTP and SCTP. Rooms only ever talk to [`RelayEngine`].

mod memory_engine;

pub use memory_engine::*;

use crate::EngineError;
use async_trait::async_trait;
use std::fmt;
use tokio::sync::broadcast;

macro_rules! engine_id {
    ($($name:ident => $prefix:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!($prefix, "-{}"), self.0)
                }
            }

            impl From<$name> for ResourceId {
                fn from(id: $name) -> Self {
                    ResourceId::$name(id)
                }
            }
        )*

        #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
        pub enum ResourceId {
            $($name($name),)*
        }

        impl fmt::Display for ResourceId {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(ResourceId::$name(id) => id.fmt(f),)*
                }
            }
        }
    };
}

engine_id! {
    WorkerId => "worker",
    RouterId => "router",
    TransportId => "transport",
    ProducerId => "producer",
    ConsumerId => "consumer",
    DataProducerId => "data-producer",
    DataConsumerId => "data-consumer",
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportInfo {
    pub id: TransportId,
    /// Number of SCTP stream ids the transport negotiated.
    pub slot_capacity: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub producers: Vec<ProducerId>,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub consumers: Vec<ConsumerId>,
    pub offer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    WorkerDied(WorkerId),
}

#[async_trait]
pub trait RelayEngine: Send + Sync + 'static {
    async fn create_worker(&self) -> Result<WorkerId, EngineError>;

    async fn create_router(&self, worker: WorkerId) -> Result<RouterId, EngineError>;

    async fn create_transport(&self, router: RouterId) -> Result<TransportInfo, EngineError>;

    /// Accepts a render host's offer on `transport`, producing its tracks.
    async fn publish(&self, transport: TransportId, offer: &str) -> Result<Published, EngineError>;

    async fn pipe_producer(
        &self,
        producer: ProducerId,
        from: RouterId,
        to: RouterId,
    ) -> Result<ProducerId, EngineError>;

    /// Consumes `producers` on a viewer transport and returns the offer for that viewer.
    async fn subscribe(
        &self,
        transport: TransportId,
        producers: &[ProducerId],
    ) -> Result<Subscription, EngineError>;

    async fn apply_answer(&self, transport: TransportId, answer: &str) -> Result<(), EngineError>;

    async fn create_data_producer(
        &self,
        transport: TransportId,
        stream_id: u16,
    ) -> Result<DataProducerId, EngineError>;

    async fn pipe_data_producer(
        &self,
        producer: DataProducerId,
        from: RouterId,
        to: RouterId,
    ) -> Result<DataProducerId, EngineError>;

    async fn create_data_consumer(
        &self,
        transport: TransportId,
        producer: DataProducerId,
        stream_id: u16,
    ) -> Result<DataConsumerId, EngineError>;

    /// Resolves once the engine has released `resource`, including any stream id it held.
    async fn close(&self, resource: ResourceId) -> Result<(), EngineError>;

    fn events(&self) -> broadcast::Receiver<EngineEvent>;
}

/// Closes `resources` in order, returning how many failed to close.
pub async fn close_all(
    engine: &dyn RelayEngine,
    resources: impl IntoIterator<Item = ResourceId>,
) -> usize {
    let mut failed = 0;
    for resource in resources {
        if let Err(e) = engine.close(resource).await {
            tracing::warn!(%resource, "Failed to close relay resource: {}", e);
            failed += 1;
        }
    }
    failed
}
