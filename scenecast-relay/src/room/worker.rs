use super::Peer;
use crate::engine::{ProducerId, RelayEngine, ResourceId, RouterId, WorkerId, close_all};
use crate::slots::StreamSlotAllocator;
use crate::RelayError;
use scenecast_core::PlayerId;
use std::collections::HashMap;

/// Shard a viewer lands on. Stable for a given player id and worker count.
pub fn shard_for(player: PlayerId, worker_count: usize) -> usize {
    player.value() as usize % worker_count.max(1)
}

/// One fan-out shard: a worker whose router mirrors every producer of the scene.
#[derive(Debug)]
pub struct Worker {
    pub index: usize,
    pub worker: WorkerId,
    pub router: RouterId,
    /// Pipes of the scene's producers into `router`.
    pub producers: Vec<ProducerId>,
    pub peers: HashMap<PlayerId, Peer>,
}

impl Worker {
    /// Brings up a shard and pipes `sources` into it. Whatever was created is
    /// recorded in `created` so a failed publish can be unwound.
    pub async fn spawn(
        engine: &dyn RelayEngine,
        index: usize,
        source_router: RouterId,
        sources: &[ProducerId],
        created: &mut Vec<ResourceId>,
    ) -> Result<Self, RelayError> {
        let worker = engine.create_worker().await?;
        created.push(worker.into());
        let router = engine.create_router(worker).await?;
        created.push(router.into());

        let mut producers = Vec::with_capacity(sources.len());
        for source in sources {
            let piped = engine.pipe_producer(*source, source_router, router).await?;
            created.push(piped.into());
            producers.push(piped);
        }

        Ok(Self {
            index,
            worker,
            router,
            producers,
            peers: HashMap::new(),
        })
    }

    pub fn viewers(&self) -> Vec<PlayerId> {
        let mut viewers: Vec<PlayerId> = self.peers.keys().copied().collect();
        viewers.sort();
        viewers
    }

    /// Closes every peer, then the pipes, router and worker.
    pub async fn close(
        mut self,
        engine: &dyn RelayEngine,
        mut host_slots: Option<&mut StreamSlotAllocator>,
    ) {
        for (_, peer) in self.peers.drain() {
            peer.close(engine, host_slots.as_deref_mut()).await;
        }
        let resources: Vec<ResourceId> = self
            .producers
            .iter()
            .map(|id| ResourceId::from(*id))
            .chain([ResourceId::from(self.router), ResourceId::from(self.worker)])
            .collect();
        close_all(engine, resources).await;
    }
}
