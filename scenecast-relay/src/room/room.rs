use super::{
    DataChannels, DataPath, Peer, RoomCommand, RoomObserver, RoomSnapshot, Worker, shard_for,
};
use crate::engine::{ProducerId, RelayEngine, ResourceId, RouterId, TransportId, WorkerId, close_all};
use crate::slots::StreamSlotAllocator;
use crate::RelayError;
use scenecast_core::{PlayerId, SceneId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub worker_count: usize,
    pub slot_capacity: u16,
    pub reserved_slots: Vec<u16>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            worker_count: 3,
            slot_capacity: 1024,
            reserved_slots: vec![1023],
        }
    }
}

impl RoomSettings {
    fn slots(&self, negotiated: u16) -> StreamSlotAllocator {
        StreamSlotAllocator::new(negotiated.min(self.slot_capacity), &self.reserved_slots)
    }
}

/// The render host's side of a room.
struct Source {
    worker: WorkerId,
    router: RouterId,
    transport: TransportId,
    producers: Vec<ProducerId>,
    slots: StreamSlotAllocator,
}

/// Per-scene actor. Commands run strictly one after another, so no two
/// lifecycle operations on the same scene ever overlap.
pub struct Room {
    scene_id: SceneId,
    engine: Arc<dyn RelayEngine>,
    observer: Arc<dyn RoomObserver>,
    settings: RoomSettings,
    command_rx: mpsc::Receiver<RoomCommand>,
    source: Option<Source>,
    workers: Vec<Worker>,
}

impl Room {
    pub fn new(
        scene_id: SceneId,
        engine: Arc<dyn RelayEngine>,
        observer: Arc<dyn RoomObserver>,
        settings: RoomSettings,
        command_rx: mpsc::Receiver<RoomCommand>,
    ) -> Self {
        Self {
            scene_id,
            engine,
            observer,
            settings,
            command_rx,
            source: None,
            workers: Vec::new(),
        }
    }

    pub async fn run(mut self) {
        info!(scene = %self.scene_id, "Room started");

        while let Some(command) = self.command_rx.recv().await {
            if !self.handle_command(command).await {
                break;
            }
        }

        info!(scene = %self.scene_id, "Room stopped");
    }

    /// Returns false once the room has shut down.
    async fn handle_command(&mut self, command: RoomCommand) -> bool {
        debug!(scene = %self.scene_id, command = command.kind(), "Room command");
        match command {
            RoomCommand::Publish { offer } => self.publish(&offer).await,
            RoomCommand::AddViewer { player } => self.add_viewer(player).await,
            RoomCommand::ViewerAnswer { player, sdp } => self.apply_answer(player, &sdp).await,
            RoomCommand::RemoveViewer { player } => {
                if !self.remove_viewer(player).await {
                    debug!(scene = %self.scene_id, %player, "Viewer not in room");
                }
            }
            RoomCommand::OpenDataChannels { player } => self.open_data_channels(player).await,
            RoomCommand::DataChannelsReady { player } => self.announce_data_channels(player).await,
            RoomCommand::CloseDataChannels { player } => self.close_data_channels(player).await,
            RoomCommand::Inspect { reply } => {
                let _ = reply.send(self.snapshot());
            }
            RoomCommand::Shutdown { done } => {
                self.tear_down().await;
                self.drain_stale();
                let _ = done.send(());
                return false;
            }
        }
        true
    }

    /// Commands that were queued behind a shutdown become no-ops.
    fn drain_stale(&mut self) {
        self.command_rx.close();
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                RoomCommand::Shutdown { done } => {
                    let _ = done.send(());
                }
                RoomCommand::Inspect { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                stale => {
                    debug!(scene = %self.scene_id, command = stale.kind(), "Dropping command for closed room");
                }
            }
        }
    }

    async fn publish(&mut self, offer: &str) {
        if self.source.is_some() {
            info!(scene = %self.scene_id, "Render host re-published, rebuilding room");
            let dropped: Vec<PlayerId> = self.workers.iter().flat_map(Worker::viewers).collect();
            for player in dropped {
                self.observer
                    .on_viewer_failed(&self.scene_id, player, "render host re-published".to_string())
                    .await;
            }
            self.tear_down().await;
        }

        let mut created = Vec::new();
        match self.build(offer, &mut created).await {
            Ok(answer) => {
                info!(
                    scene = %self.scene_id,
                    workers = self.workers.len(),
                    "Room published"
                );
                self.observer.on_publish_answer(&self.scene_id, answer).await;
            }
            Err(e) => {
                error!(scene = %self.scene_id, "Failed to publish: {}", e);
                created.reverse();
                close_all(self.engine.as_ref(), created).await;
            }
        }
    }

    async fn build(
        &mut self,
        offer: &str,
        created: &mut Vec<ResourceId>,
    ) -> Result<String, RelayError> {
        let engine = self.engine.as_ref();

        let worker = engine.create_worker().await?;
        created.push(worker.into());
        let router = engine.create_router(worker).await?;
        created.push(router.into());
        let transport = engine.create_transport(router).await?;
        created.push(transport.id.into());
        let published = engine.publish(transport.id, offer).await?;
        created.extend(published.producers.iter().map(|id| ResourceId::from(*id)));

        let mut workers = Vec::with_capacity(self.settings.worker_count);
        for index in 0..self.settings.worker_count {
            workers.push(Worker::spawn(engine, index, router, &published.producers, created).await?);
        }

        self.source = Some(Source {
            worker,
            router,
            transport: transport.id,
            producers: published.producers,
            slots: self.settings.slots(transport.slot_capacity),
        });
        self.workers = workers;
        Ok(published.answer)
    }

    async fn add_viewer(&mut self, player: PlayerId) {
        if let Err(e) = self.try_add_viewer(player).await {
            warn!(scene = %self.scene_id, %player, "Failed to add viewer: {}", e);
            self.observer
                .on_viewer_failed(&self.scene_id, player, e.to_string())
                .await;
        }
    }

    async fn try_add_viewer(&mut self, player: PlayerId) -> Result<(), RelayError> {
        if self.source.is_none() || self.workers.is_empty() {
            return Err(RelayError::NotPublished(self.scene_id.clone()));
        }
        if self.remove_viewer(player).await {
            info!(scene = %self.scene_id, %player, "Viewer re-joined, replaced previous peer");
        }

        let engine = self.engine.clone();
        let index = shard_for(player, self.workers.len());
        let worker = &mut self.workers[index];

        let transport = engine.create_transport(worker.router).await?;
        let subscription = match engine.subscribe(transport.id, &worker.producers).await {
            Ok(subscription) => subscription,
            Err(e) => {
                close_all(engine.as_ref(), [ResourceId::from(transport.id)]).await;
                return Err(e.into());
            }
        };

        let slots = self.settings.slots(transport.slot_capacity);
        worker.peers.insert(
            player,
            Peer::new(player, transport.id, subscription.consumers, slots),
        );
        info!(scene = %self.scene_id, %player, shard = index, "Viewer added");

        self.observer
            .on_viewer_offer(&self.scene_id, player, subscription.offer)
            .await;
        Ok(())
    }

    async fn apply_answer(&mut self, player: PlayerId, sdp: &str) {
        let Some(peer) = self.peer(player) else {
            warn!(scene = %self.scene_id, %player, "Answer for unknown viewer");
            return;
        };
        let transport = peer.transport;
        if let Err(e) = self.engine.apply_answer(transport, sdp).await {
            warn!(scene = %self.scene_id, %player, "Viewer answer rejected: {}", e);
            self.observer
                .on_viewer_failed(&self.scene_id, player, e.to_string())
                .await;
        }
    }

    async fn remove_viewer(&mut self, player: PlayerId) -> bool {
        let Some(worker) = self
            .workers
            .iter_mut()
            .find(|worker| worker.peers.contains_key(&player))
        else {
            return false;
        };
        let Some(peer) = worker.peers.remove(&player) else {
            return false;
        };
        let host_slots = self.source.as_mut().map(|source| &mut source.slots);
        peer.close(self.engine.as_ref(), host_slots).await;
        info!(scene = %self.scene_id, %player, "Viewer removed");
        true
    }

    async fn open_data_channels(&mut self, player: PlayerId) {
        let engine = self.engine.clone();
        let Some(source) = self.source.as_mut() else {
            debug!(scene = %self.scene_id, %player, "Data channels requested before publish");
            return;
        };
        let Some(worker) = self
            .workers
            .iter_mut()
            .find(|worker| worker.peers.contains_key(&player))
        else {
            debug!(scene = %self.scene_id, %player, "Data channels requested for unknown viewer");
            return;
        };
        let router = worker.router;
        let Some(peer) = worker.peers.get_mut(&player) else {
            return;
        };

        if let Some(streams) = peer.peer_streams() {
            debug!(scene = %self.scene_id, %player, "Data channels already open");
            self.observer
                .on_peer_data_channels(&self.scene_id, player, streams)
                .await;
            return;
        }

        let path = DataPath {
            host_transport: source.transport,
            host_router: source.router,
            viewer_transport: peer.transport,
            viewer_router: router,
        };
        match DataChannels::open(engine.as_ref(), path, &mut source.slots, &mut peer.slots).await {
            Ok(data) => {
                let streams = data.peer;
                peer.data = Some(data);
                info!(
                    scene = %self.scene_id,
                    %player,
                    send = streams.send,
                    recv = streams.recv,
                    "Data channels open"
                );
                self.observer
                    .on_peer_data_channels(&self.scene_id, player, streams)
                    .await;
            }
            Err(e) => {
                warn!(scene = %self.scene_id, %player, "Failed to open data channels: {}", e);
                self.observer
                    .on_viewer_failed(&self.scene_id, player, e.to_string())
                    .await;
            }
        }
    }

    async fn announce_data_channels(&mut self, player: PlayerId) {
        let Some(peer) = self.peer_mut(player) else {
            return;
        };
        let Some(data) = peer.data.as_mut() else {
            debug!(%player, "Viewer ready before data channels were opened");
            return;
        };
        if data.announced {
            return;
        }
        data.announced = true;
        let streams = data.streamer;
        self.observer
            .on_streamer_data_channels(&self.scene_id, player, streams)
            .await;
    }

    async fn close_data_channels(&mut self, player: PlayerId) {
        let engine = self.engine.clone();
        let host_slots = self.source.as_mut().map(|source| &mut source.slots);
        let Some(peer) = self
            .workers
            .iter_mut()
            .find_map(|worker| worker.peers.get_mut(&player))
        else {
            return;
        };
        if peer.close_data_channels(engine.as_ref(), host_slots).await {
            info!(scene = %self.scene_id, %player, "Data channels closed");
            self.observer
                .on_data_channels_closed(&self.scene_id, player)
                .await;
        }
    }

    /// Releases every engine resource the room holds. Viewers go first since
    /// their data channels hold slots on the render host's transport.
    async fn tear_down(&mut self) {
        let engine = self.engine.clone();
        let mut source = self.source.take();
        for worker in self.workers.drain(..) {
            worker
                .close(engine.as_ref(), source.as_mut().map(|source| &mut source.slots))
                .await;
        }
        if let Some(source) = source {
            let resources: Vec<ResourceId> = source
                .producers
                .iter()
                .map(|id| ResourceId::from(*id))
                .chain([
                    ResourceId::from(source.transport),
                    ResourceId::from(source.router),
                    ResourceId::from(source.worker),
                ])
                .collect();
            close_all(engine.as_ref(), resources).await;
            info!(scene = %self.scene_id, "Room torn down");
        }
    }

    fn peer(&self, player: PlayerId) -> Option<&Peer> {
        self.workers
            .iter()
            .find_map(|worker| worker.peers.get(&player))
    }

    fn peer_mut(&mut self, player: PlayerId) -> Option<&mut Peer> {
        self.workers
            .iter_mut()
            .find_map(|worker| worker.peers.get_mut(&player))
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            scene_id: self.scene_id.clone(),
            published: self.source.is_some(),
            producers: self
                .source
                .as_ref()
                .map_or(0, |source| source.producers.len()),
            shards: self.workers.iter().map(Worker::viewers).collect(),
            host_slots_in_use: self
                .source
                .as_ref()
                .map_or(0, |source| source.slots.in_use()),
        }
    }
}
