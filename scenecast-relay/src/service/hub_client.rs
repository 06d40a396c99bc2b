use super::{HubNotifier, RelayService};
use crate::config::RelayConfig;
use crate::engine::{EngineEvent, RelayEngine};
use crate::room::{RoomManager, RoomObserver};
use crate::RelayError;
use futures::{SinkExt, StreamExt};
use scenecast_core::Envelope;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type HubSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Keeps the relay registered with the hub.
///
/// Rooms never outlive the hub link: every disconnect drops all of them, and
/// the render hosts re-publish once the relay is back.
pub struct HubClient {
    config: RelayConfig,
    service: RelayService,
    outbox: mpsc::UnboundedReceiver<Envelope>,
    engine_events: broadcast::Receiver<EngineEvent>,
}

impl HubClient {
    pub fn new(config: RelayConfig, engine: Arc<dyn RelayEngine>) -> Self {
        let (notifier, outbox) = HubNotifier::new();
        let observer: Arc<dyn RoomObserver> = Arc::new(notifier);
        let engine_events = engine.events();
        let rooms = RoomManager::new(engine, observer.clone(), config.room_settings());
        Self {
            config,
            service: RelayService::new(rooms, observer),
            outbox,
            engine_events,
        }
    }

    pub fn service(&self) -> &RelayService {
        &self.service
    }

    /// Runs until the engine reports a fatal failure.
    pub async fn run(mut self) -> Result<(), RelayError> {
        let result = self.connect_loop().await;
        self.service.rooms().delete_all_rooms().await;
        result
    }

    async fn connect_loop(&mut self) -> Result<(), RelayError> {
        loop {
            match connect_async(self.config.hub_url.as_str()).await {
                Ok((socket, _)) => {
                    info!(url = %self.config.hub_url, "Connected to hub");
                    let outcome = self.session(socket).await;
                    self.service.rooms().delete_all_rooms().await;
                    outcome?;
                    warn!("Lost connection to hub");
                }
                Err(e) => warn!(url = %self.config.hub_url, "Failed to reach hub: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.reconnect_delay()) => {}
                event = self.engine_events.recv() => Self::check_engine(event)?,
            }
        }
    }

    async fn session(&mut self, socket: HubSocket) -> Result<(), RelayError> {
        // Notifications from rooms that no longer exist.
        while self.outbox.try_recv().is_ok() {}

        let (mut sink, mut stream) = socket.split();
        loop {
            tokio::select! {
                outgoing = self.outbox.recv() => {
                    let Some(msg) = outgoing else {
                        return Ok(());
                    };
                    match msg.to_json() {
                        Ok(json) => {
                            if let Err(e) = sink.send(Message::Text(json.into())).await {
                                warn!("Failed to write to hub: {}", e);
                                return Ok(());
                            }
                        }
                        Err(e) => error!(kind = msg.kind(), "Failed to serialize: {}", e),
                    }
                }

                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Text(text))) => match Envelope::parse(text.as_str()) {
                        Ok(msg) => {
                            debug!(kind = msg.kind(), "From hub");
                            self.service.handle(msg).await;
                        }
                        Err(e) => warn!("Ignoring hub frame: {}", e),
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "Hub closed the connection");
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Hub socket error: {}", e);
                        return Ok(());
                    }
                    None => return Ok(()),
                },

                event = self.engine_events.recv() => Self::check_engine(event)?,
            }
        }
    }

    fn check_engine(event: Result<EngineEvent, broadcast::error::RecvError>) -> Result<(), RelayError> {
        match event {
            Ok(EngineEvent::WorkerDied(worker)) => {
                error!(%worker, "Relay worker died");
                Err(RelayError::WorkerDied(worker))
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Missed engine events");
                Ok(())
            }
            Err(broadcast::error::RecvError::Closed) => Err(RelayError::EngineGone),
        }
    }
}

/// Connects to the hub described by `config` and serves it until a fatal engine failure.
pub async fn run_relay(config: RelayConfig, engine: Arc<dyn RelayEngine>) -> Result<(), RelayError> {
    config.validate()?;
    HubClient::new(config, engine).run().await
}
