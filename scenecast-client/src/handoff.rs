use crate::{
    HandoffConfig, HandoffError, HandoffEvent, SceneConnector, SceneLink, decode_handoff_frame,
};
use scenecast_core::{CloseCode, HandoffMessage, SceneId};
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffState {
    Idle,
    /// Shadow connection to the target is being opened.
    Preparing(SceneId),
    /// Shadow connection is up and waiting for a commit.
    Prepared(SceneId),
    /// Shadow is being promoted to live.
    Switching(SceneId),
}

impl HandoffState {
    /// The scene a prepare is outstanding for.
    pub fn pending_target(&self) -> Option<&SceneId> {
        match self {
            HandoffState::Preparing(scene) | HandoffState::Prepared(scene) => Some(scene),
            HandoffState::Idle | HandoffState::Switching(_) => None,
        }
    }
}

enum HandoffCommand {
    Prepare(SceneId),
    Commit(SceneId),
    Cancel(SceneId),
    State(oneshot::Sender<HandoffState>),
    LiveScene(oneshot::Sender<SceneId>),
}

struct ConnectOutcome {
    epoch: u64,
    scene: SceneId,
    result: Result<Arc<dyn SceneLink>, HandoffError>,
}

/// Handle to a viewer's scene hand-off session.
///
/// Requests are applied one at a time by a background task; results arrive on
/// the event receiver returned from [`SceneHandoff::spawn`].
#[derive(Clone)]
pub struct SceneHandoff {
    commands: mpsc::UnboundedSender<HandoffCommand>,
}

impl SceneHandoff {
    pub fn spawn(
        connector: Arc<dyn SceneConnector>,
        live: Arc<dyn SceneLink>,
        config: HandoffConfig,
    ) -> (Self, mpsc::UnboundedReceiver<HandoffEvent>) {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();
        let (outcomes, outcomes_rx) = mpsc::unbounded_channel();

        let session = HandoffSession {
            connector,
            live,
            window: config.prepare_window(),
            state: HandoffState::Idle,
            shadow: None,
            epoch: 0,
            deadline: None,
            commands_rx,
            outcomes,
            outcomes_rx,
            events,
        };
        tokio::spawn(session.run());

        (Self { commands }, events_rx)
    }

    fn send(&self, command: HandoffCommand) -> Result<(), HandoffError> {
        self.commands
            .send(command)
            .map_err(|_| HandoffError::Stopped)
    }

    pub fn prepare(&self, scene: SceneId) -> Result<(), HandoffError> {
        self.send(HandoffCommand::Prepare(scene))
    }

    pub fn commit(&self, scene: SceneId) -> Result<(), HandoffError> {
        self.send(HandoffCommand::Commit(scene))
    }

    pub fn cancel(&self, scene: SceneId) -> Result<(), HandoffError> {
        self.send(HandoffCommand::Cancel(scene))
    }

    pub async fn state(&self) -> Result<HandoffState, HandoffError> {
        let (reply, rx) = oneshot::channel();
        self.send(HandoffCommand::State(reply))?;
        rx.await.map_err(|_| HandoffError::Stopped)
    }

    pub async fn live_scene(&self) -> Result<SceneId, HandoffError> {
        let (reply, rx) = oneshot::channel();
        self.send(HandoffCommand::LiveScene(reply))?;
        rx.await.map_err(|_| HandoffError::Stopped)
    }

    /// Applies a hand-off request. Returns false for messages that are not requests.
    pub fn handle_message(&self, msg: HandoffMessage) -> Result<bool, HandoffError> {
        match msg {
            HandoffMessage::CameraSwitchPrepareRequest(target) => self.prepare(target.scene_id)?,
            HandoffMessage::CameraSwitchRequest(target) => self.commit(target.scene_id)?,
            HandoffMessage::CameraSwitchCancelRequest(target) => self.cancel(target.scene_id)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Decodes a render-host data-channel frame and applies the request it carries.
    pub fn handle_frame(&self, data: &[u8]) -> Result<bool, HandoffError> {
        self.handle_message(decode_handoff_frame(data)?)
    }
}

struct HandoffSession {
    connector: Arc<dyn SceneConnector>,
    live: Arc<dyn SceneLink>,
    window: Duration,
    state: HandoffState,
    shadow: Option<Arc<dyn SceneLink>>,
    /// Bumped whenever a pending prepare is abandoned, so late connects are discarded.
    epoch: u64,
    deadline: Option<Instant>,
    commands_rx: mpsc::UnboundedReceiver<HandoffCommand>,
    outcomes: mpsc::UnboundedSender<ConnectOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<ConnectOutcome>,
    events: mpsc::UnboundedSender<HandoffEvent>,
}

impl HandoffSession {
    async fn run(mut self) {
        loop {
            let deadline = self.deadline;
            let expiry = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => pending().await,
                }
            };

            tokio::select! {
                command = self.commands_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(outcome) = self.outcomes_rx.recv() => self.on_connected(outcome).await,
                _ = expiry => self.expire().await,
            }
        }

        if let Some(shadow) = self.shadow.take() {
            shadow.close(CloseCode::Normal).await;
        }
        debug!("Hand-off session stopped");
    }

    async fn handle_command(&mut self, command: HandoffCommand) {
        match command {
            HandoffCommand::Prepare(scene) => self.prepare(scene).await,
            HandoffCommand::Commit(scene) => self.commit(scene).await,
            HandoffCommand::Cancel(scene) => self.cancel(scene).await,
            HandoffCommand::State(reply) => {
                let _ = reply.send(self.state.clone());
            }
            HandoffCommand::LiveScene(reply) => {
                let _ = reply.send(self.live.scene_id().clone());
            }
        }
    }

    fn emit(&self, event: HandoffEvent) {
        if self.events.send(event).is_err() {
            debug!("Hand-off events receiver dropped");
        }
    }

    async fn prepare(&mut self, scene: SceneId) {
        if self.state.pending_target() == Some(&scene) {
            debug!(%scene, "Prepare already pending");
            return;
        }
        if self.live.scene_id() == &scene {
            self.abandon().await;
            self.emit(HandoffEvent::Prepared {
                scene,
                result: true,
            });
            return;
        }
        if let Some(previous) = self.state.pending_target().cloned() {
            info!(%previous, %scene, "Replacing pending hand-off");
            self.abandon().await;
        }

        self.epoch += 1;
        self.state = HandoffState::Preparing(scene.clone());
        // Bounds the connect; the window restarts once the shadow is ready.
        self.deadline = Some(Instant::now() + self.window);

        let epoch = self.epoch;
        let connector = self.connector.clone();
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let result = connector.connect(&scene).await;
            let _ = outcomes.send(ConnectOutcome {
                epoch,
                scene,
                result,
            });
        });
    }

    async fn on_connected(&mut self, outcome: ConnectOutcome) {
        let current = outcome.epoch == self.epoch
            && self.state == HandoffState::Preparing(outcome.scene.clone());
        if !current {
            debug!(scene = %outcome.scene, "Discarding stale shadow connection");
            if let Ok(link) = outcome.result {
                link.close(CloseCode::CameraChange).await;
            }
            return;
        }

        match outcome.result {
            Ok(link) => {
                info!(scene = %outcome.scene, "Shadow connection ready");
                self.shadow = Some(link);
                self.state = HandoffState::Prepared(outcome.scene.clone());
                self.deadline = Some(Instant::now() + self.window);
                self.emit(HandoffEvent::Prepared {
                    scene: outcome.scene,
                    result: true,
                });
            }
            Err(e) => {
                warn!(scene = %outcome.scene, "Shadow connection failed: {}", e);
                self.state = HandoffState::Idle;
                self.deadline = None;
                self.emit(HandoffEvent::Prepared {
                    scene: outcome.scene,
                    result: false,
                });
            }
        }
    }

    async fn commit(&mut self, scene: SceneId) {
        if self.state != HandoffState::Prepared(scene.clone()) {
            let result = self.live.scene_id() == &scene;
            if !result {
                warn!(%scene, state = ?self.state, "Commit without a prepared shadow");
            }
            self.emit(HandoffEvent::Committed { scene, result });
            return;
        }

        let Some(shadow) = self.shadow.clone() else {
            self.emit(HandoffEvent::Committed {
                scene,
                result: false,
            });
            return;
        };
        if !shadow.is_media_flowing().await {
            warn!(%scene, "Shadow media not flowing, keeping it prepared");
            self.emit(HandoffEvent::Committed {
                scene,
                result: false,
            });
            return;
        }

        self.state = HandoffState::Switching(scene.clone());
        self.shadow = None;
        self.deadline = None;
        let previous = std::mem::replace(&mut self.live, shadow);
        previous.close(CloseCode::CameraChange).await;
        self.state = HandoffState::Idle;
        info!(from = %previous.scene_id(), to = %scene, "Switched live scene");

        self.emit(HandoffEvent::Committed {
            scene: scene.clone(),
            result: true,
        });
        self.emit(HandoffEvent::SceneChanged {
            scene: scene.clone(),
        });
        self.emit(HandoffEvent::CameraSelect { scene });
    }

    async fn cancel(&mut self, scene: SceneId) {
        let result = self.state.pending_target() == Some(&scene);
        if result {
            self.abandon().await;
        }
        self.emit(HandoffEvent::Cancelled { scene, result });
    }

    async fn expire(&mut self) {
        self.deadline = None;
        let Some(scene) = self.state.pending_target().cloned() else {
            return;
        };
        info!(%scene, "Prepared hand-off expired");
        self.abandon().await;
        self.emit(HandoffEvent::Expired { scene });
    }

    /// Drops any pending target and closes its shadow.
    async fn abandon(&mut self) {
        self.epoch += 1;
        self.deadline = None;
        self.state = HandoffState::Idle;
        if let Some(shadow) = self.shadow.take() {
            shadow.close(CloseCode::CameraChange).await;
        }
    }
}
