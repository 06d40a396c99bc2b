use anyhow::{Context, Result};
use async_trait::async_trait;
use scenecast_client::{HandoffError, HandoffEvent, SceneConnector, SceneLink};
use scenecast_core::{CloseCode, SceneId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Link that records every close it receives.
pub struct MockLink {
    scene: SceneId,
    flowing: AtomicBool,
    closes: Mutex<Vec<CloseCode>>,
}

impl MockLink {
    pub fn new(scene: &str, flowing: bool) -> Arc<Self> {
        Arc::new(Self {
            scene: SceneId::from(scene),
            flowing: AtomicBool::new(flowing),
            closes: Mutex::new(Vec::new()),
        })
    }

    pub fn set_flowing(&self, flowing: bool) {
        self.flowing.store(flowing, Ordering::SeqCst);
    }

    pub fn closes(&self) -> Vec<CloseCode> {
        self.closes.lock().unwrap().clone()
    }

    pub fn is_open(&self) -> bool {
        self.closes.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl SceneLink for MockLink {
    fn scene_id(&self) -> &SceneId {
        &self.scene
    }

    async fn is_media_flowing(&self) -> bool {
        self.flowing.load(Ordering::SeqCst)
    }

    async fn close(&self, code: CloseCode) {
        self.closes.lock().unwrap().push(code);
    }
}

#[derive(Default)]
struct Behaviour {
    failing: HashSet<SceneId>,
    stalled: HashSet<SceneId>,
    delays: HashMap<SceneId, Duration>,
    silent: HashSet<SceneId>,
}

/// Connector that hands out [`MockLink`]s and keeps every one it opened.
#[derive(Clone, Default)]
pub struct MockConnector {
    behaviour: Arc<Mutex<Behaviour>>,
    opened: Arc<Mutex<Vec<Arc<MockLink>>>>,
}

impl MockConnector {
    pub fn fail(&self, scene: &str) {
        self.behaviour.lock().unwrap().failing.insert(scene.into());
    }

    /// Connects to `scene` never complete.
    pub fn stall(&self, scene: &str) {
        self.behaviour.lock().unwrap().stalled.insert(scene.into());
    }

    pub fn delay(&self, scene: &str, delay: Duration) {
        self.behaviour
            .lock()
            .unwrap()
            .delays
            .insert(scene.into(), delay);
    }

    /// Links to `scene` come up without media.
    pub fn without_media(&self, scene: &str) {
        self.behaviour.lock().unwrap().silent.insert(scene.into());
    }

    pub fn opened(&self, scene: &str) -> Vec<Arc<MockLink>> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .filter(|link| link.scene_id().as_str() == scene)
            .cloned()
            .collect()
    }

    pub fn open_count(&self) -> usize {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .filter(|link| link.is_open())
            .count()
    }
}

#[async_trait]
impl SceneConnector for MockConnector {
    async fn connect(&self, scene: &SceneId) -> Result<Arc<dyn SceneLink>, HandoffError> {
        let (failing, stalled, delay, flowing) = {
            let behaviour = self.behaviour.lock().unwrap();
            (
                behaviour.failing.contains(scene),
                behaviour.stalled.contains(scene),
                behaviour.delays.get(scene).copied(),
                !behaviour.silent.contains(scene),
            )
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(HandoffError::Connect {
                scene: scene.clone(),
                reason: "scene unreachable".to_string(),
            });
        }
        let link = MockLink::new(scene.as_str(), flowing);
        self.opened.lock().unwrap().push(link.clone());
        Ok(link as Arc<dyn SceneLink>)
    }
}

pub async fn next_event(events: &mut mpsc::UnboundedReceiver<HandoffEvent>) -> Result<HandoffEvent> {
    tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .context("no hand-off event")?
        .context("hand-off session stopped")
}
