mod dispatcher;
mod host_handler;
mod relay_handler;
mod viewer_handler;

pub use dispatcher::*;

use crate::config::HubConfig;
use crate::error::CredentialError;
use crate::identity::CredentialVerifier;
use crate::registry::{ConnectionHandle, HostRegistry, RelayRegistry, ViewerRegistry};
use scenecast_core::{CloseCode, ConnectionId, SceneListing};
use std::sync::Arc;

/// Which endpoint a socket came in on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Host,
    Viewer,
    Relay,
}

/// Everything the socket tasks report to the dispatcher.
#[derive(Debug)]
pub enum HubEvent {
    Connected {
        party: Party,
        handle: ConnectionHandle,
    },
    Frame {
        conn: ConnectionId,
        text: String,
    },
    Disconnected {
        conn: ConnectionId,
        code: Option<CloseCode>,
    },
    /// Credential verdict for a viewer that sent `userInfo`.
    Verified {
        conn: ConnectionId,
        verdict: Result<(), CredentialError>,
    },
}

/// Shared connection state. Only the dispatcher mutates it.
pub struct Hub {
    pub config: HubConfig,
    pub hosts: HostRegistry,
    pub viewers: ViewerRegistry,
    pub relay: RelayRegistry,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl Hub {
    pub fn new(config: HubConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            config,
            hosts: HostRegistry::new(),
            viewers: ViewerRegistry::new(),
            relay: RelayRegistry::new(),
            verifier,
        }
    }

    pub fn scene_listing(&self) -> SceneListing {
        SceneListing {
            scenes: self.hosts.summaries(),
        }
    }
}
