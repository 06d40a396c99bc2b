use crate::registry::{ConnectionHandle, ConnectionRegistry};
use scenecast_core::{ConnectionId, Envelope};

/// The single relay connection. A second one is refused while the first is alive.
#[derive(Default)]
pub struct RelayRegistry {
    inner: ConnectionRegistry<(), ()>,
}

impl RelayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false and leaves the registry untouched if a relay is already attached.
    pub fn attach(&self, handle: ConnectionHandle) -> bool {
        if self.inner.contains(&()) {
            return false;
        }
        self.inner.insert((), handle, ());
        true
    }

    pub fn detach(&self, conn: ConnectionId) -> bool {
        self.inner.remove_if_current(&(), conn).is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.contains(&())
    }

    pub fn is_current(&self, conn: ConnectionId) -> bool {
        self.inner
            .handle(&())
            .is_some_and(|handle| handle.id() == conn)
    }

    pub fn handle(&self) -> Option<ConnectionHandle> {
        self.inner.handle(&())
    }

    pub fn send(&self, msg: &Envelope) -> bool {
        self.inner.send(&(), msg)
    }
}
