use dashmap::DashMap;
use scenecast_core::{CloseCode, ConnectionId, Envelope};
use std::hash::Hash;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// What the socket task should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Frame(String),
    Close(CloseCode),
}

/// Fire-and-forget sender for one socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<Outbound>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn send(&self, msg: &Envelope) {
        match msg.to_json() {
            Ok(json) => self.send_text(json),
            Err(e) => error!("Failed to serialize {} message: {}", msg.kind(), e),
        }
    }

    pub fn send_text(&self, json: String) {
        if self.tx.send(Outbound::Frame(json)).is_err() {
            warn!("Attempted to send to closed connection {}", self.id);
        }
    }

    pub fn close(&self, code: CloseCode) {
        let _ = self.tx.send(Outbound::Close(code));
    }
}

pub struct Registered<M> {
    pub handle: ConnectionHandle,
    pub meta: M,
}

/// Live connections of one party, keyed by the identity the hub assigned them.
pub struct ConnectionRegistry<K, M> {
    entries: DashMap<K, Registered<M>>,
}

impl<K, M> Default for ConnectionRegistry<K, M>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, M> ConnectionRegistry<K, M>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, returning whatever was registered under `key` before.
    pub fn insert(&self, key: K, handle: ConnectionHandle, meta: M) -> Option<Registered<M>> {
        self.entries.insert(key, Registered { handle, meta })
    }

    /// Removes `key` only if it still belongs to `conn`.
    pub fn remove_if_current(&self, key: &K, conn: ConnectionId) -> Option<Registered<M>> {
        self.entries
            .remove_if(key, |_, entry| entry.handle.id() == conn)
            .map(|(_, entry)| entry)
    }

    pub fn remove(&self, key: &K) -> Option<Registered<M>> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn handle(&self, key: &K) -> Option<ConnectionHandle> {
        self.entries.get(key).map(|entry| entry.handle.clone())
    }

    /// Returns false if nothing is registered under `key`.
    pub fn send(&self, key: &K, msg: &Envelope) -> bool {
        match self.entries.get(key) {
            Some(entry) => {
                entry.handle.send(msg);
                true
            }
            None => false,
        }
    }

    pub fn broadcast(&self, msg: &Envelope) {
        let json = match msg.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize {} message: {}", msg.kind(), e);
                return;
            }
        };
        for entry in self.entries.iter() {
            entry.handle.send_text(json.clone());
        }
    }

    pub fn with_meta<R>(&self, key: &K, f: impl FnOnce(&M) -> R) -> Option<R> {
        self.entries.get(key).map(|entry| f(&entry.meta))
    }

    pub fn update_meta(&self, key: &K, f: impl FnOnce(&mut M)) -> bool {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                f(&mut entry.meta);
                true
            }
            None => false,
        }
    }

    /// Keys whose metadata matches `pred`.
    pub fn find(&self, pred: impl Fn(&K, &M) -> bool) -> Vec<K> {
        self.entries
            .iter()
            .filter(|entry| pred(entry.key(), &entry.meta))
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl<K, M> ConnectionRegistry<K, M>
where
    K: Eq + Hash + Clone,
    M: Clone,
{
    pub fn snapshot(&self) -> Vec<(K, M)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.meta.clone()))
            .collect()
    }
}
