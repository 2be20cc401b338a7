// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! In-memory registry of authenticated realtime connections.
//!
//! One entry per identity, last writer wins: a reconnect or a second tab
//! displaces the previous handle's entry. Nothing is persisted; the map
//! is empty at process start and lost on restart.

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque id naming one live connection.
pub type ConnectionId = Uuid;

/// Addressable reference to an active connection: its id plus the
/// sender feeding the connection's writer task.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub sender: mpsc::UnboundedSender<Message>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }
}

/// Mapping of user identity to active connection handle.
///
/// DashMap shards serialize concurrent register/unregister calls, so no
/// external locking is needed.
pub struct PresenceRegistry {
    connections: DashMap<String, ConnectionHandle>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Insert or overwrite the mapping for an identity.
    pub fn register(&self, identity: &str, handle: ConnectionHandle) {
        let displaced = self
            .connections
            .insert(identity.to_string(), handle)
            .is_some();

        tracing::debug!(
            identity = %identity,
            displaced,
            online = self.online_count(),
            "Presence registered"
        );
    }

    /// Remove the entry whose handle matches the given connection id.
    ///
    /// Scans the live connections (O(n) in concurrent connection count).
    /// A no-op when the connection was already displaced by a newer
    /// registration for the same identity.
    pub fn unregister(&self, connection_id: ConnectionId) {
        self.connections
            .retain(|_, handle| handle.id != connection_id);

        tracing::debug!(
            connection_id = %connection_id,
            online = self.online_count(),
            "Presence unregistered"
        );
    }

    /// Connection id currently registered for an identity, if any.
    pub fn connection_for(&self, identity: &str) -> Option<ConnectionId> {
        self.connections.get(identity).map(|entry| entry.id)
    }

    /// Whether an identity currently has a live connection.
    pub fn is_online(&self, identity: &str) -> bool {
        self.connections.contains_key(identity)
    }

    /// Number of identities currently online.
    pub fn online_count(&self) -> usize {
        self.connections.len()
    }

    /// Deliver a message to an identity's registered connection.
    ///
    /// Returns `false` if the identity is offline or its writer task has
    /// already shut down.
    pub fn send_to(&self, identity: &str, message: Message) -> bool {
        match self.connections.get(identity) {
            Some(entry) => entry.sender.send(message).is_ok(),
            None => false,
        }
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle::new(tx), rx)
    }

    #[test]
    fn test_register_then_lookup() {
        let registry = PresenceRegistry::new();
        let (handle, _rx) = test_handle();
        let id = handle.id;

        registry.register("user-1", handle);

        assert_eq!(registry.connection_for("user-1"), Some(id));
        assert!(registry.is_online("user-1"));
        assert_eq!(registry.online_count(), 1);
    }

    #[test]
    fn test_unregister_removes_entry() {
        let registry = PresenceRegistry::new();
        let (handle, _rx) = test_handle();
        let id = handle.id;

        registry.register("user-1", handle);
        registry.unregister(id);

        assert_eq!(registry.connection_for("user-1"), None);
        assert!(!registry.is_online("user-1"));
    }

    #[test]
    fn test_reregister_keeps_latest_handle() {
        let registry = PresenceRegistry::new();
        let (first, _rx1) = test_handle();
        let (second, _rx2) = test_handle();
        let first_id = first.id;
        let second_id = second.id;

        registry.register("user-1", first);
        registry.register("user-1", second);

        assert_eq!(registry.connection_for("user-1"), Some(second_id));
        assert_eq!(registry.online_count(), 1);

        // The displaced connection's cleanup must not evict the newer one.
        registry.unregister(first_id);
        assert_eq!(registry.connection_for("user-1"), Some(second_id));
    }

    #[test]
    fn test_unregister_unknown_id_is_noop() {
        let registry = PresenceRegistry::new();
        let (handle, _rx) = test_handle();

        registry.register("user-1", handle);
        registry.unregister(Uuid::new_v4());

        assert!(registry.is_online("user-1"));
    }

    #[tokio::test]
    async fn test_send_to_delivers_to_registered_connection() {
        let registry = PresenceRegistry::new();
        let (handle, mut rx) = test_handle();

        registry.register("user-1", handle);

        assert!(registry.send_to("user-1", Message::Text("hello".into())));
        assert!(matches!(rx.recv().await, Some(Message::Text(_))));

        assert!(!registry.send_to("user-2", Message::Text("hello".into())));
    }
}
