//! Registry of open voice WebSocket connections.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt, stream::SplitStream};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::debug;
use uuid::Uuid;

pub type ConnectionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("connection is closed")]
    Closed,
}

/// Tracks every open connection and the queue feeding its socket.
///
/// Each connection owns a FIFO queue drained by a dedicated writer task, so
/// sends never wait on the network and per-connection order is preserved.
/// A connection whose writer has stopped is reported as
/// [`SendError::Closed`] until it is removed.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits an upgraded socket: starts its writer task and adds it to the
    /// active set. Returns the connection id and the read half of the socket.
    pub async fn admit(&self, socket: WebSocket) -> (ConnectionId, SplitStream<WebSocket>) {
        let (mut socket_tx, socket_rx) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let id = self.register(tx).await;

        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = socket_tx.send(Message::Text(text.into())).await {
                    debug!(connection_id = %id, error = ?e, "Socket write failed; stopping writer.");
                    return;
                }
            }
            let _ = socket_tx.close().await;
        });

        (id, socket_rx)
    }

    /// Adds a connection backed by `sender` to the active set.
    pub async fn register(&self, sender: mpsc::UnboundedSender<String>) -> ConnectionId {
        let id = Uuid::new_v4();
        self.connections.write().await.insert(id, sender);
        debug!(connection_id = %id, "Connection admitted");
        id
    }

    /// Removes a connection. Removing an unknown or already removed
    /// connection does nothing.
    pub async fn remove(&self, id: ConnectionId) {
        if self.connections.write().await.remove(&id).is_some() {
            debug!(connection_id = %id, "Connection removed");
        }
    }

    /// Queues `message` for a single connection.
    pub async fn send_to(
        &self,
        id: ConnectionId,
        message: impl Into<String>,
    ) -> Result<(), SendError> {
        let connections = self.connections.read().await;
        let sender = connections.get(&id).ok_or(SendError::Closed)?;
        sender.send(message.into()).map_err(|_| SendError::Closed)
    }

    /// Queues `message` for every open connection. Connections that have
    /// gone away are skipped; delivery is not retried.
    pub async fn broadcast(&self, message: &str) {
        let connections = self.connections.read().await;
        let mut failed = 0usize;
        for (id, sender) in connections.iter() {
            if sender.send(message.to_string()).is_err() {
                debug!(connection_id = %id, "Broadcast skipped closed connection");
                failed += 1;
            }
        }
        debug!(recipients = connections.len(), failed, "Broadcast sent");
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_then_remove() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = registry.register(tx).await;
        assert!(registry.contains(id).await);
        assert_eq!(registry.len().await, 1);

        registry.remove(id).await;
        assert!(!registry.contains(id).await);
        assert!(registry.is_empty().await);

        // Second removal is a no-op.
        registry.remove(id).await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_send_to_targets_one_connection_in_order() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = registry.register(tx_a).await;
        let _b = registry.register(tx_b).await;

        registry.send_to(a, "first").await.unwrap();
        registry.send_to(a, "second").await.unwrap();

        assert_eq!(rx_a.recv().await.as_deref(), Some("first"));
        assert_eq!(rx_a.recv().await.as_deref(), Some("second"));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_to_removed_connection_is_closed() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(tx).await;
        registry.remove(id).await;

        assert_eq!(registry.send_to(id, "late").await, Err(SendError::Closed));
    }

    #[tokio::test]
    async fn test_send_to_dead_transport_is_closed() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register(tx).await;
        drop(rx);

        assert_eq!(registry.send_to(id, "hello").await, Err(SendError::Closed));
        // Still registered until the session removes it.
        assert!(registry.contains(id).await);
    }

    #[tokio::test]
    async fn test_broadcast_continues_past_failed_connection() {
        let registry = ConnectionRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..5 {
            let (tx, rx) = mpsc::unbounded_channel();
            registry.register(tx).await;
            receivers.push(Some(rx));
        }
        // Kill the transport of one connection in the middle.
        receivers[2] = None;

        registry.broadcast("announcement").await;

        for rx in receivers.iter_mut().flatten() {
            assert_eq!(rx.recv().await.as_deref(), Some("announcement"));
        }
    }

    #[tokio::test]
    async fn test_concurrent_register_remove() {
        let registry = ConnectionRegistry::new();
        let mut handles = Vec::new();

        for _ in 0..50 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::unbounded_channel();
                let id = registry.register(tx).await;
                registry.remove(id).await;
                registry.remove(id).await;
            }));
        }
        for handle in handles {
            handle.await.expect("task should not panic");
        }

        assert!(registry.is_empty().await);
    }
}
