use crate::message::Event;
use log::*;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

// Type alias for user IDs, shared with the event layer
pub type UserId = events::Id;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The registry's side of a connection: where to push payloads and how to
/// terminate the session server-side.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<Event>,
    force_close: CancellationToken,
}

impl ConnectionHandle {
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }
}

/// The session's side of a connection: the notification queue it drains and
/// the force-close signal it must watch.
#[derive(Debug)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub(crate) user_id: UserId,
    pub(crate) receiver: mpsc::Receiver<Event>,
    pub(crate) force_close: CancellationToken,
}

impl Connection {
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Waits for the next queued payload. Returns `None` once the registry
    /// has let go of this connection.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    pub fn is_force_closed(&self) -> bool {
        self.force_close.is_cancelled()
    }

    /// Resolves once the registry force-closes this connection.
    pub async fn force_closed(&self) {
        self.force_close.cancelled().await
    }
}

/// Create both ends of a connection with a bounded queue of `capacity`
/// pending payloads.
pub fn channel(user_id: UserId, capacity: usize) -> (Connection, ConnectionHandle) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let id = ConnectionId::new();
    let force_close = CancellationToken::new();

    (
        Connection {
            id: id.clone(),
            user_id,
            receiver,
            force_close: force_close.clone(),
        },
        ConnectionHandle {
            id,
            sender,
            force_close,
        },
    )
}

/// Per-user registry of live connections.
///
/// A single reader/writer lock guards the whole map: pushes take the read
/// lock, so they run concurrently with each other; registration and removal
/// take the write lock. A handle is present iff its connection may still
/// receive pushes, and users with no connections have no entry.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, Vec<ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection to the user's set, creating the entry if needed.
    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) {
        trace!("Registering connection {} for user {user_id}", handle.id);
        self.connections
            .write()
            .entry(user_id)
            .or_default()
            .push(handle);
    }

    /// Remove a single connection at the end of its session.
    ///
    /// Returns `false` if the connection was already gone, e.g. because the
    /// user's clients were removed in bulk.
    pub fn unregister(&self, user_id: UserId, connection_id: &ConnectionId) -> bool {
        let mut connections = self.connections.write();

        let Some(handles) = connections.get_mut(&user_id) else {
            return false;
        };

        let before = handles.len();
        handles.retain(|handle| &handle.id != connection_id);
        let removed = handles.len() != before;

        // Clean up empty user entries
        if handles.is_empty() {
            connections.remove(&user_id);
        }

        removed
    }

    /// Force-close every connection of `user_id` and drop the user's entry.
    ///
    /// Returns the number of connections that were signalled. Calling this
    /// for a user without connections does nothing.
    pub fn remove_clients(&self, user_id: UserId) -> usize {
        let removed = self.connections.write().remove(&user_id);

        match removed {
            Some(handles) => {
                for handle in &handles {
                    handle.force_close.cancel();
                }
                handles.len()
            }
            None => 0,
        }
    }

    /// Push `event` to every connection of `user_id` without blocking.
    ///
    /// Connections that are force-closed, gone, or whose queue is full are
    /// skipped. Returns the number of connections the event was queued on.
    pub fn send_to_user(&self, user_id: UserId, event: &Event) -> usize {
        let connections = self.connections.read();

        let Some(handles) = connections.get(&user_id) else {
            trace!("No live connections for user {user_id}, dropping notification");
            return 0;
        };

        let mut delivered = 0;
        for handle in handles {
            if handle.force_close.is_cancelled() {
                debug!("Connection {} is closing, skipping", handle.id);
                continue;
            }

            match handle.sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "Notification queue full for connection {}, dropping notification",
                        handle.id
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Connection {} already disconnected, skipping", handle.id);
                }
            }
        }

        delivered
    }

    pub fn connection_count(&self, user_id: UserId) -> usize {
        self.connections
            .read()
            .get(&user_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn connection_ids(&self, user_id: UserId) -> Vec<ConnectionId> {
        self.connections
            .read()
            .get(&user_id)
            .map(|handles| handles.iter().map(|handle| handle.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of users with at least one live connection.
    pub fn user_count(&self) -> usize {
        self.connections.read().len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
