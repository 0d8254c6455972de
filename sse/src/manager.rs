use crate::connection::{self, Connection, ConnectionRegistry, UserId};
use crate::message::{Event, EventType};
use log::*;
use std::sync::Arc;

/// Pending payloads buffered per connection before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Entry point for the rest of the application into the live notification
/// registry. One instance is created at startup and shared through `AppState`.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    queue_capacity: usize,
}

impl Manager {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            queue_capacity,
        }
    }

    /// Open a new connection for an already-authenticated user and make it
    /// eligible for pushes.
    pub fn register_connection(&self, user_id: UserId) -> Connection {
        let (connection, handle) = connection::channel(user_id, self.queue_capacity);
        self.registry.register(user_id, handle);
        info!(
            "Registered SSE connection {} for user {user_id}",
            connection.id()
        );
        connection
    }

    /// Remove a connection whose session has ended.
    pub fn unregister_connection(&self, connection: &Connection) {
        if self
            .registry
            .unregister(connection.user_id(), connection.id())
        {
            info!(
                "Unregistered SSE connection {} for user {}",
                connection.id(),
                connection.user_id()
            );
        }
    }

    /// Terminate every live connection of `user_id` server-side.
    pub fn remove_clients(&self, user_id: UserId) {
        let closed = self.registry.remove_clients(user_id);
        if closed > 0 {
            info!("Force-closed {closed} SSE connection(s) for user {user_id}");
        }
    }

    /// Best-effort push of `event` to every live connection of `user_id`.
    pub fn send(&self, user_id: UserId, event: Event) {
        let delivered = self.registry.send_to_user(user_id, &event);
        debug!(
            "Sent {} event to {delivered} connection(s) of user {user_id}",
            event.event_type()
        );
    }

    pub fn connection_count(&self, user_id: UserId) -> usize {
        self.registry.connection_count(user_id)
    }

    pub fn user_count(&self) -> usize {
        self.registry.user_count()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
