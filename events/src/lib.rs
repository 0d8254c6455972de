//! Event system infrastructure for the to-do backend.
//!
//! This crate provides the event bus that decouples domain logic from the
//! infrastructure reacting to it (like SSE notifications).
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events in the system.
//!   Every variant exposes a stable name used as the dispatch key.
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventBus**: Maps event names to handlers and dispatches each
//!   published event to every handler concurrently.
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies.

pub mod bus;

pub use bus::{EventBus, EventBusConfig};

use async_trait::async_trait;
use serde::Serialize;

/// A type alias that represents any entity's id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = u64;

/// Stable event names used as subscription keys on the [`EventBus`].
pub mod names {
    pub const TODO_CREATED: &str = "todo.created";
    pub const TODO_UPDATED: &str = "todo.updated";
    pub const TODO_DELETED: &str = "todo.deleted";
    pub const CHECKLIST_ITEM_ADDED: &str = "checklist_item.added";
    pub const CHECKLIST_ITEM_UPDATED: &str = "checklist_item.updated";
    pub const CHECKLIST_ITEM_DELETED: &str = "checklist_item.deleted";
    pub const USER_LOGGED_OUT: &str = "user.logged_out";
}

/// Domain events that represent business-level changes in the system.
/// These events are emitted after a domain operation has completed its write.
///
/// Every event carries the id of the user that owns the changed data so
/// listeners can route notifications without going back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DomainEvent {
    /// Emitted when a new to-do is created.
    TodoCreated { todo_id: Id, user_id: Id },
    /// Emitted when a to-do is edited, pinned or unpinned.
    TodoUpdated { todo_id: Id, user_id: Id },
    /// Emitted when a to-do is permanently removed.
    TodoDeleted { todo_id: Id, user_id: Id },
    /// Emitted when an item is appended to a checklist to-do.
    ChecklistItemAdded {
        todo_id: Id,
        checklist_item_id: Id,
        user_id: Id,
    },
    /// Emitted when a checklist item's description or done status changes.
    ChecklistItemUpdated {
        todo_id: Id,
        checklist_item_id: Id,
        user_id: Id,
    },
    /// Emitted when a checklist item is removed.
    ChecklistItemDeleted {
        todo_id: Id,
        checklist_item_id: Id,
        user_id: Id,
    },
    /// Emitted when a user's token is invalidated. Live streams for the user
    /// are expected to be torn down in response.
    UserLoggedOut { user_id: Id },
}

impl DomainEvent {
    /// The dispatch key handlers subscribe under.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::TodoCreated { .. } => names::TODO_CREATED,
            DomainEvent::TodoUpdated { .. } => names::TODO_UPDATED,
            DomainEvent::TodoDeleted { .. } => names::TODO_DELETED,
            DomainEvent::ChecklistItemAdded { .. } => names::CHECKLIST_ITEM_ADDED,
            DomainEvent::ChecklistItemUpdated { .. } => names::CHECKLIST_ITEM_UPDATED,
            DomainEvent::ChecklistItemDeleted { .. } => names::CHECKLIST_ITEM_DELETED,
            DomainEvent::UserLoggedOut { .. } => names::USER_LOGGED_OUT,
        }
    }

    /// The user whose data changed.
    pub fn user_id(&self) -> Id {
        match self {
            DomainEvent::TodoCreated { user_id, .. }
            | DomainEvent::TodoUpdated { user_id, .. }
            | DomainEvent::TodoDeleted { user_id, .. }
            | DomainEvent::ChecklistItemAdded { user_id, .. }
            | DomainEvent::ChecklistItemUpdated { user_id, .. }
            | DomainEvent::ChecklistItemDeleted { user_id, .. }
            | DomainEvent::UserLoggedOut { user_id } => *user_id,
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
///
/// Each invocation runs on its own task; a panic inside `handle` is contained
/// to that invocation.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);

    /// Human-readable name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_stable() {
        assert_eq!(
            DomainEvent::TodoCreated {
                todo_id: 1,
                user_id: 2
            }
            .name(),
            "todo.created"
        );
        assert_eq!(
            DomainEvent::ChecklistItemDeleted {
                todo_id: 1,
                checklist_item_id: 3,
                user_id: 2
            }
            .name(),
            "checklist_item.deleted"
        );
        assert_eq!(
            DomainEvent::UserLoggedOut { user_id: 9 }.name(),
            "user.logged_out"
        );
    }

    #[test]
    fn test_user_id_is_extracted_from_every_variant() {
        let events = [
            DomainEvent::TodoCreated {
                todo_id: 1,
                user_id: 42,
            },
            DomainEvent::TodoUpdated {
                todo_id: 1,
                user_id: 42,
            },
            DomainEvent::TodoDeleted {
                todo_id: 1,
                user_id: 42,
            },
            DomainEvent::ChecklistItemAdded {
                todo_id: 1,
                checklist_item_id: 5,
                user_id: 42,
            },
            DomainEvent::ChecklistItemUpdated {
                todo_id: 1,
                checklist_item_id: 5,
                user_id: 42,
            },
            DomainEvent::ChecklistItemDeleted {
                todo_id: 1,
                checklist_item_id: 5,
                user_id: 42,
            },
            DomainEvent::UserLoggedOut { user_id: 42 },
        ];

        for event in events {
            assert_eq!(event.user_id(), 42, "wrong user id for {event:?}");
        }
    }
}
