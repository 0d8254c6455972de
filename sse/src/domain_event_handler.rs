use crate::message::{ChecklistItemRef, Event as SseEvent};
use crate::Manager;
use async_trait::async_trait;
use events::{names, DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by converting them to SSE payloads and pushing them
/// to the owning user's live connections.
///
/// A `UserLoggedOut` event force-closes the user's connections instead.
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    /// Every event name this handler should be subscribed under.
    pub const EVENT_NAMES: &'static [&'static str] = &[
        names::TODO_CREATED,
        names::TODO_UPDATED,
        names::TODO_DELETED,
        names::CHECKLIST_ITEM_ADDED,
        names::CHECKLIST_ITEM_UPDATED,
        names::CHECKLIST_ITEM_DELETED,
        names::USER_LOGGED_OUT,
    ];

    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }

    fn notification(event: &DomainEvent) -> Option<SseEvent> {
        let notification = match *event {
            DomainEvent::TodoCreated { todo_id, .. } => SseEvent::TodoCreated(todo_id),
            DomainEvent::TodoUpdated { todo_id, .. } => SseEvent::TodoUpdated(todo_id),
            DomainEvent::TodoDeleted { todo_id, .. } => SseEvent::TodoDeleted(todo_id),
            DomainEvent::ChecklistItemAdded {
                todo_id,
                checklist_item_id,
                ..
            } => SseEvent::ChecklistAdded(ChecklistItemRef {
                todo_id,
                checklist_item_id,
            }),
            DomainEvent::ChecklistItemUpdated {
                todo_id,
                checklist_item_id,
                ..
            } => SseEvent::ChecklistUpdated(ChecklistItemRef {
                todo_id,
                checklist_item_id,
            }),
            DomainEvent::ChecklistItemDeleted {
                todo_id,
                checklist_item_id,
                ..
            } => SseEvent::ChecklistDeleted(ChecklistItemRef {
                todo_id,
                checklist_item_id,
            }),
            DomainEvent::UserLoggedOut { .. } => return None,
        };
        Some(notification)
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        let user_id = event.user_id();

        match Self::notification(event) {
            Some(notification) => {
                debug!("Handling {} event for user {user_id}", event.name());
                self.sse_manager.send(user_id, notification);
            }
            None => {
                debug!("User {user_id} logged out, closing their SSE connections");
                self.sse_manager.remove_clients(user_id);
            }
        }
    }

    fn name(&self) -> &'static str {
        "SseDomainEventHandler"
    }
}
