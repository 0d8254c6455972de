use events::Id;
use serde::Serialize;

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// Identifies a checklist item together with the to-do that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistItemRef {
    pub todo_id: Id,
    pub checklist_item_id: Id,
}

/// Payload pushed down a live connection.
///
/// Serialized as `{"event": "<kind>", "data": <value>}`. New kinds can be
/// added here without touching the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Event {
    /// First payload on every connection, written once the session is live.
    Connected,

    // To-dos carry the to-do id
    TodoCreated(Id),
    TodoUpdated(Id),
    TodoDeleted(Id),

    // Checklist items
    ChecklistAdded(ChecklistItemRef),
    ChecklistUpdated(ChecklistItemRef),
    ChecklistDeleted(ChecklistItemRef),
}

impl Event {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::Connected => "connected",
            Event::TodoCreated(_) => "todoCreated",
            Event::TodoUpdated(_) => "todoUpdated",
            Event::TodoDeleted(_) => "todoDeleted",
            Event::ChecklistAdded(_) => "checklistAdded",
            Event::ChecklistUpdated(_) => "checklistUpdated",
            Event::ChecklistDeleted(_) => "checklistDeleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_value(event: &Event) -> serde_json::Value {
        serde_json::from_str(&event.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_todo_event_serializes_with_id_as_data() {
        assert_eq!(
            as_value(&Event::TodoCreated(7)),
            json!({"event": "todoCreated", "data": 7})
        );
    }

    #[test]
    fn test_checklist_event_serializes_item_reference() {
        let event = Event::ChecklistUpdated(ChecklistItemRef {
            todo_id: 3,
            checklist_item_id: 11,
        });
        assert_eq!(
            as_value(&event),
            json!({"event": "checklistUpdated", "data": {"todo_id": 3, "checklist_item_id": 11}})
        );
    }

    #[test]
    fn test_connected_event_has_no_data() {
        assert_eq!(as_value(&Event::Connected), json!({"event": "connected"}));
    }

    #[test]
    fn test_event_type_matches_serialized_tag() {
        let events = [
            Event::Connected,
            Event::TodoCreated(1),
            Event::TodoUpdated(1),
            Event::TodoDeleted(1),
            Event::ChecklistAdded(ChecklistItemRef {
                todo_id: 1,
                checklist_item_id: 2,
            }),
            Event::ChecklistUpdated(ChecklistItemRef {
                todo_id: 1,
                checklist_item_id: 2,
            }),
            Event::ChecklistDeleted(ChecklistItemRef {
                todo_id: 1,
                checklist_item_id: 2,
            }),
        ];

        for event in events {
            assert_eq!(as_value(&event)["event"], event.event_type());
        }
    }
}
