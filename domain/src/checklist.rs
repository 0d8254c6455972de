use crate::error::Error;
use crate::todo_type::TodoType;
use crate::{checklist_items, Database, Id};
use entity_api::checklist_item;
use events::{DomainEvent, EventBus};
use log::*;

pub async fn add(
    db: &Database,
    event_bus: &EventBus,
    todo_id: Id,
    user_id: Id,
    description: String,
) -> Result<checklist_items::Model, Error> {
    let description = required_description(description)?;
    ensure_checklist_todo(db, todo_id, user_id).await?;

    let item = checklist_item::add(db, todo_id, user_id, description).await?;

    event_bus.publish(DomainEvent::ChecklistItemAdded {
        todo_id,
        checklist_item_id: item.id,
        user_id,
    });
    Ok(item)
}

pub async fn update(
    db: &Database,
    event_bus: &EventBus,
    todo_id: Id,
    checklist_item_id: Id,
    user_id: Id,
    description: String,
) -> Result<checklist_items::Model, Error> {
    let description = required_description(description)?;
    ensure_checklist_todo(db, todo_id, user_id).await?;

    let item =
        checklist_item::update_description(db, todo_id, checklist_item_id, user_id, description)
            .await?;

    event_bus.publish(DomainEvent::ChecklistItemUpdated {
        todo_id,
        checklist_item_id,
        user_id,
    });
    Ok(item)
}

pub async fn update_status(
    db: &Database,
    event_bus: &EventBus,
    todo_id: Id,
    checklist_item_id: Id,
    user_id: Id,
    done: bool,
) -> Result<checklist_items::Model, Error> {
    ensure_checklist_todo(db, todo_id, user_id).await?;

    let item = checklist_item::update_status(db, todo_id, checklist_item_id, user_id, done).await?;

    event_bus.publish(DomainEvent::ChecklistItemUpdated {
        todo_id,
        checklist_item_id,
        user_id,
    });
    Ok(item)
}

pub async fn delete(
    db: &Database,
    event_bus: &EventBus,
    todo_id: Id,
    checklist_item_id: Id,
    user_id: Id,
) -> Result<(), Error> {
    ensure_checklist_todo(db, todo_id, user_id).await?;

    checklist_item::delete(db, todo_id, checklist_item_id, user_id).await?;

    event_bus.publish(DomainEvent::ChecklistItemDeleted {
        todo_id,
        checklist_item_id,
        user_id,
    });
    Ok(())
}

async fn ensure_checklist_todo(db: &Database, todo_id: Id, user_id: Id) -> Result<(), Error> {
    let todo = entity_api::todo::find_by_user_id(db, todo_id, user_id).await?;
    if todo.todo_type != TodoType::Checklist {
        debug!("Todo {todo_id} is not a checklist");
        return Err(Error::invalid(
            "only todos with type of checklist are supported",
        ));
    }
    Ok(())
}

fn required_description(description: String) -> Result<String, Error> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid("description is required"));
    }
    Ok(trimmed.to_string())
}
