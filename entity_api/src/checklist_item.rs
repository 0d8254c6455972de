use super::error::Error;
use crate::todo::owned_mut;
use crate::{not_found, Database};
use chrono::Utc;
use entity::checklist_items::Model;
use entity::Id;
use log::*;

/// Appends an item to the checklist of a to-do owned by `user_id`.
pub async fn add(db: &Database, todo_id: Id, user_id: Id, description: String) -> Result<Model, Error> {
    let mut tables = db.write().await;
    let id = tables.next_checklist_item_id();
    let todo = owned_mut(&mut tables.todos, todo_id, user_id)?;

    let now = Utc::now();
    let item = Model {
        id,
        todo_id,
        description,
        done: false,
        created_at: now,
        updated_at: now,
    };
    debug!("New Checklist Item to be inserted: {item:?}");

    todo.checklist.push(item.clone());
    todo.updated_at = now;

    Ok(item)
}

pub async fn update_description(
    db: &Database,
    todo_id: Id,
    checklist_item_id: Id,
    user_id: Id,
    description: String,
) -> Result<Model, Error> {
    modify(db, todo_id, checklist_item_id, user_id, |item| {
        item.description = description
    })
    .await
}

pub async fn update_status(
    db: &Database,
    todo_id: Id,
    checklist_item_id: Id,
    user_id: Id,
    done: bool,
) -> Result<Model, Error> {
    modify(db, todo_id, checklist_item_id, user_id, |item| item.done = done).await
}

pub async fn delete(db: &Database, todo_id: Id, checklist_item_id: Id, user_id: Id) -> Result<(), Error> {
    let mut tables = db.write().await;
    let todo = owned_mut(&mut tables.todos, todo_id, user_id)?;

    let position = todo
        .checklist
        .iter()
        .position(|item| item.id == checklist_item_id)
        .ok_or_else(not_found)?;
    todo.checklist.remove(position);
    todo.updated_at = Utc::now();

    Ok(())
}

async fn modify<F>(
    db: &Database,
    todo_id: Id,
    checklist_item_id: Id,
    user_id: Id,
    apply: F,
) -> Result<Model, Error>
where
    F: FnOnce(&mut Model),
{
    let mut tables = db.write().await;
    let todo = owned_mut(&mut tables.todos, todo_id, user_id)?;

    let now = Utc::now();
    let item = todo
        .checklist
        .iter_mut()
        .find(|item| item.id == checklist_item_id)
        .ok_or_else(|| {
            debug!("Checklist item {checklist_item_id} not found on todo {todo_id}");
            not_found()
        })?;
    apply(item);
    item.updated_at = now;
    let item = item.clone();

    todo.updated_at = now;

    Ok(item)
}
