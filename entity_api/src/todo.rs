use super::error::{EntityApiErrorKind, Error};
use crate::query::{FilterType, FilterValue, Paginated, PaginationMeta, PaginationOptions, SortOrder};
use crate::{checklist_items, not_found, Database};
use chrono::Utc;
use entity::todo_type::TodoType;
use entity::todos::Model;
use entity::Id;
use log::*;
use std::cmp::Ordering;

pub const SORT_FIELDS: [&str; 5] = ["id", "title", "created_at", "updated_at", "pinned"];
pub const FILTERS: [(&str, FilterType); 3] = [
    ("title", FilterType::String),
    ("pinned", FilterType::Boolean),
    ("type", FilterType::String),
];

/// Inserts a to-do owned by `user_id` along with any checklist items it carries.
pub async fn create(db: &Database, user_id: Id, todo_model: Model) -> Result<Model, Error> {
    debug!("New Todo Model to be inserted: {todo_model:?}");

    let now = Utc::now();
    let mut tables = db.write().await;
    let id = tables.next_todo_id();

    let mut checklist = Vec::with_capacity(todo_model.checklist.len());
    for item in todo_model.checklist {
        checklist.push(checklist_items::Model {
            id: tables.next_checklist_item_id(),
            todo_id: id,
            description: item.description,
            done: false,
            created_at: now,
            updated_at: now,
        });
    }

    let todo = Model {
        id,
        user_id,
        title: todo_model.title,
        content: todo_model.content,
        todo_type: todo_model.todo_type,
        pinned: false,
        checklist,
        created_at: now,
        updated_at: now,
    };
    tables.todos.insert(id, todo.clone());

    Ok(todo)
}

/// Finds a to-do only if it belongs to `user_id`.
pub async fn find_by_user_id(db: &Database, todo_id: Id, user_id: Id) -> Result<Model, Error> {
    let tables = db.read().await;
    tables
        .todos
        .get(&todo_id)
        .filter(|todo| todo.user_id == user_id)
        .cloned()
        .ok_or_else(not_found)
}

/// Overwrites title, content and type. Text to-dos carry no checklist, so
/// switching to text removes any existing items.
pub async fn update(db: &Database, todo_id: Id, user_id: Id, model: Model) -> Result<Model, Error> {
    let mut tables = db.write().await;
    let todo = owned_mut(&mut tables.todos, todo_id, user_id)?;

    debug!("Existing Todo model to be Updated: {todo:?}");

    todo.title = model.title;
    todo.content = model.content;
    todo.todo_type = model.todo_type;
    if todo.todo_type == TodoType::Text {
        todo.checklist.clear();
    }
    todo.updated_at = Utc::now();

    Ok(todo.clone())
}

pub async fn delete(db: &Database, todo_id: Id, user_id: Id) -> Result<(), Error> {
    let mut tables = db.write().await;
    owned_mut(&mut tables.todos, todo_id, user_id)?;
    tables.todos.remove(&todo_id);
    Ok(())
}

pub async fn set_pinned(db: &Database, todo_id: Id, user_id: Id, pinned: bool) -> Result<Model, Error> {
    let mut tables = db.write().await;
    let todo = owned_mut(&mut tables.todos, todo_id, user_id)?;

    todo.pinned = pinned;
    todo.updated_at = Utc::now();

    Ok(todo.clone())
}

/// Result of [`pin_within_limit`].
#[derive(Debug, Clone, PartialEq)]
pub enum PinOutcome {
    Pinned(Model),
    AlreadyPinned(Model),
    LimitReached,
}

/// Pins a to-do unless the owner already has `max_pinned` pinned to-dos.
/// Counting and pinning happen under one write guard so concurrent pins
/// cannot both slip under the limit.
pub async fn pin_within_limit(
    db: &Database,
    todo_id: Id,
    user_id: Id,
    max_pinned: u64,
) -> Result<PinOutcome, Error> {
    let mut tables = db.write().await;

    let todo = owned_mut(&mut tables.todos, todo_id, user_id)?;
    if todo.pinned {
        return Ok(PinOutcome::AlreadyPinned(todo.clone()));
    }

    if pinned_count(&tables.todos, user_id) >= max_pinned {
        return Ok(PinOutcome::LimitReached);
    }

    let todo = owned_mut(&mut tables.todos, todo_id, user_id)?;
    todo.pinned = true;
    todo.updated_at = Utc::now();

    Ok(PinOutcome::Pinned(todo.clone()))
}

pub async fn count_pinned(db: &Database, user_id: Id) -> Result<u64, Error> {
    let tables = db.read().await;
    Ok(pinned_count(&tables.todos, user_id))
}

fn pinned_count(todos: &std::collections::BTreeMap<Id, Model>, user_id: Id) -> u64 {
    todos
        .values()
        .filter(|todo| todo.user_id == user_id && todo.pinned)
        .count() as u64
}

/// Lists one user's to-dos, applying the filters, sort order and page in `options`.
pub async fn find_by(
    db: &Database,
    user_id: Id,
    mut options: PaginationOptions,
) -> Result<Paginated<Model>, Error> {
    options.configure(&SORT_FIELDS, &FILTERS);

    let title = match optional_filter(&options, "title")? {
        Some(FilterValue::String(title)) => Some(title.to_lowercase()),
        _ => None,
    };
    let pinned = match optional_filter(&options, "pinned")? {
        Some(FilterValue::Boolean(pinned)) => Some(pinned),
        _ => None,
    };
    let todo_type = match optional_filter(&options, "type")? {
        Some(FilterValue::String(value)) => Some(value.parse::<TodoType>().map_err(|_| {
            warn!("Unknown todo type filter: {value}");
            Error::from(EntityApiErrorKind::InvalidQueryTerm)
        })?),
        _ => None,
    };

    let tables = db.read().await;
    let mut todos: Vec<&Model> = tables
        .todos
        .values()
        .filter(|todo| todo.user_id == user_id)
        .filter(|todo| {
            title
                .as_ref()
                .map_or(true, |title| todo.title.to_lowercase().contains(title))
        })
        .filter(|todo| pinned.map_or(true, |pinned| todo.pinned == pinned))
        .filter(|todo| todo_type.map_or(true, |todo_type| todo.todo_type == todo_type))
        .collect();

    todos.sort_by(|a, b| {
        let ordering = compare(a, b, &options.sort_by).then(a.id.cmp(&b.id));
        match options.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let meta = PaginationMeta::new(todos.len() as u64, &options);
    let data = todos
        .into_iter()
        .skip(options.offset())
        .take(options.limit())
        .cloned()
        .collect();

    Ok(Paginated { data, meta })
}

fn optional_filter(options: &PaginationOptions, column: &str) -> Result<Option<FilterValue>, Error> {
    if options.filters.contains_key(column) {
        options.convert_filter(column).map(Some)
    } else {
        Ok(None)
    }
}

fn compare(a: &Model, b: &Model, sort_by: &str) -> Ordering {
    match sort_by {
        "title" => a.title.cmp(&b.title),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        "pinned" => a.pinned.cmp(&b.pinned),
        _ => a.id.cmp(&b.id),
    }
}

pub(crate) fn owned_mut(
    todos: &mut std::collections::BTreeMap<Id, Model>,
    todo_id: Id,
    user_id: Id,
) -> Result<&mut Model, Error> {
    match todos.get_mut(&todo_id) {
        Some(todo) if todo.user_id == user_id => Ok(todo),
        _ => {
            debug!("Todo with id {todo_id} not found for user {user_id}");
            Err(not_found())
        }
    }
}
