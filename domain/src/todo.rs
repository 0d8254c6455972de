use crate::error::Error;
use crate::todo_type::TodoType;
use crate::{checklist_items, todos, Database, Id, Paginated, PaginationOptions};
use chrono::Utc;
use entity_api::todo::PinOutcome;
use events::{DomainEvent, EventBus};
use log::*;
use service::config::Config;

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub content: Option<String>,
    pub todo_type: TodoType,
    pub checklist: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TodoChanges {
    pub title: String,
    pub content: Option<String>,
    pub todo_type: TodoType,
}

/// Creates a to-do. Text to-dos need content; checklist to-dos need at least
/// one item and never keep content.
pub async fn create(
    db: &Database,
    event_bus: &EventBus,
    user_id: Id,
    new_todo: NewTodo,
) -> Result<todos::Model, Error> {
    let title = required_title(&new_todo.title)?;
    let content = content_for(new_todo.todo_type, new_todo.content)?;

    let checklist = match new_todo.todo_type {
        TodoType::Text => Vec::new(),
        TodoType::Checklist => {
            if new_todo.checklist.is_empty() {
                return Err(Error::invalid("checklist must contain at least one item"));
            }
            let now = Utc::now();
            new_todo
                .checklist
                .into_iter()
                .map(|description| {
                    let description = description.trim();
                    if description.is_empty() {
                        return Err(Error::invalid("checklist items must not be empty"));
                    }
                    Ok(checklist_items::Model {
                        id: 0,
                        todo_id: 0,
                        description: description.to_string(),
                        done: false,
                        created_at: now,
                        updated_at: now,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?
        }
    };

    let now = Utc::now();
    let todo = entity_api::todo::create(
        db,
        user_id,
        todos::Model {
            id: 0,
            user_id,
            title,
            content,
            todo_type: new_todo.todo_type,
            pinned: false,
            checklist,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    event_bus.publish(DomainEvent::TodoCreated {
        todo_id: todo.id,
        user_id,
    });
    Ok(todo)
}

/// Replaces title, content and type. Changing to text drops the checklist and
/// changing to checklist clears the content.
pub async fn update(
    db: &Database,
    event_bus: &EventBus,
    todo_id: Id,
    user_id: Id,
    changes: TodoChanges,
) -> Result<todos::Model, Error> {
    let title = required_title(&changes.title)?;
    let content = content_for(changes.todo_type, changes.content)?;

    let existing = entity_api::todo::find_by_user_id(db, todo_id, user_id).await?;
    debug!("Updating todo {} ({} -> {})", existing.id, existing.todo_type, changes.todo_type);

    let todo = entity_api::todo::update(
        db,
        todo_id,
        user_id,
        todos::Model {
            title,
            content,
            todo_type: changes.todo_type,
            ..existing
        },
    )
    .await?;

    event_bus.publish(DomainEvent::TodoUpdated { todo_id, user_id });
    Ok(todo)
}

pub async fn delete(db: &Database, event_bus: &EventBus, todo_id: Id, user_id: Id) -> Result<(), Error> {
    entity_api::todo::delete(db, todo_id, user_id).await?;

    event_bus.publish(DomainEvent::TodoDeleted { todo_id, user_id });
    Ok(())
}

/// Pins a to-do unless the user already has `max_pinned_todos` pinned.
/// Pinning an already pinned to-do changes nothing and publishes nothing.
pub async fn pin(
    db: &Database,
    config: &Config,
    event_bus: &EventBus,
    todo_id: Id,
    user_id: Id,
) -> Result<todos::Model, Error> {
    match entity_api::todo::pin_within_limit(db, todo_id, user_id, config.max_pinned_todos).await? {
        PinOutcome::Pinned(todo) => {
            event_bus.publish(DomainEvent::TodoUpdated { todo_id, user_id });
            Ok(todo)
        }
        PinOutcome::AlreadyPinned(todo) => Ok(todo),
        PinOutcome::LimitReached => {
            info!("User {user_id} reached the pinned todo limit of {}", config.max_pinned_todos);
            Err(Error::invalid(format!(
                "you can only pin {} todos",
                config.max_pinned_todos
            )))
        }
    }
}

pub async fn unpin(db: &Database, event_bus: &EventBus, todo_id: Id, user_id: Id) -> Result<todos::Model, Error> {
    let todo = entity_api::todo::set_pinned(db, todo_id, user_id, false).await?;

    event_bus.publish(DomainEvent::TodoUpdated { todo_id, user_id });
    Ok(todo)
}

pub async fn find(db: &Database, todo_id: Id, user_id: Id) -> Result<todos::Model, Error> {
    Ok(entity_api::todo::find_by_user_id(db, todo_id, user_id).await?)
}

pub async fn find_by(
    db: &Database,
    user_id: Id,
    options: PaginationOptions,
) -> Result<Paginated<todos::Model>, Error> {
    Ok(entity_api::todo::find_by(db, user_id, options).await?)
}

fn required_title(title: &str) -> Result<String, Error> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::invalid("title is required"));
    }
    Ok(title.to_string())
}

fn content_for(todo_type: TodoType, content: Option<String>) -> Result<Option<String>, Error> {
    match todo_type {
        TodoType::Text => match content {
            Some(content) if !content.trim().is_empty() => Ok(Some(content)),
            _ => Err(Error::invalid("content is required for text todos")),
        },
        TodoType::Checklist => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use crate::test_support::{next_event, no_event, recording_bus, test_config};
    use clap::Parser;

    fn text(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            content: Some("some content".to_string()),
            todo_type: TodoType::Text,
            checklist: Vec::new(),
        }
    }

    fn checklist(title: &str, items: &[&str]) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            content: Some("ignored".to_string()),
            todo_type: TodoType::Checklist,
            checklist: items.iter().map(|item| item.to_string()).collect(),
        }
    }

    fn is_kind(err: &Error, kind: EntityErrorKind) -> bool {
        err.error_kind == DomainErrorKind::Internal(InternalErrorKind::Entity(kind))
    }

    #[tokio::test]
    async fn create_publishes_after_write() {
        let db = Database::new();
        let (bus, mut events) = recording_bus();

        let todo = create(&db, &bus, 3, text("Write report")).await.unwrap();

        assert_eq!(
            next_event(&mut events).await,
            DomainEvent::TodoCreated {
                todo_id: todo.id,
                user_id: 3
            }
        );
        assert!(find(&db, todo.id, 3).await.is_ok());
    }

    #[tokio::test]
    async fn create_checklist_clears_content() {
        let db = Database::new();
        let (bus, _events) = recording_bus();

        let todo = create(&db, &bus, 3, checklist("Groceries", &["milk", "eggs"]))
            .await
            .unwrap();

        assert_eq!(todo.content, None);
        assert_eq!(todo.checklist.len(), 2);
    }

    #[tokio::test]
    async fn create_rejects_invalid_todos_without_publishing() {
        let db = Database::new();
        let (bus, mut events) = recording_bus();

        let mut no_content = text("Write report");
        no_content.content = None;

        for invalid in [
            no_content,
            text("   "),
            checklist("Groceries", &[]),
            checklist("Groceries", &["milk", ""]),
        ] {
            let err = create(&db, &bus, 3, invalid).await.unwrap_err();
            assert!(is_kind(&err, EntityErrorKind::Invalid));
        }
        assert!(no_event(&mut events).await);
    }

    #[tokio::test]
    async fn update_switches_type() {
        let db = Database::new();
        let (bus, mut events) = recording_bus();
        let todo = create(&db, &bus, 3, checklist("Groceries", &["milk"]))
            .await
            .unwrap();
        next_event(&mut events).await;

        let updated = update(
            &db,
            &bus,
            todo.id,
            3,
            TodoChanges {
                title: "Notes".to_string(),
                content: Some("buy milk".to_string()),
                todo_type: TodoType::Text,
            },
        )
        .await
        .unwrap();

        assert!(updated.checklist.is_empty());
        assert_eq!(updated.content.as_deref(), Some("buy milk"));
        assert_eq!(
            next_event(&mut events).await,
            DomainEvent::TodoUpdated {
                todo_id: todo.id,
                user_id: 3
            }
        );
    }

    #[tokio::test]
    async fn operations_on_other_users_todos_are_not_found() {
        let db = Database::new();
        let (bus, _events) = recording_bus();
        let config = test_config();
        let todo = create(&db, &bus, 3, text("Mine")).await.unwrap();

        assert!(is_kind(
            &delete(&db, &bus, todo.id, 4).await.unwrap_err(),
            EntityErrorKind::NotFound
        ));
        assert!(is_kind(
            &pin(&db, &config, &bus, todo.id, 4).await.unwrap_err(),
            EntityErrorKind::NotFound
        ));
        assert!(is_kind(
            &find(&db, todo.id, 4).await.unwrap_err(),
            EntityErrorKind::NotFound
        ));
    }

    #[tokio::test]
    async fn pin_respects_limit() {
        let db = Database::new();
        let (bus, mut events) = recording_bus();
        let config = test_config();
        let first = create(&db, &bus, 3, text("First")).await.unwrap();
        let second = create(&db, &bus, 3, text("Second")).await.unwrap();
        next_event(&mut events).await;
        next_event(&mut events).await;

        assert!(pin(&db, &config, &bus, first.id, 3).await.unwrap().pinned);
        next_event(&mut events).await;

        // Already pinned is a no-op
        assert!(pin(&db, &config, &bus, first.id, 3).await.unwrap().pinned);
        assert!(no_event(&mut events).await);

        let err = pin(&db, &config, &bus, second.id, 3).await.unwrap_err();
        assert!(is_kind(&err, EntityErrorKind::Invalid));
        assert_eq!(err.validation_message(), Some("you can only pin 1 todos"));

        unpin(&db, &bus, first.id, 3).await.unwrap();
        assert!(pin(&db, &config, &bus, second.id, 3).await.unwrap().pinned);
    }

    #[tokio::test]
    async fn simultaneous_pins_respect_limit() {
        let db = Database::new();
        let (bus, mut events) = recording_bus();
        let config = test_config();
        let first = create(&db, &bus, 3, text("First")).await.unwrap();
        let second = create(&db, &bus, 3, text("Second")).await.unwrap();
        next_event(&mut events).await;
        next_event(&mut events).await;

        let (a, b) = tokio::join!(
            pin(&db, &config, &bus, first.id, 3),
            pin(&db, &config, &bus, second.id, 3)
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(entity_api::todo::count_pinned(&db, 3).await.unwrap(), 1);
        next_event(&mut events).await;
        assert!(no_event(&mut events).await);
    }

    #[tokio::test]
    async fn pin_limit_is_configurable() {
        let db = Database::new();
        let (bus, _events) = recording_bus();
        let config = Config::parse_from(["todo_notify_rs", "--max-pinned-todos", "2"]);
        let first = create(&db, &bus, 3, text("First")).await.unwrap();
        let second = create(&db, &bus, 3, text("Second")).await.unwrap();

        pin(&db, &config, &bus, first.id, 3).await.unwrap();
        pin(&db, &config, &bus, second.id, 3).await.unwrap();

        assert_eq!(entity_api::todo::count_pinned(&db, 3).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_publishes_event() {
        let db = Database::new();
        let (bus, mut events) = recording_bus();
        let todo = create(&db, &bus, 3, text("Done soon")).await.unwrap();
        next_event(&mut events).await;

        delete(&db, &bus, todo.id, 3).await.unwrap();

        assert_eq!(
            next_event(&mut events).await,
            DomainEvent::TodoDeleted {
                todo_id: todo.id,
                user_id: 3
            }
        );
        assert!(find(&db, todo.id, 3).await.is_err());
    }
}
