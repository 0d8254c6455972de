pub use entity::{checklist_items, todo_type, todos, users, Id};

pub mod checklist_item;
pub mod database;
pub mod error;
pub mod query;
pub mod todo;
pub mod token_blacklist;
pub mod user;

pub use database::Database;

pub(crate) fn not_found() -> error::Error {
    error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::RecordNotFound,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::Utc;

    pub(crate) async fn create_user(db: &Database, email: &str) -> users::Model {
        user::create(
            db,
            users::Model {
                id: 0,
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: email.to_string(),
                password: "password123".to_string(),
                reset_token: None,
                reset_token_expires_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap()
    }

    pub(crate) fn text_todo(title: &str) -> todos::Model {
        todos::Model {
            id: 0,
            user_id: 0,
            title: title.to_string(),
            content: Some(format!("{title} content")),
            todo_type: todo_type::TodoType::Text,
            pinned: false,
            checklist: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn checklist_todo(title: &str, items: &[&str]) -> todos::Model {
        todos::Model {
            content: None,
            todo_type: todo_type::TodoType::Checklist,
            checklist: items
                .iter()
                .map(|description| checklist_items::Model {
                    id: 0,
                    todo_id: 0,
                    description: description.to_string(),
                    done: false,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .collect(),
            ..text_todo(title)
        }
    }
}
