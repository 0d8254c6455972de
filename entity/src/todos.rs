use crate::{checklist_items, todo_type::TodoType, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::todos::Model)]
pub struct Model {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    /// Only set for text to-dos
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub todo_type: TodoType,
    pub pinned: bool,
    /// Only populated for checklist to-dos
    pub checklist: Vec<checklist_items::Model>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}
