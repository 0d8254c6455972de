use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::users::Model)]
pub struct Model {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // Password hash, never sent back to clients
    #[serde(skip_serializing)]
    pub password: String,
    // One-time code for resetting a forgotten password
    #[serde(skip_serializing, default)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing, default)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}
