use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Whether a to-do holds free text or a list of checklist items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TodoType {
    #[default]
    Text,
    Checklist,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TodoTypeParseError;

impl FromStr for TodoType {
    type Err = TodoTypeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "text" => Ok(TodoType::Text),
            "checklist" => Ok(TodoType::Checklist),
            _ => Err(TodoTypeParseError),
        }
    }
}

impl fmt::Display for TodoType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TodoType::Text => write!(f, "text"),
            TodoType::Checklist => write!(f, "checklist"),
        }
    }
}
