use serde::Deserialize;
use utoipa::ToSchema;

/// Body of the create and update checklist item endpoints.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ItemParams {
    pub(crate) item: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct StatusParams {
    pub(crate) done: bool,
}
