use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::checklist::{ItemParams, StatusParams};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{checklist as ChecklistApi, Id};
use log::*;
use serde_json::json;

/// POST add an item to a checklist Todo
#[utoipa::path(
    post,
    path = "/todos/{id}/checklist",
    params(
        ("id" = u64, Path, description = "Id of the checklist Todo")
    ),
    request_body = ItemParams,
    responses(
        (status = 201, description = "Successfully added a checklist item", body = domain::checklist_items::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo not found"),
        (status = 422, description = "Todo is not a checklist or the item is empty"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(todo_id): Path<Id>,
    Json(params): Json<ItemParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST checklist item on Todo {todo_id}");

    let item = ChecklistApi::add(
        app_state.db_ref(),
        &app_state.event_bus,
        todo_id,
        user.id,
        params.item,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), item)),
    ))
}

/// PUT replace the description of a checklist item
#[utoipa::path(
    put,
    path = "/todos/{id}/checklist/{item_id}",
    params(
        ("id" = u64, Path, description = "Id of the checklist Todo"),
        ("item_id" = u64, Path, description = "Id of the checklist item")
    ),
    request_body = ItemParams,
    responses(
        (status = 200, description = "Successfully updated the checklist item", body = domain::checklist_items::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo or item not found"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path((todo_id, item_id)): Path<(Id, Id)>,
    Json(params): Json<ItemParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT checklist item {item_id} on Todo {todo_id}");

    let item = ChecklistApi::update(
        app_state.db_ref(),
        &app_state.event_bus,
        todo_id,
        item_id,
        user.id,
        params.item,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), item)))
}

/// PATCH mark a checklist item as done or not done
#[utoipa::path(
    patch,
    path = "/todos/{id}/checklist/{item_id}",
    params(
        ("id" = u64, Path, description = "Id of the checklist Todo"),
        ("item_id" = u64, Path, description = "Id of the checklist item")
    ),
    request_body = StatusParams,
    responses(
        (status = 200, description = "Successfully updated the checklist item status", body = domain::checklist_items::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo or item not found"),
        (status = 422, description = "Todo is not a checklist"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_status(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path((todo_id, item_id)): Path<(Id, Id)>,
    Json(params): Json<StatusParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH checklist item {item_id} on Todo {todo_id}: done={}", params.done);

    let item = ChecklistApi::update_status(
        app_state.db_ref(),
        &app_state.event_bus,
        todo_id,
        item_id,
        user.id,
        params.done,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), item)))
}

#[utoipa::path(
    delete,
    path = "/todos/{id}/checklist/{item_id}",
    params(
        ("id" = u64, Path, description = "Id of the checklist Todo"),
        ("item_id" = u64, Path, description = "Id of the checklist item")
    ),
    responses(
        (status = 200, description = "Successfully deleted the checklist item"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo or item not found"),
        (status = 422, description = "Todo is not a checklist"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path((todo_id, item_id)): Path<(Id, Id)>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE checklist item {item_id} on Todo {todo_id}");

    ChecklistApi::delete(
        app_state.db_ref(),
        &app_state.event_bus,
        todo_id,
        item_id,
        user.id,
    )
    .await?;

    Ok(Json(json!({"id": item_id})))
}
