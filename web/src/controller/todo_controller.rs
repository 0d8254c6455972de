use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::todo::{index_options, CreateParams, UpdateParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{todo as TodoApi, Id};
use log::*;
use serde_json::json;
use std::collections::HashMap;

/// POST create a new Todo
#[utoipa::path(
    post,
    path = "/todos",
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully Created a New Todo", body = domain::todos::Model),
        (status = 422, description = "Unprocessable Entity"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Todo from: {params:?}");

    let todo = TodoApi::create(
        app_state.db_ref(),
        &app_state.event_bus,
        user.id,
        params.into(),
    )
    .await?;

    debug!("New Todo: {todo:?}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), todo)),
    ))
}

/// GET a page of the authenticated User's Todos
#[utoipa::path(
    get,
    path = "/todos",
    params(
        ("page" = Option<u64>, Query, description = "Page number, starting at 1"),
        ("per_page" = Option<u64>, Query, description = "Page size, at most 100"),
        ("sort_by" = Option<String>, Query, description = "One of 'id', 'title', 'created_at', 'updated_at', 'pinned'", example = "created_at"),
        ("order" = Option<domain::SortOrder>, Query, description = "Sort order, 'asc' or 'desc'"),
        ("filters[title]" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("filters[pinned]" = Option<bool>, Query, description = "Only pinned or unpinned Todos"),
        ("filters[type]" = Option<String>, Query, description = "'text' or 'checklist'"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved a page of Todos"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid filter value"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    let options = index_options(query);
    debug!("GET Todos for User {} with options: {options:?}", user.id);

    let todos = TodoApi::find_by(app_state.db_ref(), user.id, options).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), todos)))
}

/// GET a particular Todo specified by its id.
#[utoipa::path(
    get,
    path = "/todos/{id}",
    params(
        ("id" = u64, Path, description = "Todo id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a specific Todo by its id", body = domain::todos::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo not found"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Todo by id: {id}");

    let todo = TodoApi::find(app_state.db_ref(), id, user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), todo)))
}

#[utoipa::path(
    patch,
    path = "/todos/{id}",
    params(
        ("id" = u64, Path, description = "Id of Todo to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully Updated Todo", body = domain::todos::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo not found"),
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
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH Todo {id} with: {params:?}");

    let todo = TodoApi::update(
        app_state.db_ref(),
        &app_state.event_bus,
        id,
        user.id,
        params.into(),
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), todo)))
}

#[utoipa::path(
    delete,
    path = "/todos/{id}",
    params(
        ("id" = u64, Path, description = "Todo id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted a certain Todo by its id"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo not found"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Todo by id: {id}");

    TodoApi::delete(app_state.db_ref(), &app_state.event_bus, id, user.id).await?;
    Ok(Json(json!({"id": id})))
}

#[utoipa::path(
    patch,
    path = "/todos/{id}/pin",
    params(
        ("id" = u64, Path, description = "Todo id to pin")
    ),
    responses(
        (status = 200, description = "Todo is pinned", body = domain::todos::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo not found"),
        (status = 422, description = "Pinned Todo limit reached"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn pin(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH pin Todo {id}");

    let todo = TodoApi::pin(
        app_state.db_ref(),
        &app_state.config,
        &app_state.event_bus,
        id,
        user.id,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), todo)))
}

#[utoipa::path(
    patch,
    path = "/todos/{id}/unpin",
    params(
        ("id" = u64, Path, description = "Todo id to unpin")
    ),
    responses(
        (status = 200, description = "Todo is unpinned", body = domain::todos::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Todo not found"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unpin(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH unpin Todo {id}");

    let todo = TodoApi::unpin(app_state.db_ref(), &app_state.event_bus, id, user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), todo)))
}
