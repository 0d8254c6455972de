use crate::controller::ApiResponse;
use crate::extractors::{authenticated_user::AuthenticatedUser, bearer_token::BearerToken};
use crate::params::user::LoginParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::user as UserApi;
use log::*;

/// Logs the user in and returns a signed access token.
///
/// Pass the token back on every protected call, e.g.:
/// curl --header "Authorization: Bearer <token>" http://localhost:4000/todos
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginParams,
    responses(
        (status = 200, description = "Logs in and returns the user with an access token"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> Result<impl IntoResponse, Error> {
    let login = UserApi::login(app_state.db_ref(), &app_state.config, params.into()).await?;

    debug!("Issued token for User {}", login.user.id);
    Ok(Json(ApiResponse::new(StatusCode::OK.into(), login)))
}

/// Logs the user out by revoking the presented token and closing the user's
/// open event streams.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Successfully logged out"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    AuthenticatedUser(user): AuthenticatedUser,
    BearerToken(token): BearerToken,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    trace!("UserSessionController::logout()");

    UserApi::logout(
        app_state.db_ref(),
        &app_state.config,
        &app_state.event_bus,
        &token,
        user.id,
    )
    .await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::OK.into())))
}
