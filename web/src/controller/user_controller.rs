use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::user::{ForgotPasswordParams, RegisterParams, ResetPasswordParams};
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::user as UserApi;
use log::*;

/// POST register a new User
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterParams,
    responses(
        (status = 201, description = "Successfully registered a new User", body = domain::users::Model),
        (status = 409, description = "Email is already registered"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(params): Json<RegisterParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Register a new User: {}", params.email);

    let user = UserApi::register(app_state.db_ref(), params.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), user)),
    ))
}

/// GET the profile of the authenticated User
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Successfully retrieved the current User", body = domain::users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn profile(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    trace!("GET profile for User {}", user.id);

    let user = UserApi::profile(app_state.db_ref(), user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// POST request a password reset token for an email address
#[utoipa::path(
    post,
    path = "/auth/password/forgot",
    request_body = ForgotPasswordParams,
    responses(
        (status = 204, description = "A reset token was issued"),
        (status = 422, description = "Email does not exist"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(params): Json<ForgotPasswordParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Forgot password for {}", params.email);

    UserApi::forgot_password(app_state.db_ref(), &app_state.config, &params.email).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST exchange a reset token for a new password
#[utoipa::path(
    post,
    path = "/auth/password/reset",
    request_body = ResetPasswordParams,
    responses(
        (status = 204, description = "Password was reset"),
        (status = 422, description = "Reset token is invalid or expired"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    Json(params): Json<ResetPasswordParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Reset password");

    UserApi::reset_password(app_state.db_ref(), &params.reset_token, params.new_password).await?;

    Ok(StatusCode::NO_CONTENT)
}
