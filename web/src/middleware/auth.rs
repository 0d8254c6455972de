use crate::{AppState, Error};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::{jwt, users};
use log::*;

/// The authenticated caller of a request, placed in the request extensions by
/// `require_auth`.
#[derive(Clone, Debug)]
pub(crate) struct CurrentUser {
    pub(crate) user: users::Model,
    pub(crate) token: String,
}

/// Authentication middleware that returns 401 Unauthorized unless the request
/// carries a valid, non-revoked `Authorization: Bearer <token>` header.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        trace!("Request without bearer token");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };
    let token = token.to_string();

    let user_id = match jwt::verify_token(app_state.db_ref(), &app_state.config, &token).await {
        Ok(user_id) => user_id,
        Err(err) => return Error::from(err).into_response(),
    };

    // The account may have vanished since the token was issued
    let user = match domain::user::find_by_id(app_state.db_ref(), user_id).await {
        Ok(user) => user,
        Err(_) => {
            warn!("Valid token for unknown user {user_id}");
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    request
        .extensions_mut()
        .insert(CurrentUser { user, token });
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
