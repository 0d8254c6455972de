use crate::extractors::RejectionType;
use crate::middleware::auth::CurrentUser;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use domain::users;
use log::*;

pub(crate) struct AuthenticatedUser(pub users::Model);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // Reads the user that `require_auth` verified for this request. A handler
    // mounted without that middleware always rejects with Unauthorized.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(current) => Ok(AuthenticatedUser(current.user.clone())),
            None => {
                warn!("AuthenticatedUser extracted on a route without require_auth");
                Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
            }
        }
    }
}
