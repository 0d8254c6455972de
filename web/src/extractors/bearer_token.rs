use crate::extractors::RejectionType;
use crate::middleware::auth::CurrentUser;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

/// The verified bearer token of the current request.
pub(crate) struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|current| BearerToken(current.token.clone()))
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
    }
}
