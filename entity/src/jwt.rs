use serde::Serialize;
use utoipa::ToSchema;

/// Represents a JSON Web Token (JWT) issued on login.
/// Note: This struct does not have a corresponding table in the store.
///
/// - `token`: the encoded JWT to send as `Authorization: Bearer <token>`.
/// - `exp`: expiry as a unix timestamp, for clients that want to refresh
///   proactively without decoding the token.
#[derive(Serialize, Debug, Clone, ToSchema)]
#[schema(as = jwt::Jwt)] // OpenAPI schema
pub struct Jwt {
    pub token: String,
    pub exp: i64,
}
