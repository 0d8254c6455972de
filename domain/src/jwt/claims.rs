//! Claims carried by the bearer tokens issued on login.

use serde::{Deserialize, Serialize};

/// Represents the claims of an access token.
///
/// `sub` holds the user id as a string, as registered JWT claims require.
/// `exp` and `iat` are unix timestamps in seconds.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct AccessClaims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
    pub(crate) iat: i64,
}
