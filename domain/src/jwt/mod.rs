//! This module provides functionality for handling JSON Web Tokens (JWTs) within the domain layer.
//! It covers issuing access tokens on login and verifying the bearer tokens presented on every
//! authenticated request, including rejecting tokens that were revoked by logging out.
//!
//! The module also re-exports the `Jwt` struct from the `entity` module for convenience.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::jwt::{issue_token, verify_token};
//!
//! let jwt = issue_token(&config, user.id)?;
//! let user_id = verify_token(&db, &config, &jwt.token).await?;
//! ```

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use chrono::{DateTime, Utc};
use claims::AccessClaims;
use entity::Id;
use entity_api::{token_blacklist, Database};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;

// re-export the Jwt struct from the entity module
pub use entity::jwt::Jwt;

pub(crate) mod claims;

/// Issues a signed HS256 access token for `user_id`, valid for the configured TTL.
pub fn issue_token(config: &Config, user_id: Id) -> Result<Jwt, Error> {
    let secret = signing_secret(config)?;

    let now = Utc::now();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + config.jwt_ttl()).timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(Jwt {
        token,
        exp: claims.exp,
    })
}

/// Checks the signature and expiry of `token`, then rejects it if it has been
/// blacklisted. Returns the id of the user the token was issued to.
pub async fn verify_token(db: &Database, config: &Config, token: &str) -> Result<Id, Error> {
    let claims = decode_claims(config, token)?;

    if token_blacklist::contains(db, token).await? {
        debug!("Rejecting blacklisted token for user {}", claims.sub);
        return Err(Error::unauthenticated());
    }

    claims.sub.parse::<Id>().map_err(|_| {
        warn!("Token subject is not a user id: {}", claims.sub);
        Error::unauthenticated()
    })
}

/// When `token` stops being accepted on expiry alone.
pub fn expires_at(config: &Config, token: &str) -> Result<DateTime<Utc>, Error> {
    let claims = decode_claims(config, token)?;
    DateTime::from_timestamp(claims.exp, 0).ok_or_else(Error::unauthenticated)
}

fn decode_claims(config: &Config, token: &str) -> Result<AccessClaims, Error> {
    let secret = signing_secret(config)?;
    let validation = Validation::new(Algorithm::HS256);

    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| {
        debug!("Token rejected: {err}");
        Error {
            source: Some(Box::new(err)),
            ..Error::unauthenticated()
        }
    })
}

fn signing_secret(config: &Config) -> Result<&str, Error> {
    config.jwt_secret().ok_or_else(|| {
        warn!("Failed to get JWT secret from config");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })
}
