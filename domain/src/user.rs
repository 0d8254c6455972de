use crate::error::Error;
use crate::jwt::{self, Jwt};
use crate::{users, Database, Id};
use chrono::Utc;
use email_address::EmailAddress;
use entity_api::token_blacklist;
use events::{DomainEvent, EventBus};
use log::*;
use rand::Rng;
use serde::Serialize;
use service::config::Config;

pub use entity_api::user::{find_by_email, find_by_id};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: users::Model,
    pub jwt: Jwt,
}

/// Creates an account. Emails are compared case-insensitively, so they are
/// stored lower-cased.
pub async fn register(db: &Database, new_user: NewUser) -> Result<users::Model, Error> {
    let first_name = new_user.first_name.trim();
    let last_name = new_user.last_name.trim();
    let email = new_user.email.trim().to_lowercase();

    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::invalid("first_name and last_name are required"));
    }
    if !EmailAddress::is_valid(&email) {
        return Err(Error::invalid("email must be a valid email address"));
    }
    if new_user.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::invalid(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let now = Utc::now();
    let user = entity_api::user::create(
        db,
        users::Model {
            id: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email,
            password: new_user.password,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    info!("Registered user {}", user.id);
    Ok(user)
}

pub async fn login(
    db: &Database,
    config: &Config,
    credentials: Credentials,
) -> Result<LoginResponse, Error> {
    let email = credentials.email.trim().to_lowercase();
    let user = entity_api::user::verify_credentials(db, &email, &credentials.password).await?;
    let jwt = jwt::issue_token(config, user.id)?;

    debug!("User {} logged in", user.id);
    Ok(LoginResponse { user, jwt })
}

/// Revokes `token` until it would have expired anyway, then tells subscribers
/// the user logged out so their open streams can be closed.
pub async fn logout(
    db: &Database,
    config: &Config,
    event_bus: &EventBus,
    token: &str,
    user_id: Id,
) -> Result<(), Error> {
    let expires_at = jwt::expires_at(config, token)?;
    token_blacklist::insert(db, token.to_string(), expires_at).await?;

    // Opportunistic cleanup keeps the blacklist bounded by live tokens
    let purged = token_blacklist::purge_expired(db).await?;
    trace!("Purged {purged} expired tokens on logout");

    event_bus.publish(DomainEvent::UserLoggedOut { user_id });
    debug!("User {user_id} logged out");
    Ok(())
}

/// Issues a numeric one-time token the user can exchange for a new password.
/// Delivery is out of band; outside production the token is logged so it can
/// be used locally.
pub async fn forgot_password(db: &Database, config: &Config, email: &str) -> Result<(), Error> {
    let email = email.trim().to_lowercase();
    let Some(user) = find_by_email(db, &email).await? else {
        debug!("Password reset requested for unknown email {email}");
        return Err(Error::invalid("email does not exist"));
    };

    let token = reset_token(config.password_reset_token_length);
    let expires_at = Utc::now() + config.password_reset_token_ttl();
    entity_api::user::set_reset_token(db, user.id, token.clone(), expires_at).await?;

    info!("Issued password reset token for user {} expiring at {expires_at}", user.id);
    if !config.is_production() {
        debug!("Password reset token for user {}: {token}", user.id);
    }
    Ok(())
}

/// Exchanges a reset token for a new password. The token is single use.
pub async fn reset_password(db: &Database, token: &str, new_password: String) -> Result<(), Error> {
    if new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::invalid(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let user = match entity_api::user::find_by_reset_token(db, token.trim()).await {
        Ok(user) => user,
        Err(_) => return Err(Error::invalid("reset token is invalid")),
    };

    match user.reset_token_expires_at {
        Some(expires_at) if expires_at > Utc::now() => {}
        _ => {
            debug!("Expired password reset token used for user {}", user.id);
            return Err(Error::invalid("reset token has expired"));
        }
    }

    entity_api::user::update_password(db, user.id, new_password).await?;
    info!("Password reset for user {}", user.id);
    Ok(())
}

fn reset_token(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length.max(1))
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub async fn profile(db: &Database, user_id: Id) -> Result<users::Model, Error> {
    Ok(find_by_id(db, user_id).await?)
}
