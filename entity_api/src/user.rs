use super::error::{EntityApiErrorKind, Error};
use crate::{not_found, Database};
use chrono::{DateTime, Utc};
use entity::users::Model;
use entity::Id;
use log::*;

/// Inserts a new user, hashing the plaintext password carried in `user_model`.
/// Emails are unique across the store.
pub async fn create(db: &Database, user_model: Model) -> Result<Model, Error> {
    debug!(
        "New User Model to be inserted with email: {}",
        user_model.email
    );

    // Hashing is slow, keep it outside the table lock
    let password = generate_hash(user_model.password);

    let mut tables = db.write().await;
    if tables
        .users
        .values()
        .any(|existing| existing.email == user_model.email)
    {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordAlreadyExists,
        });
    }

    let now = Utc::now();
    let user = Model {
        id: tables.next_user_id(),
        first_name: user_model.first_name,
        last_name: user_model.last_name,
        email: user_model.email,
        password,
        reset_token: None,
        reset_token_expires_at: None,
        created_at: now,
        updated_at: now,
    };
    tables.users.insert(user.id, user.clone());

    Ok(user)
}

pub async fn find_by_email(db: &Database, email: &str) -> Result<Option<Model>, Error> {
    let tables = db.read().await;
    Ok(tables
        .users
        .values()
        .find(|user| user.email == email)
        .cloned())
}

pub async fn find_by_id(db: &Database, id: Id) -> Result<Model, Error> {
    let tables = db.read().await;
    tables.users.get(&id).cloned().ok_or_else(not_found)
}

/// Stores a password reset token for the user, replacing any earlier one.
pub async fn set_reset_token(
    db: &Database,
    id: Id,
    token: String,
    expires_at: DateTime<Utc>,
) -> Result<Model, Error> {
    let mut tables = db.write().await;
    let user = tables.users.get_mut(&id).ok_or_else(not_found)?;

    user.reset_token = Some(token);
    user.reset_token_expires_at = Some(expires_at);
    user.updated_at = Utc::now();

    Ok(user.clone())
}

pub async fn find_by_reset_token(db: &Database, token: &str) -> Result<Model, Error> {
    let tables = db.read().await;
    tables
        .users
        .values()
        .find(|user| user.reset_token.as_deref() == Some(token))
        .cloned()
        .ok_or_else(not_found)
}

/// Replaces the user's password and invalidates any outstanding reset token.
pub async fn update_password(db: &Database, id: Id, password: String) -> Result<Model, Error> {
    let password = generate_hash(password);

    let mut tables = db.write().await;
    let user = tables.users.get_mut(&id).ok_or_else(not_found)?;

    user.password = password;
    user.reset_token = None;
    user.reset_token_expires_at = None;
    user.updated_at = Utc::now();

    Ok(user.clone())
}

/// Looks up the user by email and checks the password against the stored hash.
/// An unknown email and a wrong password are indistinguishable to the caller.
pub async fn verify_credentials(db: &Database, email: &str, password: &str) -> Result<Model, Error> {
    match find_by_email(db, email).await? {
        Some(user) => {
            verify_password(password, &user.password)?;
            Ok(user)
        }
        None => {
            debug!("No user found with email {email}");
            Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordUnauthenticated,
            })
        }
    }
}

pub fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }),
    }
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}
