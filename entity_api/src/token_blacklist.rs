use super::error::Error;
use crate::Database;
use chrono::{DateTime, Utc};
use entity::token_blacklist::Model;
use log::*;

/// Records `token` as revoked until `expires_at`.
pub async fn insert(db: &Database, token: String, expires_at: DateTime<Utc>) -> Result<(), Error> {
    let mut tables = db.write().await;
    tables
        .token_blacklist
        .insert(token.clone(), Model { token, expires_at });
    Ok(())
}

pub async fn contains(db: &Database, token: &str) -> Result<bool, Error> {
    let tables = db.read().await;
    Ok(tables.token_blacklist.contains_key(token))
}

/// Drops entries whose tokens have expired on their own and returns how many
/// were removed.
pub async fn purge_expired(db: &Database) -> Result<usize, Error> {
    let now = Utc::now();
    let mut tables = db.write().await;

    let before = tables.token_blacklist.len();
    tables
        .token_blacklist
        .retain(|_, entry| entry.expires_at > now);
    let purged = before - tables.token_blacklist.len();

    if purged > 0 {
        debug!("Purged {purged} expired blacklisted tokens");
    }
    Ok(purged)
}
