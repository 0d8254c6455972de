use chrono::{DateTime, Utc};

/// A bearer token that was invalidated before its natural expiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    pub token: String,
    /// Once past this instant the token is rejected on expiry alone and the
    /// entry can be purged.
    pub expires_at: DateTime<Utc>,
}
