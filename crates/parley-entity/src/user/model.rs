//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use parley_core::types::id::UserId;

/// Avatar used when an account has none.
pub const DEFAULT_AVATAR: &str =
    "https://icon-library.com/images/anonymous-avatar-icon/anonymous-avatar-icon-25.jpg";

/// A registered user account as stored in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Unique mobile number.
    pub mobile: String,
    /// Password hash. Never leaves the server.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Avatar URL.
    pub pic: String,
    /// Whether the account has admin privileges.
    pub is_admin: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The public view of a user, as carried by presence events.
///
/// Serialized with the field names chat clients already consume
/// (`_id`, `isAdmin`, `createdAt`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier.
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Mobile number.
    pub mobile: String,
    /// Avatar URL.
    pub pic: String,
    /// Admin flag.
    pub is_admin: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Build a minimal profile, mostly useful for seeding in-memory directories.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        let now = Utc::now();
        let username = username.into();
        Self {
            id: id.into(),
            email: format!("{}@parley.local", username.to_lowercase()),
            mobile: String::new(),
            username,
            pic: DEFAULT_AVATAR.to_string(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: UserId::new(user.id),
            username: user.username,
            email: user.email,
            mobile: user.mobile,
            pic: user.pic,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: "64f0c2aa".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            mobile: "5550100".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            pic: DEFAULT_AVATAR.to_string(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_never_serializes_password() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_profile_wire_names() {
        let json = serde_json::to_value(UserProfile::from(sample_user())).unwrap();
        assert_eq!(json["_id"], "64f0c2aa");
        assert_eq!(json["isAdmin"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
