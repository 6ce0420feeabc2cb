//! Key builders for every presence entry.
//!
//! Keys are logical; the Redis client adds the configured prefix.

use parley_core::types::id::UserId;

/// Key holding the latest connection id of a user.
pub fn user_connection(user_id: &UserId) -> String {
    format!("user:{user_id}")
}

/// Key of the set of every live connection id of a user (multi-connection mode).
pub fn user_connections(user_id: &UserId) -> String {
    format!("user:{user_id}:connections")
}

/// Key of the global set of online user ids.
pub fn online_users() -> String {
    "online_users".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_keys() {
        let id = UserId::new("64f0c2aa");
        assert_eq!(user_connection(&id), "user:64f0c2aa");
        assert_eq!(user_connections(&id), "user:64f0c2aa:connections");
        assert_eq!(online_users(), "online_users");
    }
}
