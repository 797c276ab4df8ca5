//! User entity.

use crate::domain::value_objects::{Email, UserRole};
use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A marketplace account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Unique login name; also the session cache key.
    pub username: String,

    /// Unique email address.
    pub email: Email,

    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a fresh id.
    #[must_use]
    pub fn new(username: impl Into<String>, email: Email, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            email,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the user as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_timestamps_match() {
        let user = User::new(
            "alice",
            Email::new("alice@shop.example").unwrap(),
            UserRole::Customer,
        );
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(user.username, "alice");
    }
}
