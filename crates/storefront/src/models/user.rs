//! User domain types.

use chrono::{DateTime, Utc};

use gebeya_core::{Email, Role, UserId};

/// A site account with its profile role.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Role from the user's profile.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown in the header and prefilled on forms.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }
}

/// Data needed to create an account. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId::new(1),
            username: "mulu".to_string(),
            email: Email::parse("mulu@example.com").unwrap(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            role: Role::Customer,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user("Mulu", "Bekele").display_name(), "Mulu Bekele");
        assert_eq!(user("", "").display_name(), "mulu");
    }
}
