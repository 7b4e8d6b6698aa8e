//! Users that own tasks
//!
//! Users are read-only from the client's point of view.

use serde::{Deserialize, Serialize};

/// Placeholder rendered when a task references an unknown user
pub const USER_NOT_FOUND: &str = "User not found";
/// Placeholder rendered when the owning user (and so the email) is unknown
pub const EMAIL_NOT_FOUND: &str = "Email not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Find a user by id
pub fn find_user(users: &[User], id: i64) -> Option<&User> {
    users.iter().find(|u| u.id == id)
}

/// Name of the responsible user, or the placeholder
pub fn responsible_name(users: &[User], id: i64) -> &str {
    find_user(users, id).map_or(USER_NOT_FOUND, |u| u.name.as_str())
}

/// Email of the responsible user, or the placeholder
pub fn responsible_email(users: &[User], id: i64) -> &str {
    find_user(users, id).map_or(EMAIL_NOT_FOUND, |u| u.email.as_str())
}
