//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Root user document, stored at `users/{userId}`.
///
/// Older accounts may hold nothing but `email`; every other field defaults
/// to empty and is filled in on the next sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Authentication provider user id (also used as document ID)
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// When the account was registered
    #[serde(default)]
    pub created_at: String,
    /// Last successful sign-in
    #[serde(default)]
    pub last_active: String,
}

impl User {
    /// Fill the id from the document key when the stored body lacks it.
    pub fn with_document_id(mut self, user_id: &str) -> Self {
        if self.user_id.is_empty() {
            self.user_id = user_id.to_string();
        }
        self
    }
}

/// The signed-in user, passed explicitly to every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}
