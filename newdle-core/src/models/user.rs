//! User types.

use serde::{Deserialize, Serialize};

/// The authenticated user, as returned by `/api/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier from the identity provider.
    pub uid: String,
    /// Full display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL (relative to the server).
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One hit of a user search.
///
/// The server signs `email`, `name` and `uid`; the signature must be sent
/// back unchanged when the user is invited to a newdle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSearchResult {
    /// Stable identifier.
    pub uid: String,
    /// Full display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Server signature over the identity fields.
    #[serde(default)]
    pub signature: Option<String>,
}

/// Response of `/api/users/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSearch {
    /// Total number of matches (may exceed `users.len()`).
    pub total: u32,
    /// First page of matches, sorted by name.
    pub users: Vec<UserSearchResult>,
}
