use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Owner type tag for [`ApiUser`] records.
pub const API_USER_TYPE: &str = "api_user";

/// Identity able to log in.
///
/// Owned by account management; the authentication core only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUser {
    pub id: UserId,
    pub login: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_serializes_as_bare_uuid() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
        assert_eq!(serde_json::from_str::<UserId>(&json).unwrap(), id);
    }
}
