use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// API key unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiKeyId(pub Uuid);

impl ApiKeyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ApiKeyId {
    fn default() -> Self {
        Self::new()
    }
}

/// Long-lived machine credential. Only the digest of the key is stored.
///
/// `owner_type` tags the kind of entity `owner_id` points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub owner_id: Uuid,
    pub owner_type: String,
    pub key_hash: String,
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expired_at.is_some_and(|expired_at| expired_at <= now)
    }
}

/// Entity an accepted API key acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPrincipal {
    pub owner_id: Uuid,
    pub owner_type: String,
}
