use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::user::models::UserId;

/// Session unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
}

/// Persisted refresh token. Only the digest of the token is stored.
///
/// Records are never deleted; revocation and eviction stamp `expired_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub id: SessionId,
    pub owner_user_id: UserId,
    pub token_hash: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    pub fn new(
        owner_user_id: UserId,
        token_hash: String,
        user_agent: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            owner_user_id,
            token_hash,
            user_agent,
            created_at,
            expired_at: Some(expires_at),
        }
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        match self.expired_at {
            Some(expired_at) if expired_at <= now => SessionState::Expired,
            _ => SessionState::Active,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == SessionState::Active
    }
}

/// Pick the sessions to expire so that one more can be inserted without
/// exceeding `cap` live sessions.
///
/// `live` must only hold sessions active at the decision instant. The
/// newest `cap - 1` survive; everything older is returned.
pub fn select_evictions(live: &[SessionToken], cap: usize) -> Vec<SessionId> {
    if live.len() < cap {
        return Vec::new();
    }

    let mut newest_first: Vec<&SessionToken> = live.iter().collect();
    newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    newest_first
        .into_iter()
        .skip(cap.saturating_sub(1))
        .map(|session| session.id)
        .collect()
}
