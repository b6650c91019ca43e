use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::api_key::models::ApiKey;
use crate::domain::api_key::ports::ApiKeyRepository;
use crate::domain::api_key::ports::KeyOwnerRepository;
use crate::domain::errors::RepositoryError;
use crate::domain::event::models::AuthEvent;
use crate::domain::event::models::AuthEventType;
use crate::domain::event::ports::AuthEventRepository;
use crate::domain::session::models::select_evictions;
use crate::domain::session::models::SessionId;
use crate::domain::session::models::SessionToken;
use crate::domain::session::ports::SessionRepository;
use crate::domain::user::models::ApiUser;
use crate::domain::user::models::UserId;
use crate::domain::user::models::API_USER_TYPE;
use crate::domain::user::ports::ApiUserRepository;

/// Process-local store implementing every repository port.
///
/// Used when no database is configured and by the tests. Sessions sit
/// behind a single mutex so capped inserts are serialized.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<ApiUser>>,
    sessions: Mutex<Vec<SessionToken>>,
    events: RwLock<Vec<AuthEvent>>,
    api_keys: RwLock<Vec<ApiKey>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user with the same id.
    pub async fn add_user(&self, user: ApiUser) {
        let mut users = self.users.write().await;
        users.retain(|existing| existing.id != user.id);
        users.push(user);
    }

    pub async fn remove_user(&self, id: &UserId) {
        self.users.write().await.retain(|user| user.id != *id);
    }

    pub async fn add_api_key(&self, key: ApiKey) {
        self.api_keys.write().await.push(key);
    }

    /// Snapshot of the audit trail in insertion order.
    pub async fn events(&self) -> Vec<AuthEvent> {
        self.events.read().await.clone()
    }

    /// Snapshot of every session ever stored.
    pub async fn sessions(&self) -> Vec<SessionToken> {
        self.sessions.lock().await.clone()
    }
}

#[async_trait]
impl ApiUserRepository for InMemoryStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<ApiUser>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.login == login)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<ApiUser>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == *id)
            .cloned())
    }
}

#[async_trait]
impl KeyOwnerRepository for InMemoryStore {
    fn owner_type(&self) -> &'static str {
        API_USER_TYPE
    }

    async fn owner_exists(&self, owner_id: &Uuid) -> Result<bool, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .any(|user| user.id.0 == *owner_id))
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn insert_capped(
        &self,
        session: &SessionToken,
        cap: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionId>, RepositoryError> {
        let mut sessions = self.sessions.lock().await;

        let live: Vec<SessionToken> = sessions
            .iter()
            .filter(|s| s.owner_user_id == session.owner_user_id && s.is_active_at(now))
            .cloned()
            .collect();
        let evicted = select_evictions(&live, cap);

        for stored in sessions.iter_mut() {
            if evicted.contains(&stored.id) {
                stored.expired_at = Some(now);
            }
        }
        sessions.push(session.clone());

        Ok(evicted)
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionToken>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .await
            .iter()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn find_active_by_owner(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionToken>, RepositoryError> {
        let mut active: Vec<SessionToken> = self
            .sessions
            .lock()
            .await
            .iter()
            .filter(|s| s.owner_user_id == *owner && s.is_active_at(now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn expire(&self, id: &SessionId, now: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        match sessions
            .iter_mut()
            .find(|s| s.id == *id && s.is_active_at(now))
        {
            Some(session) => {
                session.expired_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn expire_all_for_owner(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let mut expired = 0;
        for session in sessions
            .iter_mut()
            .filter(|s| s.owner_user_id == *owner && s.is_active_at(now))
        {
            session.expired_at = Some(now);
            expired += 1;
        }
        Ok(expired)
    }
}

#[async_trait]
impl AuthEventRepository for InMemoryStore {
    async fn append(&self, event: &AuthEvent) -> Result<(), RepositoryError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn count_since(
        &self,
        event_type: AuthEventType,
        payload: &str,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let count = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| {
                e.event_type == event_type
                    && e.payload.as_deref() == Some(payload)
                    && e.ip_address == ip_address
                    && e.created_at > since
            })
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryStore {
    async fn find_by_hash(
        &self,
        key_hash: &str,
        owner_type: &str,
    ) -> Result<Option<ApiKey>, RepositoryError> {
        Ok(self
            .api_keys
            .read()
            .await
            .iter()
            .find(|key| key.key_hash == key_hash && key.owner_type == owner_type)
            .cloned())
    }
}
