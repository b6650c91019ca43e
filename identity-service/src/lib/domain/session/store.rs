use std::sync::Arc;

use auth::KeyHasher;

use crate::domain::clock::Clock;
use crate::domain::errors::AuthError;
use crate::domain::session::models::SessionToken;
use crate::domain::session::ports::SessionRepository;
use crate::domain::token::issuer::TokenIssuer;
use crate::domain::token::models::IssuedToken;
use crate::domain::token::models::TokenKind;
use crate::domain::user::models::UserId;

/// Lifecycle of refresh token sessions: issue under the per-user cap,
/// authorize, revoke.
pub struct SessionStore<SR>
where
    SR: SessionRepository,
{
    repository: Arc<SR>,
    issuer: Arc<TokenIssuer>,
    key_hasher: KeyHasher,
    concurrent_sessions: usize,
    clock: Arc<dyn Clock>,
}

impl<SR> SessionStore<SR>
where
    SR: SessionRepository,
{
    pub fn new(
        repository: Arc<SR>,
        issuer: Arc<TokenIssuer>,
        concurrent_sessions: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            issuer,
            key_hasher: KeyHasher::new(),
            concurrent_sessions,
            clock,
        }
    }

    /// Sign a refresh token and persist its session, evicting the oldest
    /// live sessions of the user beyond the cap.
    ///
    /// # Errors
    /// * `Token` - Signing failed
    /// * `Repository` - Session could not be stored
    pub async fn issue_refresh_token(
        &self,
        user_id: &UserId,
        user_agent: &str,
    ) -> Result<IssuedToken, AuthError> {
        let issued = self.issuer.sign_refresh_token(user_id, user_agent)?;
        let now = self.clock.now();
        let session = SessionToken::new(
            *user_id,
            self.key_hasher.hash(&issued.token),
            user_agent.to_string(),
            now,
            issued.expires_at,
        );

        let evicted = self
            .repository
            .insert_capped(&session, self.concurrent_sessions, now)
            .await?;

        if !evicted.is_empty() {
            tracing::info!(
                user_id = %user_id,
                evicted = evicted.len(),
                "Evicted sessions over the concurrent session cap"
            );
        }

        Ok(issued)
    }

    /// Expire the session of a refresh token. Unknown tokens are ignored.
    ///
    /// # Returns
    /// Owner of the session when one matched the token
    ///
    /// # Errors
    /// * `Repository` - Lookup or update failed
    pub async fn revoke_token(&self, token: &str) -> Result<Option<UserId>, AuthError> {
        let Some(session) = self
            .repository
            .find_by_token_hash(&self.key_hasher.hash(token))
            .await?
        else {
            return Ok(None);
        };

        self.repository.expire(&session.id, self.clock.now()).await?;
        Ok(Some(session.owner_user_id))
    }

    /// Expire every live session of a user.
    ///
    /// # Errors
    /// * `Repository` - Update failed
    pub async fn revoke_all_tokens(&self, user_id: &UserId) -> Result<u64, AuthError> {
        let revoked = self
            .repository
            .expire_all_for_owner(user_id, self.clock.now())
            .await?;
        tracing::debug!(user_id = %user_id, revoked, "Revoked all sessions");
        Ok(revoked)
    }

    /// Resolve the live session behind a refresh token.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed, not a refresh token, unknown,
    ///   or owned by someone other than its subject
    /// * `ExpiredToken` - Token or session is expired (revoked, evicted)
    /// * `Repository` - Lookup failed
    pub async fn authorize_refresh(&self, token: &str) -> Result<SessionToken, AuthError> {
        let content = self.issuer.verify(token, TokenKind::Refresh)?;

        let session = self
            .repository
            .find_by_token_hash(&self.key_hasher.hash(token))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !session.is_active_at(self.clock.now()) {
            return Err(AuthError::ExpiredToken);
        }

        if session.owner_user_id != content.user_id {
            return Err(AuthError::InvalidToken);
        }

        Ok(session)
    }

    /// Expire one session during rotation.
    ///
    /// # Errors
    /// * `ExpiredToken` - Session was expired concurrently
    /// * `Repository` - Update failed
    pub async fn revoke_session(&self, session: &SessionToken) -> Result<(), AuthError> {
        if self.repository.expire(&session.id, self.clock.now()).await? {
            Ok(())
        } else {
            Err(AuthError::ExpiredToken)
        }
    }

    /// # Errors
    /// * `Repository` - Lookup failed
    pub async fn active_sessions(&self, user_id: &UserId) -> Result<Vec<SessionToken>, AuthError> {
        Ok(self
            .repository
            .find_active_by_owner(user_id, self.clock.now())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::DateTime;
    use chrono::Duration;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::config::JwtConfig;
    use crate::domain::clock::ManualClock;
    use crate::domain::errors::RepositoryError;
    use crate::domain::session::models::SessionId;

    mock! {
        pub TestSessionRepository {}

        #[async_trait]
        impl SessionRepository for TestSessionRepository {
            async fn insert_capped(
                &self,
                session: &SessionToken,
                cap: usize,
                now: DateTime<Utc>,
            ) -> Result<Vec<SessionId>, RepositoryError>;
            async fn find_by_token_hash(
                &self,
                token_hash: &str,
            ) -> Result<Option<SessionToken>, RepositoryError>;
            async fn find_active_by_owner(
                &self,
                owner: &UserId,
                now: DateTime<Utc>,
            ) -> Result<Vec<SessionToken>, RepositoryError>;
            async fn expire(&self, id: &SessionId, now: DateTime<Utc>) -> Result<bool, RepositoryError>;
            async fn expire_all_for_owner(
                &self,
                owner: &UserId,
                now: DateTime<Utc>,
            ) -> Result<u64, RepositoryError>;
        }
    }

    fn issuer(clock: Arc<ManualClock>) -> Arc<TokenIssuer> {
        let config = JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            issuer: "identity".to_string(),
            audience: "clients".to_string(),
            cookie_name: "refresh_token".to_string(),
            access_token_expiration_ms: 300_000,
            refresh_token_expiration_ms: 1_800_000,
            concurrent_sessions: 3,
            secure_cookie: true,
        };
        Arc::new(TokenIssuer::new(&config, clock))
    }

    fn store(
        repository: MockTestSessionRepository,
    ) -> (
        SessionStore<MockTestSessionRepository>,
        Arc<ManualClock>,
        Arc<TokenIssuer>,
    ) {
        let clock = Arc::new(ManualClock::default());
        let issuer = issuer(clock.clone());
        let store = SessionStore::new(Arc::new(repository), issuer.clone(), 3, clock.clone());
        (store, clock, issuer)
    }

    fn session_for(token: &str, owner: UserId, now: DateTime<Utc>) -> SessionToken {
        SessionToken::new(
            owner,
            KeyHasher::new().hash(token),
            "ua".to_string(),
            now,
            now + Duration::minutes(30),
        )
    }

    #[tokio::test]
    async fn test_issue_stores_digest_with_cap() {
        let mut repository = MockTestSessionRepository::new();
        repository
            .expect_insert_capped()
            .withf(|session, cap, _| {
                *cap == 3 && session.token_hash.len() == 44 && session.expired_at.is_some()
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![SessionId::new()]));
        let (store, _, issuer) = store(repository);
        let user_id = UserId::new();

        let issued = store.issue_refresh_token(&user_id, "ua").await.unwrap();
        let content = issuer.verify(&issued.token, TokenKind::Refresh).unwrap();
        assert_eq!(content.user_id, user_id);
    }

    #[tokio::test]
    async fn test_authorize_unknown_session_is_invalid() {
        let mut repository = MockTestSessionRepository::new();
        repository.expect_find_by_token_hash().returning(|_| Ok(None));
        let (store, _, issuer) = store(repository);
        let token = issuer.sign_refresh_token(&UserId::new(), "ua").unwrap();

        let result = store.authorize_refresh(&token.token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_authorize_revoked_session_is_expired() {
        let clock = Arc::new(ManualClock::default());
        let issuer = issuer(clock.clone());
        let owner = UserId::new();
        let token = issuer.sign_refresh_token(&owner, "ua").unwrap();
        let mut revoked = session_for(&token.token, owner, clock.now());
        revoked.expired_at = Some(clock.now() - Duration::seconds(1));

        let mut repository = MockTestSessionRepository::new();
        repository
            .expect_find_by_token_hash()
            .returning(move |_| Ok(Some(revoked.clone())));
        let store = SessionStore::new(Arc::new(repository), issuer, 3, clock);

        let result = store.authorize_refresh(&token.token).await;
        assert!(matches!(result, Err(AuthError::ExpiredToken)));
    }

    #[tokio::test]
    async fn test_authorize_owner_mismatch_is_invalid() {
        let clock = Arc::new(ManualClock::default());
        let issuer = issuer(clock.clone());
        let token = issuer.sign_refresh_token(&UserId::new(), "ua").unwrap();
        let foreign = session_for(&token.token, UserId::new(), clock.now());

        let mut repository = MockTestSessionRepository::new();
        repository
            .expect_find_by_token_hash()
            .returning(move |_| Ok(Some(foreign.clone())));
        let store = SessionStore::new(Arc::new(repository), issuer, 3, clock);

        let result = store.authorize_refresh(&token.token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_authorize_bearer_token_is_invalid() {
        let repository = MockTestSessionRepository::new();
        let (store, _, issuer) = store(repository);
        let bearer = issuer.issue_bearer_token(&UserId::new(), "ua").unwrap();

        let result = store.authorize_refresh(&bearer.token).await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_revoke_unknown_token_is_a_no_op() {
        let mut repository = MockTestSessionRepository::new();
        repository.expect_find_by_token_hash().returning(|_| Ok(None));
        repository.expect_expire().never();
        let (store, _, _) = store(repository);

        assert_eq!(store.revoke_token("whatever").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_revoke_session_lost_race_is_expired() {
        let mut repository = MockTestSessionRepository::new();
        repository.expect_expire().returning(|_, _| Ok(false));
        let (store, clock, _) = store(repository);
        let session = session_for("token", UserId::new(), clock.now());

        let result = store.revoke_session(&session).await;
        assert!(matches!(result, Err(AuthError::ExpiredToken)));
    }
}
