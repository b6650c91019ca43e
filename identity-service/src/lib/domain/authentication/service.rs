use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::PasswordPolicy;

use crate::config::Config;
use crate::domain::authentication::ports::AuthenticationServicePort;
use crate::domain::authentication::ports::LoginTokens;
use crate::domain::clock::Clock;
use crate::domain::context::RequestContext;
use crate::domain::errors::AuthError;
use crate::domain::event::models::AuthEventType;
use crate::domain::event::ports::AuthEventRepository;
use crate::domain::event::recorder::AuthEventRecorder;
use crate::domain::event::throttle::ThrottleGuard;
use crate::domain::session::models::SessionToken;
use crate::domain::session::ports::SessionRepository;
use crate::domain::session::store::SessionStore;
use crate::domain::token::issuer::TokenIssuer;
use crate::domain::token::models::TokenContent;
use crate::domain::token::models::TokenKind;
use crate::domain::user::credentials::CredentialVerifier;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::ApiUserRepository;

/// Domain service implementation for authentication operations.
///
/// Composes credential checks, throttling, auditing and the session store
/// over injected repositories.
pub struct AuthenticationService<UR, SR, ER>
where
    UR: ApiUserRepository,
    SR: SessionRepository,
    ER: AuthEventRepository,
{
    verifier: CredentialVerifier<UR>,
    throttle: ThrottleGuard<ER>,
    recorder: AuthEventRecorder<ER>,
    sessions: SessionStore<SR>,
    issuer: Arc<TokenIssuer>,
    password_hasher: PasswordHasher,
    password_policy: PasswordPolicy,
}

impl<UR, SR, ER> AuthenticationService<UR, SR, ER>
where
    UR: ApiUserRepository,
    SR: SessionRepository,
    ER: AuthEventRepository,
{
    /// Create the service from loaded configuration.
    ///
    /// # Arguments
    /// * `users` - Login-capable user lookup
    /// * `sessions` - Refresh session persistence
    /// * `events` - Audit trail persistence
    /// * `clock` - Source of the current instant
    ///
    /// # Errors
    /// * `InvalidCost` / `InvalidPattern` - Password options are unusable
    pub fn from_config(
        config: &Config,
        users: Arc<UR>,
        sessions: Arc<SR>,
        events: Arc<ER>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PasswordError> {
        let password_hasher = config.password.hasher()?;
        let password_policy = config.password.policy()?;
        let issuer = Arc::new(TokenIssuer::new(&config.jwt, clock.clone()));

        Ok(Self {
            verifier: CredentialVerifier::new(users, password_hasher.clone()),
            throttle: ThrottleGuard::new(
                events.clone(),
                config.login_attempts.threshold,
                config.login_attempts.window(),
                clock.clone(),
            ),
            recorder: AuthEventRecorder::new(events, clock.clone()),
            sessions: SessionStore::new(
                sessions,
                issuer.clone(),
                config.jwt.concurrent_sessions,
                clock,
            ),
            issuer,
            password_hasher,
            password_policy,
        })
    }

    async fn issue_tokens(
        &self,
        user_id: &UserId,
        user_agent: &str,
    ) -> Result<LoginTokens, AuthError> {
        let refresh = self.sessions.issue_refresh_token(user_id, user_agent).await?;
        let bearer = self.issuer.issue_bearer_token(user_id, user_agent)?;
        Ok(LoginTokens { bearer, refresh })
    }
}

#[async_trait]
impl<UR, SR, ER> AuthenticationServicePort for AuthenticationService<UR, SR, ER>
where
    UR: ApiUserRepository,
    SR: SessionRepository,
    ER: AuthEventRepository,
{
    async fn login(
        &self,
        login: &str,
        password: &str,
        context: &RequestContext,
    ) -> Result<LoginTokens, AuthError> {
        if self
            .throttle
            .has_too_many_attempts(login, &context.ip_address)
            .await?
        {
            let err = AuthError::TooManyAttempts;
            self.recorder
                .record(
                    AuthEventType::LoginTooManyRequests,
                    Some(&err),
                    None,
                    Some(login),
                    context,
                )
                .await?;
            tracing::warn!(ip_address = %context.ip_address, "Login throttled");
            return Err(err);
        }

        let user = match self.verifier.verify_credentials(login, password).await {
            Ok(user) => user,
            Err(err) if err.is_unauthorized() => {
                self.recorder
                    .record(
                        AuthEventType::LoginFailure,
                        Some(&err),
                        None,
                        Some(login),
                        context,
                    )
                    .await?;
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let tokens = match self.issue_tokens(&user.id, &context.user_agent).await {
            Ok(tokens) => tokens,
            Err(err) => {
                if let Err(record_err) = self
                    .recorder
                    .record(
                        AuthEventType::LoginFailure,
                        Some(&err),
                        Some(&user.id),
                        Some(login),
                        context,
                    )
                    .await
                {
                    tracing::error!(
                        user_id = %user.id,
                        error = %record_err,
                        "Failed to record login failure"
                    );
                }
                return Err(err);
            }
        };

        self.recorder
            .record(
                AuthEventType::LoginSuccess,
                None,
                Some(&user.id),
                Some(login),
                context,
            )
            .await?;

        Ok(tokens)
    }

    async fn refresh_tokens(
        &self,
        refresh_token: Option<&str>,
        context: &RequestContext,
    ) -> Result<LoginTokens, AuthError> {
        let token = presented(refresh_token).ok_or(AuthError::TokenNotFound)?;

        let session = self.sessions.authorize_refresh(token).await?;
        self.verifier.verify_owner(&session.owner_user_id).await?;
        self.sessions.revoke_session(&session).await?;

        tracing::debug!(user_id = %session.owner_user_id, session_id = %session.id, "Rotating refresh token");
        self.issue_tokens(&session.owner_user_id, &context.user_agent)
            .await
    }

    async fn logout(
        &self,
        refresh_token: Option<&str>,
        context: &RequestContext,
    ) -> Result<(), AuthError> {
        let Some(token) = presented(refresh_token) else {
            return Ok(());
        };

        if let Some(owner) = self.sessions.revoke_token(token).await? {
            self.recorder
                .record(AuthEventType::Logout, None, Some(&owner), None, context)
                .await?;
        }

        Ok(())
    }

    async fn logout_all(
        &self,
        user_id: &UserId,
        context: &RequestContext,
    ) -> Result<u64, AuthError> {
        let revoked = self.sessions.revoke_all_tokens(user_id).await?;
        self.recorder
            .record(AuthEventType::LogoutAll, None, Some(user_id), None, context)
            .await?;
        Ok(revoked)
    }

    async fn active_sessions(&self, user_id: &UserId) -> Result<Vec<SessionToken>, AuthError> {
        self.sessions.active_sessions(user_id).await
    }

    fn generate_password_hash(&self, password: &str) -> Result<String, AuthError> {
        self.password_policy.validate(password)?;
        Ok(self.password_hasher.hash(password)?)
    }

    fn authenticate_bearer(&self, token: &str) -> Result<TokenContent, AuthError> {
        self.issuer.verify(token, TokenKind::Bearer)
    }
}

fn presented(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|token| !token.is_empty())
}
