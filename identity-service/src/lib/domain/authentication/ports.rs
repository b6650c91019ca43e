use async_trait::async_trait;

use crate::domain::context::RequestContext;
use crate::domain::errors::AuthError;
use crate::domain::session::models::SessionToken;
use crate::domain::token::models::IssuedToken;
use crate::domain::token::models::TokenContent;
use crate::domain::user::models::UserId;

/// Token pair handed out by a successful login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTokens {
    pub bearer: IssuedToken,
    pub refresh: IssuedToken,
}

/// Port for authentication operations.
///
/// Defines the contract for login, token rotation and logout, independent
/// of the transport.
#[async_trait]
pub trait AuthenticationServicePort: Send + Sync + 'static {
    /// Exchange credentials for a bearer and refresh token.
    ///
    /// Every outcome other than an infrastructure failure is audited.
    ///
    /// # Errors
    /// * `TooManyAttempts` - Too many recent failures for login and address
    /// * `InvalidCredentials` - Unknown login or wrong password
    /// * `InactiveUser` - Account is disabled
    /// * `Token` / `Repository` - Infrastructure failure
    async fn login(
        &self,
        login: &str,
        password: &str,
        context: &RequestContext,
    ) -> Result<LoginTokens, AuthError>;

    /// Rotate a refresh token: the presented session is expired and a new
    /// token pair is issued.
    ///
    /// # Errors
    /// * `TokenNotFound` - No refresh token presented
    /// * `InvalidToken` / `ExpiredToken` - Token cannot be used
    /// * `InvalidToken` / `InactiveUser` - Session owner is gone or disabled
    /// * `Token` / `Repository` - Infrastructure failure
    async fn refresh_tokens(
        &self,
        refresh_token: Option<&str>,
        context: &RequestContext,
    ) -> Result<LoginTokens, AuthError>;

    /// Expire the session of a refresh token, if any. Idempotent.
    ///
    /// # Errors
    /// * `Repository` - Infrastructure failure
    async fn logout(
        &self,
        refresh_token: Option<&str>,
        context: &RequestContext,
    ) -> Result<(), AuthError>;

    /// Expire every session of a user. Idempotent.
    ///
    /// # Returns
    /// Number of sessions expired
    ///
    /// # Errors
    /// * `Repository` - Infrastructure failure
    async fn logout_all(&self, user_id: &UserId, context: &RequestContext)
        -> Result<u64, AuthError>;

    /// Live sessions of a user.
    ///
    /// # Errors
    /// * `Repository` - Infrastructure failure
    async fn active_sessions(&self, user_id: &UserId) -> Result<Vec<SessionToken>, AuthError>;

    /// Hash a new password after checking it against the password policy.
    ///
    /// # Errors
    /// * `WeakPassword` - Password does not meet the policy
    /// * `Password` - Hashing failed
    fn generate_password_hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a bearer token presented on an API call.
    ///
    /// # Errors
    /// * `InvalidToken` / `ExpiredToken` - Token cannot be used
    fn authenticate_bearer(&self, token: &str) -> Result<TokenContent, AuthError>;
}
