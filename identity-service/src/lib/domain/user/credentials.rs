use std::sync::Arc;

use auth::PasswordHasher;

use crate::domain::errors::AuthError;
use crate::domain::user::models::ApiUser;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::ApiUserRepository;

/// Checks a login/password pair against the stored user.
///
/// Read-only: recording the outcome is the caller's job.
pub struct CredentialVerifier<UR>
where
    UR: ApiUserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
}

impl<UR> CredentialVerifier<UR>
where
    UR: ApiUserRepository,
{
    pub fn new(repository: Arc<UR>, password_hasher: PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    /// Resolve the user behind a login and check the password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown login or password mismatch
    /// * `InactiveUser` - Account is disabled, whatever the password
    /// * `Repository` - Lookup failed
    pub async fn verify_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<ApiUser, AuthError> {
        let user = self
            .repository
            .find_by_login(login)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        let matches = self
            .password_hasher
            .verify(password, &user.password_hash)
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                false
            });

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Check that the owner of an existing session may still sign in.
    ///
    /// # Errors
    /// * `InvalidToken` - Owner no longer exists
    /// * `InactiveUser` - Owner was disabled after the session started
    /// * `Repository` - Lookup failed
    pub async fn verify_owner(&self, user_id: &UserId) -> Result<ApiUser, AuthError> {
        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        Ok(user)
    }
}
