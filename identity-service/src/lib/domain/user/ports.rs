use async_trait::async_trait;

use crate::domain::errors::RepositoryError;
use crate::domain::user::models::ApiUser;
use crate::domain::user::models::UserId;

/// Read access to login-capable users.
#[async_trait]
pub trait ApiUserRepository: Send + Sync + 'static {
    /// Retrieve user by its unique login.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_login(&self, login: &str) -> Result<Option<ApiUser>, RepositoryError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<ApiUser>, RepositoryError>;
}
