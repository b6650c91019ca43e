use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::api_key::models::ApiKey;
use crate::domain::api_key::models::KeyPrincipal;
use crate::domain::errors::AuthError;
use crate::domain::errors::RepositoryError;

/// Read access to stored API keys.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + 'static {
    /// Retrieve the key with the given digest issued to an owner kind.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_hash(
        &self,
        key_hash: &str,
        owner_type: &str,
    ) -> Result<Option<ApiKey>, RepositoryError>;
}

/// Existence check for one kind of key owner.
#[async_trait]
pub trait KeyOwnerRepository: Send + Sync + 'static {
    /// Tag stored in `ApiKey::owner_type` for this kind of owner.
    fn owner_type(&self) -> &'static str;

    /// # Errors
    /// * `Database` - Database operation failed
    async fn owner_exists(&self, owner_id: &Uuid) -> Result<bool, RepositoryError>;
}

/// Port for API key authorization.
#[async_trait]
pub trait ApiKeyAuthorizerPort: Send + Sync + 'static {
    /// Resolve the owner behind a presented API key.
    ///
    /// # Errors
    /// * `TokenNotFound` - No key presented
    /// * `InvalidToken` - Unknown key, or its owner no longer exists
    /// * `ExpiredToken` - Key is expired
    /// * `Repository` - Lookup failed
    async fn authorize_api_user(
        &self,
        presented_key: Option<&str>,
    ) -> Result<KeyPrincipal, AuthError>;
}
