use std::sync::Arc;

use async_trait::async_trait;
use auth::KeyHasher;

use crate::domain::api_key::models::KeyPrincipal;
use crate::domain::api_key::ports::ApiKeyAuthorizerPort;
use crate::domain::api_key::ports::ApiKeyRepository;
use crate::domain::api_key::ports::KeyOwnerRepository;
use crate::domain::clock::Clock;
use crate::domain::errors::AuthError;

/// Authorizes API keys issued to one kind of owner.
pub struct ApiKeyAuthorizer<K, O>
where
    K: ApiKeyRepository,
    O: KeyOwnerRepository,
{
    keys: Arc<K>,
    owners: Arc<O>,
    key_hasher: KeyHasher,
    clock: Arc<dyn Clock>,
}

impl<K, O> ApiKeyAuthorizer<K, O>
where
    K: ApiKeyRepository,
    O: KeyOwnerRepository,
{
    pub fn new(keys: Arc<K>, owners: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            owners,
            key_hasher: KeyHasher::new(),
            clock,
        }
    }
}

#[async_trait]
impl<K, O> ApiKeyAuthorizerPort for ApiKeyAuthorizer<K, O>
where
    K: ApiKeyRepository,
    O: KeyOwnerRepository,
{
    async fn authorize_api_user(
        &self,
        presented_key: Option<&str>,
    ) -> Result<KeyPrincipal, AuthError> {
        let presented_key = presented_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AuthError::TokenNotFound)?;

        let owner_type = self.owners.owner_type();
        let key = self
            .keys
            .find_by_hash(&self.key_hasher.hash(presented_key), owner_type)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if key.is_expired_at(self.clock.now()) {
            return Err(AuthError::ExpiredToken);
        }

        if !self.owners.owner_exists(&key.owner_id).await? {
            tracing::warn!(owner_id = %key.owner_id, owner_type, "API key owner is gone");
            return Err(AuthError::InvalidToken);
        }

        Ok(KeyPrincipal {
            owner_id: key.owner_id,
            owner_type: owner_type.to_string(),
        })
    }
}
