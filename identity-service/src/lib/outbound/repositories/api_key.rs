use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::api_key::models::ApiKey;
use crate::domain::api_key::models::ApiKeyId;
use crate::domain::api_key::ports::ApiKeyRepository;
use crate::domain::errors::RepositoryError;

pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ApiKeyRow {
    id: Uuid,
    owner_id: Uuid,
    owner_type: String,
    key_hash: String,
    expired_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<ApiKeyRow> for ApiKey {
    fn from(row: ApiKeyRow) -> Self {
        ApiKey {
            id: ApiKeyId(row.id),
            owner_id: row.owner_id,
            owner_type: row.owner_type,
            key_hash: row.key_hash,
            expired_at: row.expired_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn find_by_hash(
        &self,
        key_hash: &str,
        owner_type: &str,
    ) -> Result<Option<ApiKey>, RepositoryError> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT id, owner_id, owner_type, key_hash, expired_at, created_at
            FROM api_keys
            WHERE key_hash = $1 AND owner_type = $2
            "#,
        )
        .bind(key_hash)
        .bind(owner_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.map(ApiKey::from))
    }
}
