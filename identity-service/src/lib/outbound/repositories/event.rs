use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::errors::RepositoryError;
use crate::domain::event::models::AuthEvent;
use crate::domain::event::models::AuthEventType;
use crate::domain::event::ports::AuthEventRepository;

pub struct PostgresAuthEventRepository {
    pool: PgPool,
}

impl PostgresAuthEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthEventRepository for PostgresAuthEventRepository {
    async fn append(&self, event: &AuthEvent) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO auth_events (
                id, event_type, action_name, user_agent, ip_address,
                owner_user_id, owner_type, payload, has_error, error_trace, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(event.id.0)
        .bind(event.event_type.as_str())
        .bind(&event.action_name)
        .bind(&event.user_agent)
        .bind(&event.ip_address)
        .bind(event.owner_user_id.map(|id| id.0))
        .bind(&event.owner_type)
        .bind(&event.payload)
        .bind(event.has_error)
        .bind(&event.error_trace)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn count_since(
        &self,
        event_type: AuthEventType,
        payload: &str,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM auth_events
            WHERE event_type = $1
              AND payload = $2
              AND ip_address = $3
              AND created_at > $4
            "#,
        )
        .bind(event_type.as_str())
        .bind(payload)
        .bind(ip_address)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        u64::try_from(count).map_err(|e| RepositoryError::InvalidRecord(e.to_string()))
    }
}
