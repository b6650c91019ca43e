use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::RepositoryError;
use crate::domain::session::models::select_evictions;
use crate::domain::session::models::SessionId;
use crate::domain::session::models::SessionToken;
use crate::domain::session::ports::SessionRepository;
use crate::domain::user::models::UserId;

pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    owner_user_id: Uuid,
    token_hash: String,
    user_agent: String,
    created_at: DateTime<Utc>,
    expired_at: Option<DateTime<Utc>>,
}

impl From<SessionRow> for SessionToken {
    fn from(row: SessionRow) -> Self {
        SessionToken {
            id: SessionId(row.id),
            owner_user_id: UserId(row.owner_user_id),
            token_hash: row.token_hash,
            user_agent: row.user_agent,
            created_at: row.created_at,
            expired_at: row.expired_at,
        }
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn insert_capped(
        &self,
        session: &SessionToken,
        cap: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionId>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        // Serializes capped inserts per owner until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(session.owner_user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        let live: Vec<SessionToken> = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, owner_user_id, token_hash, user_agent, created_at, expired_at
            FROM session_tokens
            WHERE owner_user_id = $1
              AND (expired_at IS NULL OR expired_at > $2)
            "#,
        )
        .bind(session.owner_user_id.0)
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(database_error)?
        .into_iter()
        .map(SessionToken::from)
        .collect();

        let evicted = select_evictions(&live, cap);
        if !evicted.is_empty() {
            let ids: Vec<Uuid> = evicted.iter().map(|id| id.0).collect();
            sqlx::query("UPDATE session_tokens SET expired_at = $1 WHERE id = ANY($2)")
                .bind(now)
                .bind(&ids)
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
        }

        sqlx::query(
            r#"
            INSERT INTO session_tokens (id, owner_user_id, token_hash, user_agent, created_at, expired_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id.0)
        .bind(session.owner_user_id.0)
        .bind(&session.token_hash)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.expired_at)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(evicted)
    }

    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionToken>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, owner_user_id, token_hash, user_agent, created_at, expired_at
            FROM session_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(SessionToken::from))
    }

    async fn find_active_by_owner(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionToken>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, owner_user_id, token_hash, user_agent, created_at, expired_at
            FROM session_tokens
            WHERE owner_user_id = $1
              AND (expired_at IS NULL OR expired_at > $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner.0)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(SessionToken::from).collect())
    }

    async fn expire(&self, id: &SessionId, now: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE session_tokens
            SET expired_at = $2
            WHERE id = $1
              AND (expired_at IS NULL OR expired_at > $2)
            "#,
        )
        .bind(id.0)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn expire_all_for_owner(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE session_tokens
            SET expired_at = $2
            WHERE owner_user_id = $1
              AND (expired_at IS NULL OR expired_at > $2)
            "#,
        )
        .bind(owner.0)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
