use async_trait::async_trait;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::api_key::ports::KeyOwnerRepository;
use crate::domain::errors::RepositoryError;
use crate::domain::user::models::ApiUser;
use crate::domain::user::models::UserId;
use crate::domain::user::models::API_USER_TYPE;
use crate::domain::user::ports::ApiUserRepository;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ApiUserRow {
    id: Uuid,
    login: String,
    password_hash: String,
    is_active: bool,
}

impl From<ApiUserRow> for ApiUser {
    fn from(row: ApiUserRow) -> Self {
        ApiUser {
            id: UserId(row.id),
            login: row.login,
            password_hash: row.password_hash,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl ApiUserRepository for PostgresUserRepository {
    async fn find_by_login(&self, login: &str) -> Result<Option<ApiUser>, RepositoryError> {
        let row = sqlx::query_as::<_, ApiUserRow>(
            r#"
            SELECT id, login, password_hash, is_active
            FROM api_users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.map(ApiUser::from))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<ApiUser>, RepositoryError> {
        let row = sqlx::query_as::<_, ApiUserRow>(
            r#"
            SELECT id, login, password_hash, is_active
            FROM api_users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.map(ApiUser::from))
    }
}

#[async_trait]
impl KeyOwnerRepository for PostgresUserRepository {
    fn owner_type(&self) -> &'static str {
        API_USER_TYPE
    }

    async fn owner_exists(&self, owner_id: &Uuid) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM api_users WHERE id = $1)")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }
}
