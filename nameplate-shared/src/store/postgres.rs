/// PostgreSQL storage backend
///
/// Queries use the runtime `query_as` API over the shared pool. Token
/// consumption and account activation are single statements with a
/// `RETURNING` clause, so the check and the mutation cannot be split by a
/// concurrent request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{AuthStore, StoreError};
use crate::models::{CreateUser, LoginToken, User, UserPage};

const USER_COLUMNS: &str =
    "id, email, moniker, activation_token, activated_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl AuthStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, moniker, activation_token)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.email)
        .bind(data.moniker)
        .bind(data.activation_token)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self, page: u32, per_page: u32) -> Result<UserPage, StoreError> {
        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY created_at, id
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(UserPage {
            users,
            page,
            per_page,
            total,
        })
    }

    async fn activate_user(&self, activation_token: &str) -> Result<Option<User>, StoreError> {
        // Single statement: a second visit with the same token matches
        // nothing because the first visit cleared it.
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET activated_at = NOW(), activation_token = NULL, updated_at = NOW()
            WHERE activation_token = $1 AND activated_at IS NULL
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(activation_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn replace_login_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<LoginToken, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Database)?;

        sqlx::query("DELETE FROM login_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, LoginToken>(
            r#"
            INSERT INTO login_tokens (user_id, token)
            VALUES ($1, $2)
            RETURNING id, user_id, token, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        tx.commit().await.map_err(StoreError::Database)?;

        Ok(row)
    }

    async fn login_token_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LoginToken>, StoreError> {
        let row = sqlx::query_as::<_, LoginToken>(
            "SELECT id, user_id, token, created_at FROM login_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn login_token_exists(&self, token: &str) -> Result<bool, StoreError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM login_tokens WHERE token = $1)")
                .bind(token)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn consume_login_token(
        &self,
        token: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        // Check-and-delete in one statement: of two racing requests exactly
        // one sees the row. Stale rows fail the predicate and are left
        // behind, indistinguishable from unknown values.
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            DELETE FROM login_tokens
            WHERE token = $1 AND created_at >= $2
            RETURNING user_id
            "#,
        )
        .bind(token)
        .bind(issued_after)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id,)| user_id))
    }
}
