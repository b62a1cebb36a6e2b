/// Storage interface
///
/// All persistence goes through the [`AuthStore`] trait so the login flow
/// and the web handlers never touch storage mechanics directly. Two
/// implementations exist:
///
/// - [`postgres::PgStore`]: the production backend (sqlx / PostgreSQL)
/// - [`memory::MemoryStore`]: a mutex-guarded in-process backend with the
///   same semantics, used by the integration tests and for local runs
///   without a database
///
/// The one operation with correctness weight is
/// [`AuthStore::consume_login_token`]: it must check freshness and delete
/// the row as a single atomic step, so two racing requests can never both
/// log in with the same token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CreateUser, LoginToken, User, UserPage};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (duplicate email or token).
    #[error("record already exists")]
    Conflict,

    /// The underlying database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Typed storage operations for users, login tokens, and activation.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Creates a user. Fails with [`StoreError::Conflict`] when the email
    /// (or activation token) is already taken.
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Returns one directory page in persisted order. `page` is 1-based; a
    /// page past the end is an empty page, not an error.
    async fn list_users(&self, page: u32, per_page: u32) -> Result<UserPage, StoreError>;

    /// Activates the account carrying `activation_token`, clearing the
    /// token in the same step. Returns `None` when the token is unknown or
    /// already used.
    async fn activate_user(&self, activation_token: &str) -> Result<Option<User>, StoreError>;

    /// Issues `token` for `user_id`, replacing any previous login token so
    /// at most one live token exists per user.
    async fn replace_login_token(&self, user_id: Uuid, token: &str)
        -> Result<LoginToken, StoreError>;

    /// Returns the user's current login token, if any.
    async fn login_token_for_user(&self, user_id: Uuid)
        -> Result<Option<LoginToken>, StoreError>;

    /// Whether a login token row with this exact value exists.
    async fn login_token_exists(&self, token: &str) -> Result<bool, StoreError>;

    /// Atomically consumes the token: deletes the row and returns its owner
    /// iff the value matches and the row was created at or after
    /// `issued_after`. Stale and unknown tokens are indistinguishable to
    /// callers; stale rows stay in place.
    async fn consume_login_token(
        &self,
        token: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError>;
}
