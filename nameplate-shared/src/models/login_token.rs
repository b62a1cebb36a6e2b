/// One-time login token
///
/// The credential behind a magic link. A token is created when a user
/// requests a login link, deleted the moment it is successfully used, and
/// rejected (but left in place) once its age exceeds the configured
/// threshold. At most one live token exists per user: issuing a new link
/// replaces any previous row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE login_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token TEXT NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoginToken {
    /// Unique row ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Opaque, unguessable token value (unique)
    pub token: String,

    /// When the token was issued; age beyond the TTL makes it stale
    pub created_at: DateTime<Utc>,
}

impl LoginToken {
    /// Whether the token is past its time-to-live as of `now`.
    ///
    /// The comparison always uses a server-side clock; callers must never
    /// feed in client-supplied time.
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at > ttl
    }
}
