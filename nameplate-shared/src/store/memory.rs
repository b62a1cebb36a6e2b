/// In-memory storage backend
///
/// Mirrors the PostgreSQL backend's semantics behind one mutex: every
/// operation takes the lock once, so check-and-mutate sequences (token
/// consumption, activation) are atomic exactly like their single-statement
/// SQL counterparts. Used by the integration tests and for running the
/// server without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AuthStore, StoreError};
use crate::models::{CreateUser, LoginToken, User, UserPage};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    tokens: Vec<LoginToken>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites the issue timestamp of a user's current login token.
    ///
    /// Lets callers age a token into staleness deterministically instead of
    /// waiting out the TTL on a real clock.
    pub fn set_login_token_created_at(&self, user_id: Uuid, created_at: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(token) = inner.tokens.iter_mut().find(|t| t.user_id == user_id) {
            token.created_at = created_at;
        }
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict);
        }
        if let Some(ref token) = data.activation_token {
            if inner
                .users
                .iter()
                .any(|u| u.activation_token.as_deref() == Some(token))
            {
                return Err(StoreError::Conflict);
            }
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            moniker: data.moniker,
            activation_token: data.activation_token,
            activated_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, page: u32, per_page: u32) -> Result<UserPage, StoreError> {
        let inner = self.inner.lock().unwrap();
        let page = page.max(1);

        // Stable sort: rows created in the same instant keep insertion order.
        let mut users = inner.users.clone();
        users.sort_by_key(|u| u.created_at);

        let total = users.len() as i64;
        let start = ((page - 1) as usize).saturating_mul(per_page as usize);
        let users = users
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Ok(UserPage {
            users,
            page,
            per_page,
            total,
        })
    }

    async fn activate_user(&self, activation_token: &str) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let user = inner.users.iter_mut().find(|u| {
            u.activation_token.as_deref() == Some(activation_token) && u.activated_at.is_none()
        });

        Ok(user.map(|u| {
            let now = Utc::now();
            u.activated_at = Some(now);
            u.activation_token = None;
            u.updated_at = now;
            u.clone()
        }))
    }

    async fn replace_login_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<LoginToken, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.tokens.iter().any(|t| t.token == token) {
            return Err(StoreError::Conflict);
        }

        inner.tokens.retain(|t| t.user_id != user_id);

        let row = LoginToken {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            created_at: Utc::now(),
        };
        inner.tokens.push(row.clone());

        Ok(row)
    }

    async fn login_token_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LoginToken>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tokens.iter().find(|t| t.user_id == user_id).cloned())
    }

    async fn login_token_exists(&self, token: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tokens.iter().any(|t| t.token == token))
    }

    async fn consume_login_token(
        &self,
        token: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        // Match and remove under one lock; a stale row stays put.
        let position = inner
            .tokens
            .iter()
            .position(|t| t.token == token && t.created_at >= issued_after);

        Ok(position.map(|i| inner.tokens.remove(i).user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user_input(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            moniker: format!("{email} moniker"),
            activation_token: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user(user_input("a@example.com")).await.unwrap();

        let err = store.create_user(user_input("a@example.com")).await;
        assert!(matches!(err, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_replace_login_token_keeps_one_per_user() {
        let store = MemoryStore::new();
        let user = store.create_user(user_input("a@example.com")).await.unwrap();

        store.replace_login_token(user.id, "first").await.unwrap();
        store.replace_login_token(user.id, "second").await.unwrap();

        assert!(!store.login_token_exists("first").await.unwrap());
        let current = store.login_token_for_user(user.id).await.unwrap().unwrap();
        assert_eq!(current.token, "second");
    }

    #[tokio::test]
    async fn test_consume_deletes_the_row_once() {
        let store = MemoryStore::new();
        let user = store.create_user(user_input("a@example.com")).await.unwrap();
        store.replace_login_token(user.id, "tok").await.unwrap();

        let cutoff = Utc::now() - Duration::minutes(5);
        let first = store.consume_login_token("tok", cutoff).await.unwrap();
        assert_eq!(first, Some(user.id));

        let second = store.consume_login_token("tok", cutoff).await.unwrap();
        assert_eq!(second, None);
        assert!(!store.login_token_exists("tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_stale_token_is_rejected_but_kept() {
        let store = MemoryStore::new();
        let user = store.create_user(user_input("a@example.com")).await.unwrap();
        store.replace_login_token(user.id, "tok").await.unwrap();
        store.set_login_token_created_at(user.id, Utc::now() - Duration::minutes(6));

        let cutoff = Utc::now() - Duration::minutes(5);
        let consumed = store.consume_login_token("tok", cutoff).await.unwrap();

        assert_eq!(consumed, None);
        assert!(store.login_token_exists("tok").await.unwrap());
    }

    #[tokio::test]
    async fn test_activation_is_one_time() {
        let store = MemoryStore::new();
        let user = store
            .create_user(CreateUser {
                email: "a@example.com".to_string(),
                moniker: "a".to_string(),
                activation_token: Some("act".to_string()),
            })
            .await
            .unwrap();

        let activated = store.activate_user("act").await.unwrap().unwrap();
        assert_eq!(activated.id, user.id);
        assert!(activated.is_activated());
        assert!(activated.activation_token.is_none());

        assert!(store.activate_user("act").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_pages_in_persisted_order() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store
                .create_user(user_input(&format!("u{i}@example.com")))
                .await
                .unwrap();
        }

        let page = store.list_users(1, 2).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.users.len(), 2);
        assert_eq!(page.users[0].email, "u0@example.com");

        let page2 = store.list_users(2, 2).await.unwrap();
        assert_eq!(page2.users.len(), 1);
        assert_eq!(page2.users[0].email, "u2@example.com");

        let past_the_end = store.list_users(9, 2).await.unwrap();
        assert!(past_the_end.users.is_empty());
    }
}
