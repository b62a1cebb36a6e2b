/// User model
///
/// A user is a profile owner and a login principal. There are no passwords:
/// authentication happens exclusively through one-time login tokens (see
/// `models::login_token`). Accounts start deactivated and carry a one-time
/// activation token until the activation link is followed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     moniker TEXT NOT NULL,
///     activation_token TEXT UNIQUE,
///     activated_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed page size of the user directory.
pub const USERS_PER_PAGE: u32 = 50;

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all users
    pub email: String,

    /// Display name shown on the profile page
    pub moniker: String,

    /// One-time activation token; cleared when the account is activated
    pub activation_token: Option<String>,

    /// When the account was activated (None while pending)
    pub activated_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the activation link for this account has been followed.
    pub fn is_activated(&self) -> bool {
        self.activated_at.is_some()
    }
}

/// Input for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address (must be unique)
    pub email: String,

    /// Display name
    pub moniker: String,

    /// Activation token to attach; None for accounts created pre-activated
    pub activation_token: Option<String>,
}

/// One page of the user directory, in persisted order.
#[derive(Debug, Clone)]
pub struct UserPage {
    /// Users on this page (at most `per_page`)
    pub users: Vec<User>,

    /// 1-based page number this page was fetched for
    pub page: u32,

    /// Page size the listing was fetched with
    pub per_page: u32,

    /// Total number of users across all pages
    pub total: i64,
}

impl UserPage {
    /// Number of pages the directory spans (at least 1).
    pub fn total_pages(&self) -> u32 {
        let per_page = i64::from(self.per_page.max(1));
        let pages = (self.total + per_page - 1) / per_page;
        pages.max(1) as u32
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(count: usize, page_no: u32, total: i64) -> UserPage {
        UserPage {
            users: Vec::with_capacity(count),
            page: page_no,
            per_page: USERS_PER_PAGE,
            total,
        }
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(page(0, 1, 0).total_pages(), 1);
        assert_eq!(page(0, 1, 50).total_pages(), 1);
        assert_eq!(page(0, 1, 51).total_pages(), 2);
        assert_eq!(page(0, 1, 149).total_pages(), 3);
    }

    #[test]
    fn test_page_navigation_flags() {
        let first = page(50, 1, 120);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = page(20, 3, 120);
        assert!(last.has_prev());
        assert!(!last.has_next());
    }
}
