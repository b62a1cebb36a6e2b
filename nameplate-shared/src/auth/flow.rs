/// Login flow
///
/// The two state transitions of magic-link authentication, written against
/// the storage trait so the web layer and the tests drive the same code:
///
/// - [`request_link`]: email in, fresh one-time token out
///   (`anonymous` → `link_requested`)
/// - [`consume_token`]: token in, authenticated user out
///   (`link_requested` → `authenticated`)
///
/// Raising domain events and touching the session are the caller's job;
/// these functions only decide and mutate storage.

use chrono::{Duration, Utc};
use thiserror::Error;
use validator::ValidateEmail;

use crate::auth::token;
use crate::models::{LoginToken, User};
use crate::store::{AuthStore, StoreError};

#[derive(Debug, Error)]
pub enum LoginError {
    /// The submitted value is empty or not shaped like an email address.
    #[error("not a valid email address")]
    InvalidEmail,

    /// Well-formed email, but no account carries it.
    #[error("no account matches that email address")]
    UnknownEmail,

    /// The presented token is stale or unknown. The two cases are
    /// deliberately indistinguishable so responses never reveal whether a
    /// token value exists.
    #[error("login token was rejected")]
    TokenRejected,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Converts an email address into a delivered one-time credential.
///
/// On success the user's previous token (if any) has been replaced, so the
/// freshly issued value is the only one that can log this user in.
pub async fn request_link(
    store: &dyn AuthStore,
    email: &str,
) -> Result<(User, LoginToken), LoginError> {
    let email = email.trim();
    if email.is_empty() || !email.validate_email() {
        return Err(LoginError::InvalidEmail);
    }

    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or(LoginError::UnknownEmail)?;

    let value = token::generate();
    let issued = store.replace_login_token(user.id, &value).await?;

    Ok((user, issued))
}

/// Converts a presented credential into an authenticated user.
///
/// Consumption is atomic in the store: the token row is deleted in the same
/// step that checks its age against `ttl`, so a token can never
/// authenticate two requests. The clock is the server's, never the
/// client's.
pub async fn consume_token(
    store: &dyn AuthStore,
    value: &str,
    ttl: Duration,
) -> Result<User, LoginError> {
    let cutoff = Utc::now() - ttl;

    let user_id = store
        .consume_login_token(value, cutoff)
        .await?
        .ok_or(LoginError::TokenRejected)?;

    // The owning row can only be missing if the user was deleted between
    // the consume and this lookup; treat it like any other rejected token.
    store
        .find_user_by_id(user_id)
        .await?
        .ok_or(LoginError::TokenRejected)
}
