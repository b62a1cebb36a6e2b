/// Error handling for the web server
///
/// Recoverable flow failures (a bad email, a stale token, a duplicate
/// registration) never pass through here — handlers convert those into a
/// redirect plus flash state so the user can retry. [`AppError`] covers
/// what is left: pages that genuinely do not exist and failures the user
/// cannot do anything about. Internal details are logged and never reach
/// the response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nameplate_shared::store::StoreError;
use std::fmt;

use crate::views;

/// Handler result type alias.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The requested resource does not exist (404)
    NotFound,

    /// Something failed on our side (500)
    Internal(anyhow::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound => write!(f, "not found"),
            AppError::Internal(err) => write!(f, "internal error: {err}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, views::not_found()).into_response(),
            AppError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, views::internal_error()).into_response()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AppError::NotFound.to_string(), "not found");

        let err = AppError::Internal(anyhow::anyhow!("pool exhausted"));
        assert_eq!(err.to_string(), "internal error: pool exhausted");
    }
}
