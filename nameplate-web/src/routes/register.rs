/// Registration and account activation
///
/// Registration creates a deactivated account carrying a one-time
/// activation token; following the activation link flips the account on
/// and burns the token in one step.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use validator::Validate;

use nameplate_shared::{
    auth::token,
    models::CreateUser,
    store::StoreError,
};

use crate::{
    app::AppState,
    error::AppResult,
    session::Session,
    views::{self, RegisterPage},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    /// Email address
    #[validate(email(message = "Enter a valid email address"))]
    #[serde(default)]
    pub email: String,

    /// Display name
    #[validate(length(
        min = 2,
        max = 60,
        message = "A moniker is 2 to 60 characters"
    ))]
    #[serde(default)]
    pub moniker: String,
}

/// `GET /register`
pub async fn show_register_form(Extension(session): Extension<Session>) -> Response {
    if session.user_id().is_some() {
        return Redirect::to("/").into_response();
    }

    let page = RegisterPage {
        email_error: session.take_flash("errors.email"),
        moniker_error: session.take_flash("errors.moniker"),
    };

    views::register_form(&page).into_response()
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if session.user_id().is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if let Err(errors) = form.validate() {
        for (field, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string());
                session.flash(&format!("errors.{field}"), message);
            }
        }
        return Ok(Redirect::to("/register").into_response());
    }

    let input = CreateUser {
        email: form.email.trim().to_string(),
        moniker: form.moniker.trim().to_string(),
        activation_token: Some(token::generate()),
    };

    match state.store.create_user(input).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "account created, activation pending");
            session.flash("account.created", "1");
            Ok(Redirect::to("/login").into_response())
        }
        Err(StoreError::Conflict) => {
            session.flash("errors.email", "That email address is already registered.");
            Ok(Redirect::to("/register").into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// `GET /account/activate/:token`
///
/// One-time: the first visit activates, every later visit (same token or a
/// made-up one) lands on the same "no longer valid" notice.
pub async fn activate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(activation_token): Path<String>,
) -> AppResult<Response> {
    match state.store.activate_user(&activation_token).await? {
        Some(user) => {
            tracing::info!(user_id = %user.id, "account activated");
            session.flash("account.activated", "1");
        }
        None => {
            session.flash("activation.invalid", "1");
        }
    }

    Ok(Redirect::to("/login").into_response())
}
