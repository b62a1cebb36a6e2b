/// Magic-link login endpoints
///
/// The flow has two halves: `POST /login` turns an email address into a
/// delivered one-time link, and `GET /login/:token` turns the link back
/// into an authenticated session. Failures never surface as errors — the
/// user is redirected back to the form with flash state explaining what
/// happened.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;

use nameplate_shared::{
    auth::{consume_token as consume, request_link as request, LoginError},
    events::DomainEvent,
};

use crate::{
    app::AppState,
    error::{AppError, AppResult},
    session::Session,
    views::{self, LoginPage},
};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
}

/// `GET /login`
///
/// An already-authenticated visitor has no business here and is sent home
/// instead of being allowed to restart the flow.
pub async fn show_login_form(
    Extension(session): Extension<Session>,
) -> Response {
    if session.user_id().is_some() {
        return Redirect::to("/").into_response();
    }

    let page = LoginPage {
        link_sent: session.take_flash("link.sent").is_some(),
        token_expired: session.take_flash("token.expired").is_some(),
        account_created: session.take_flash("account.created").is_some(),
        account_activated: session.take_flash("account.activated").is_some(),
        activation_invalid: session.take_flash("activation.invalid").is_some(),
        email_error: session.take_flash("errors.email"),
    };

    views::login_form(&page).into_response()
}

/// `POST /login` — RequestLink
///
/// On success a token has been issued, the delivery listener has been
/// notified through the outbox, and the visitor lands back on the form
/// with a `link.sent` notice. Bad input lands back on the form with a
/// field error; either way the form is re-renderable, not an error page.
pub async fn request_link(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if session.user_id().is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    match request(state.store.as_ref(), &form.email).await {
        Ok((user, _token)) => {
            state
                .outbox
                .record(DomainEvent::AuthenticationLinkWasRequested { user_id: user.id });
            session.flash("link.sent", "1");
            Ok(Redirect::to("/login").into_response())
        }
        Err(LoginError::InvalidEmail | LoginError::UnknownEmail) => {
            session.flash(
                "errors.email",
                "Enter the email address you registered with.",
            );
            Ok(Redirect::to("/login").into_response())
        }
        Err(err) => Err(AppError::Internal(err.into())),
    }
}

/// `GET /login/:token` — ConsumeToken
///
/// A fresh token logs the visitor in and is gone for good in the same
/// step. A stale or unknown token sends them back to the form with a
/// `token.expired` notice — the two cases are indistinguishable on
/// purpose.
pub async fn consume_token(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(token): Path<String>,
) -> AppResult<Response> {
    if session.user_id().is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    match consume(state.store.as_ref(), &token, state.config.token_ttl()).await {
        Ok(user) => {
            session.log_in(user.id);
            state.outbox.record(DomainEvent::LoggedIn { user_id: user.id });
            tracing::info!(user_id = %user.id, "user logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(LoginError::TokenRejected) => {
            session.flash("token.expired", "1");
            Ok(Redirect::to("/login").into_response())
        }
        Err(err) => Err(AppError::Internal(err.into())),
    }
}

/// `GET /logout`
pub async fn logout(Extension(session): Extension<Session>) -> Redirect {
    session.log_out();
    Redirect::to("/")
}
