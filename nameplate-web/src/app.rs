/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                          # home
/// ├── GET  /login                     # login form (authenticated → /)
/// ├── POST /login                     # request a login link
/// ├── GET  /login/:token              # consume a login link
/// ├── GET  /register                  # registration form
/// ├── POST /register                  # create an account
/// ├── GET  /account/activate/:token   # activate an account
/// ├── GET  /logout                    # drop the session
/// ├── GET  /profile                   # dashboard placeholder
/// ├── GET  /users                     # directory, 50 per page
/// └── GET  /users/:id                 # profile page
/// ```
///
/// Every route sits behind the session middleware, which resolves the
/// request's session and passes it to handlers through request extensions.

use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use nameplate_shared::{events::Outbox, store::AuthStore};

use crate::{config::Config, error::AppError, routes, session::SessionStore};

/// Shared application state, cloned per request handler.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn AuthStore>,

    /// Session storage
    pub sessions: SessionStore,

    /// Domain event outbox
    pub outbox: Arc<Outbox>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn AuthStore>, config: Config) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            outbox: Arc::new(Outbox::new()),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home::home))
        .route(
            "/login",
            get(routes::login::show_login_form).post(routes::login::request_link),
        )
        .route("/login/:token", get(routes::login::consume_token))
        .route(
            "/register",
            get(routes::register::show_register_form).post(routes::register::register),
        )
        .route("/account/activate/:token", get(routes::register::activate))
        .route("/logout", get(routes::login::logout))
        .route("/profile", get(routes::home::dashboard))
        .route("/users", get(routes::users::index))
        .route("/users/:id", get(routes::users::show))
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::session::session_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn fallback() -> AppError {
    AppError::NotFound
}
