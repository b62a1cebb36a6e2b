/// Home page and the dashboard placeholder

use axum::{extract::State, response::Html, Extension};

use crate::{app::AppState, error::AppResult, session::Session, views};

/// `GET /`
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Html<String>> {
    let current = match session.user_id() {
        Some(id) => state.store.find_user_by_id(id).await?,
        None => None,
    };

    Ok(views::home(current.as_ref()))
}

/// `GET /profile`
pub async fn dashboard() -> Html<String> {
    views::dashboard()
}
