/// User directory and profile pages

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use nameplate_shared::{events::DomainEvent, models::USERS_PER_PAGE};

use crate::{app::AppState, error::{AppError, AppResult}, session::Session, views};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// `GET /users` — the directory, 50 per page in persisted order.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Html<String>> {
    let page = state
        .store
        .list_users(query.page.max(1), USERS_PER_PAGE)
        .await?;

    Ok(views::users_index(&page))
}

/// `GET /users/:id` — one profile.
///
/// Owner-only affordances show up iff the viewer is the profile's owner.
/// Every successful view — self-views included — is recorded as a
/// `UserProfileWasViewed` event.
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    // A malformed id is just a page that doesn't exist.
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;

    let user = state
        .store
        .find_user_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_owner = session.user_id() == Some(user.id);

    state
        .outbox
        .record(DomainEvent::UserProfileWasViewed { user_id: user.id });

    Ok(views::profile(&user, is_owner))
}
