/// Sessions and flash state
///
/// Authentication state is never ambient: the session middleware resolves
/// the request's session up front and injects an explicit [`Session`]
/// handle into the request extensions, which handlers receive through the
/// `Extension` extractor. The handle addresses one record in the in-process
/// [`SessionStore`] by an unguessable cookie id.
///
/// Flash values are read-once: a handler sets a marker before redirecting,
/// the next render takes it, and it is gone. That carries form errors and
/// outcome notices (`link.sent`, `token.expired`, …) across redirects
/// without URL state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use nameplate_shared::auth::token;

use crate::app::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "nameplate_session";

#[derive(Debug, Default, Clone)]
struct SessionData {
    user_id: Option<Uuid>,
    flash: HashMap<String, String>,
}

/// In-process session storage, shared across requests.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionData>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh empty session and returns its id.
    pub fn create(&self) -> String {
        let id = token::generate();
        self.inner
            .lock()
            .unwrap()
            .insert(id.clone(), SessionData::default());
        id
    }

    /// Returns a handle to an existing session.
    pub fn find(&self, id: &str) -> Option<Session> {
        let known = self.inner.lock().unwrap().contains_key(id);
        known.then(|| Session {
            id: id.to_string(),
            store: self.clone(),
        })
    }
}

/// Handle to one request's session.
#[derive(Clone)]
pub struct Session {
    id: String,
    store: SessionStore,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The authenticated user bound to this session, if any.
    pub fn user_id(&self) -> Option<Uuid> {
        let sessions = self.store.inner.lock().unwrap();
        sessions.get(&self.id).and_then(|data| data.user_id)
    }

    /// Binds the session to a user.
    pub fn log_in(&self, user_id: Uuid) {
        let mut sessions = self.store.inner.lock().unwrap();
        if let Some(data) = sessions.get_mut(&self.id) {
            data.user_id = Some(user_id);
        }
    }

    /// Drops the user binding and any pending flash state.
    pub fn log_out(&self) {
        let mut sessions = self.store.inner.lock().unwrap();
        if let Some(data) = sessions.get_mut(&self.id) {
            *data = SessionData::default();
        }
    }

    /// Sets a flash value for the next render.
    pub fn flash(&self, key: &str, value: impl Into<String>) {
        let mut sessions = self.store.inner.lock().unwrap();
        if let Some(data) = sessions.get_mut(&self.id) {
            data.flash.insert(key.to_string(), value.into());
        }
    }

    /// Takes a flash value, consuming it.
    pub fn take_flash(&self, key: &str) -> Option<String> {
        let mut sessions = self.store.inner.lock().unwrap();
        sessions.get_mut(&self.id).and_then(|data| data.flash.remove(key))
    }

    /// Whether a flash value is pending, without consuming it.
    pub fn has_flash(&self, key: &str) -> bool {
        let sessions = self.store.inner.lock().unwrap();
        sessions
            .get(&self.id)
            .map(|data| data.flash.contains_key(key))
            .unwrap_or(false)
    }
}

/// Session middleware
///
/// Resolves the session named by the request cookie (creating one when the
/// cookie is absent or stale), injects the [`Session`] handle into the
/// request extensions, and sets the cookie on responses that created a
/// session.
pub async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(cookie_value);

    let (session, is_new) = match presented.and_then(|id| state.sessions.find(&id)) {
        Some(session) => (session, false),
        None => {
            let id = state.sessions.create();
            // Just created, so the handle always resolves.
            let session = state.sessions.find(&id).unwrap();
            (session, true)
        }
    };

    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        session.id()
    );

    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;

    if is_new {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

fn cookie_value(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}
