/// Common test utilities for integration tests
///
/// Tests drive the full router (session middleware included) through
/// tower's `Service` interface against the in-memory store, so every flow
/// runs exactly the code the server runs, minus the socket and the
/// database server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use tower::Service as _;

use nameplate_shared::db::DatabaseConfig;
use nameplate_shared::models::{CreateUser, User};
use nameplate_shared::store::{AuthStore, MemoryStore};
use nameplate_web::app::{build_router, AppState};
use nameplate_web::config::{AuthConfig, Config, ServerConfig};
use nameplate_web::session::{Session, SESSION_COOKIE};

/// Test context wiring the router to an in-memory store.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub app: axum::Router,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                token_ttl_seconds: 300,
                app_url: "http://localhost:8080".to_string(),
            },
        };

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone() as Arc<dyn AuthStore>, config);
        let app = build_router(state.clone());

        Self { store, state, app }
    }

    pub async fn get(&self, uri: &str, session_id: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(id) = session_id {
            builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={id}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        form: &str,
        session_id: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(id) = session_id {
            builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={id}"));
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        let mut app = self.app.clone();
        app.call(request).await.unwrap()
    }

    /// Starts a session the way a browser would: one request, one cookie.
    pub async fn begin_session(&self) -> String {
        let response = self.get("/", None).await;
        set_session_cookie(&response).expect("first response sets the session cookie")
    }

    /// Handle to a session the context has already seen.
    pub fn session(&self, id: &str) -> Session {
        self.state.sessions.find(id).expect("known session id")
    }

    pub async fn create_user(&self, email: &str, moniker: &str) -> User {
        self.store
            .create_user(CreateUser {
                email: email.to_string(),
                moniker: moniker.to_string(),
                activation_token: None,
            })
            .await
            .unwrap()
    }

    /// Issues a login token for the user and returns its value.
    pub async fn issue_token(&self, user: &User) -> String {
        let (_, token) = nameplate_shared::auth::request_link(&*self.store, &user.email)
            .await
            .unwrap();
        token.token
    }
}

/// Extracts the session id from a response's Set-Cookie header.
pub fn set_session_cookie(response: &Response) -> Option<String> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let (name, value) = raw.split(';').next()?.split_once('=')?;
    (name == SESSION_COOKIE).then(|| value.to_string())
}

/// The Location header of a redirect response.
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)?
        .to_str()
        .ok()
        .map(|value| value.to_string())
}

/// Reads the full response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}
