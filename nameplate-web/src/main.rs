//! # Nameplate Web Server
//!
//! Profile pages with passwordless (magic-link) authentication, served by
//! Axum over PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p nameplate-web
//! ```

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nameplate_shared::{
    db::{create_pool, run_migrations},
    store::{AuthStore, PgStore},
};
use nameplate_web::{
    app::{build_router, AppState},
    config::Config,
    mailer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nameplate_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Nameplate v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let store: Arc<dyn AuthStore> = Arc::new(PgStore::new(pool));
    let state = AppState::new(store, config);

    mailer::spawn(&state);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
