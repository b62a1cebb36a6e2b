/// Login-link delivery listener
///
/// Subscribes to the outbox and reacts to
/// `AuthenticationLinkWasRequested`: it loads the user's current token and
/// emits the login URL as a structured log line. The log line IS the
/// delivery boundary here — handing the URL to an actual mail transport is
/// an external concern.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use uuid::Uuid;

use nameplate_shared::{events::DomainEvent, store::AuthStore};

use crate::{app::AppState, config::Config};

/// Spawns the listener. It runs until the outbox is dropped.
pub fn spawn(state: &AppState) -> JoinHandle<()> {
    let mut events = state.outbox.subscribe();
    let store = Arc::clone(&state.store);
    let config = Arc::clone(&state.config);

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(DomainEvent::AuthenticationLinkWasRequested { user_id }) => {
                    if let Err(error) =
                        deliver_login_link(store.as_ref(), &config, user_id).await
                    {
                        tracing::error!(%user_id, "could not deliver login link: {error:#}");
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "mailer fell behind the outbox");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn deliver_login_link(
    store: &dyn AuthStore,
    config: &Config,
    user_id: Uuid,
) -> anyhow::Result<()> {
    let user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {user_id} no longer exists"))?;

    let token = store
        .login_token_for_user(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no login token on file for {user_id}"))?;

    let url = config.login_url(&token.token);
    tracing::info!(email = %user.email, %url, "delivering login link");

    Ok(())
}
