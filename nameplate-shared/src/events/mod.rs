/// Domain events and the outbox
///
/// Side effects are decoupled from request handling through an explicit
/// outbox instead of a fire-and-forget dispatcher: every event a handler
/// produces is appended to an inspectable log AND broadcast to subscribed
/// listeners (the mailer). Callers — and tests — can therefore observe
/// deterministically which events a request produced, independent of which
/// listeners happen to be registered.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events raised by the web flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A login link was requested for the user; a listener delivers it.
    AuthenticationLinkWasRequested { user_id: Uuid },

    /// A login token was successfully consumed.
    LoggedIn { user_id: Uuid },

    /// The user's profile page was rendered. Raised on every successful
    /// view, self-views included.
    UserProfileWasViewed { user_id: Uuid },
}

/// Records every event and fans it out to listeners.
pub struct Outbox {
    recorded: Mutex<Vec<DomainEvent>>,
    tx: broadcast::Sender<DomainEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            recorded: Mutex::new(Vec::new()),
            tx,
        }
    }

    /// Appends the event to the log and broadcasts it. Lagging or absent
    /// listeners never fail the producing request.
    pub fn record(&self, event: DomainEvent) {
        tracing::debug!(?event, "domain event recorded");
        self.recorded.lock().unwrap().push(event.clone());
        let _ = self.tx.send(event);
    }

    /// Subscribes a listener to events recorded from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Snapshot of every event recorded so far, in order.
    pub fn recorded(&self) -> Vec<DomainEvent> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}
