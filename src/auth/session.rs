//! Process-wide session state as a single-writer observable.
//!
//! The identity-provider integration owns the [`SessionWriter`]; everything
//! else ([`crate::auth::RouteGuard`], controllers, screens) reads through
//! cloned [`SessionHandle`]s and re-evaluates on change instead of polling.

use tokio::sync::watch;
use tracing::debug;

/// Where the provider currently stands on the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Before the provider integration has started resolving.
    #[default]
    Unknown,
    /// The provider is resolving the stored session.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Single writer for the session state. Only the identity-provider
/// integration (and the OAuth completion path) should hold one.
pub struct SessionWriter {
    tx: watch::Sender<SessionState>,
}

/// Read-only, cloneable view of the session state.
#[derive(Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

/// Create the observable, starting at [`SessionState::Unknown`].
#[must_use]
pub fn session_channel() -> (SessionWriter, SessionHandle) {
    let (tx, rx) = watch::channel(SessionState::default());
    (SessionWriter { tx }, SessionHandle { rx })
}

impl SessionWriter {
    /// Publish a new state, notifying all subscribers.
    pub fn set(&self, state: SessionState) {
        let previous = *self.tx.borrow();
        if previous != state {
            debug!("session state: {previous:?} -> {state:?}");
        }
        self.tx.send_replace(state);
    }

    /// Subscribe another reader.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }
}

impl SessionHandle {
    /// Snapshot of the current state.
    #[must_use]
    pub fn get(&self) -> SessionState {
        *self.rx.borrow()
    }

    /// Wait for the next state change. Returns `None` once the writer is
    /// dropped and no further change can arrive.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
