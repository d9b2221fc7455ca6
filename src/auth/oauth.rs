//! One-shot third-party sign-in initiation.

use std::sync::Arc;
use tracing::{debug, error};

use crate::client::{OAuthStrategy, RemoteAuthClient};

/// Kicks off a provider-driven OAuth redirect.
///
/// Fire-and-forget relative to the calling screen: success eventually shows
/// up as a session-state transition observed by the route guard, never as a
/// return value here. Failures have no form field to land on and are only
/// logged.
pub struct OAuthInitiator {
    client: Arc<dyn RemoteAuthClient>,
}

impl OAuthInitiator {
    #[must_use]
    pub fn new(client: Arc<dyn RemoteAuthClient>) -> Self {
        Self { client }
    }

    /// Start the redirect handshake for the given strategy.
    pub async fn start(&self, strategy: OAuthStrategy) {
        debug!(strategy = strategy.as_str(), "starting OAuth sign-in");
        if let Err(err) = self.client.start_oauth(strategy).await {
            error!(strategy = strategy.as_str(), "OAuth sign-in failed: {err}");
        }
    }
}
