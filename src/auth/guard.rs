//! Route-level access gating.
//!
//! Evaluated before rendering any screen. The redirect policy for
//! authenticated users in the public auth zone is deliberately asymmetric:
//! sign-in redirects home, while sign-up and verify stay reachable so a
//! signed-in user can create additional accounts.

use super::session::{SessionHandle, SessionState};
use super::types::routes;

/// Screens in the public auth zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScreen {
    SignIn,
    SignUp,
    Verify,
}

/// Where the requested screen lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    /// Screens that require an authenticated session.
    Protected,
    /// Sign-in, sign-up, and verify screens.
    PublicAuth(AuthScreen),
}

/// What the host app should do with the requested screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// Session state is still resolving; show an indeterminate placeholder.
    Placeholder,
    Redirect(&'static str),
}

/// Per-screen policy table: does an authenticated session push the user away
/// from this public-auth screen?
const fn redirects_when_authenticated(screen: AuthScreen) -> bool {
    match screen {
        AuthScreen::SignIn => true,
        AuthScreen::SignUp | AuthScreen::Verify => false,
    }
}

/// Decide whether a screen in the given zone is reachable under the given
/// session state. Pure; the stateful wrapper is [`RouteGuard`].
#[must_use]
pub fn evaluate(session: SessionState, zone: Zone) -> GuardDecision {
    match session {
        SessionState::Unknown | SessionState::Loading => GuardDecision::Placeholder,
        SessionState::Unauthenticated => match zone {
            Zone::Protected => GuardDecision::Redirect(routes::SIGN_IN),
            Zone::PublicAuth(_) => GuardDecision::Render,
        },
        SessionState::Authenticated => match zone {
            Zone::Protected => GuardDecision::Render,
            Zone::PublicAuth(screen) if redirects_when_authenticated(screen) => {
                GuardDecision::Redirect(routes::HOME)
            }
            Zone::PublicAuth(_) => GuardDecision::Render,
        },
    }
}

/// Guard bound to the live session observable.
pub struct RouteGuard {
    session: SessionHandle,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Evaluate against the current session snapshot.
    #[must_use]
    pub fn check(&self, zone: Zone) -> GuardDecision {
        evaluate(self.session.get(), zone)
    }
}
