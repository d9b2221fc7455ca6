//! Authentication flows: field validation, the submission state machine,
//! error-to-field classification, route gating, and session observability.

pub mod classify;
pub mod controller;
pub mod guard;
pub mod oauth;
pub mod schema;
pub mod session;
pub mod types;

pub use controller::{AuthFlowController, FlowState};
pub use guard::{AuthScreen, GuardDecision, RouteGuard, Zone};
pub use oauth::OAuthInitiator;
pub use session::{SessionHandle, SessionState, SessionWriter};
pub use types::{FlowKind, NavigationIntent, SubmissionResult};
