//! The submission state machine driving all three flows.
//!
//! `Idle → Submitting → {Succeeded, FailedValidation, FailedRemote} → Idle`.
//! At most one submission is in flight per controller instance; a `submit`
//! while one is pending is a no-op. Every path terminates in a
//! [`SubmissionResult`]; no remote error crosses the UI boundary raw.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::client::{AuthApiError, RemoteAuthClient, VerificationStrategy};

use super::classify::classify;
use super::schema::{FieldSchema, TypedValues};
use super::types::{routes, FieldErrors, FlowKind, NavigationIntent, SubmissionResult, ROOT_FIELD};

const SIGN_IN_INCOMPLETE: &str = "Sign in could not be completed";
const VERIFICATION_FAILED: &str = "Verification failed";

/// Observable controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Submitting,
    Succeeded,
    FailedValidation,
    FailedRemote,
}

/// Drives SignIn, SignUp, and Verify submissions against a remote client.
pub struct AuthFlowController {
    client: Arc<dyn RemoteAuthClient>,
    // Held for the whole submission; `try_lock` failing means one is in flight.
    state: Mutex<FlowState>,
}

impl AuthFlowController {
    #[must_use]
    pub fn new(client: Arc<dyn RemoteAuthClient>) -> Self {
        Self {
            client,
            state: Mutex::new(FlowState::Idle),
        }
    }

    /// Current state. While a submission holds the internal lock the state
    /// is by definition `Submitting`.
    #[must_use]
    pub fn state(&self) -> FlowState {
        self.state
            .try_lock()
            .map_or(FlowState::Submitting, |state| *state)
    }

    /// Run one submission: validate, dispatch to the remote client, classify
    /// failures, and emit the outcome.
    ///
    /// Returns `None` when a submission is already in flight (re-entrant
    /// calls are rejected without touching the remote client). Identical
    /// input is never deduplicated by content; only in-flight state gates.
    pub async fn submit(
        &self,
        flow: FlowKind,
        raw: &BTreeMap<String, String>,
    ) -> Option<SubmissionResult> {
        let mut state = match self.state.try_lock() {
            Ok(state) => state,
            Err(_) => {
                debug!(?flow, "submission already in flight, ignoring");
                return None;
            }
        };
        *state = FlowState::Submitting;
        debug!(?flow, "submitting");

        let schema = FieldSchema::for_flow(flow);
        let values = match schema.validate(raw) {
            Ok(values) => values,
            Err(errors) => {
                debug!(?flow, fields = errors.len(), "validation failed");
                settle(&mut state, FlowState::FailedValidation);
                return Some(SubmissionResult::FieldErrors(errors));
            }
        };

        let result = match self.dispatch(flow, &values).await {
            Ok(result) => {
                let terminal = match result {
                    SubmissionResult::Success(_) => FlowState::Succeeded,
                    _ => FlowState::FailedRemote,
                };
                settle(&mut state, terminal);
                result
            }
            Err(err) => {
                error!(?flow, "remote call failed: {err}");
                settle(&mut state, FlowState::FailedRemote);
                field_messages_to_result(classify(flow, &err))
            }
        };

        Some(result)
    }

    /// One remote round trip per submission, branched by flow.
    async fn dispatch(
        &self,
        flow: FlowKind,
        values: &TypedValues,
    ) -> Result<SubmissionResult, AuthApiError> {
        match flow {
            FlowKind::SignIn => self.sign_in(values).await,
            FlowKind::SignUp => self.sign_up(values).await,
            FlowKind::Verify => self.verify(values).await,
        }
    }

    async fn sign_in(&self, values: &TypedValues) -> Result<SubmissionResult, AuthApiError> {
        let attempt = self
            .client
            .begin_sign_in(values.str_value("email"), values.str_value("password"))
            .await?;

        if !attempt.status.is_complete() {
            debug!(status = ?attempt.status, "sign-in did not complete");
            return Ok(SubmissionResult::RootError(SIGN_IN_INCOMPLETE.to_string()));
        }

        match attempt.session_id {
            Some(session_id) => {
                self.client.activate_session(&session_id).await?;
                Ok(SubmissionResult::Success(NavigationIntent::ReplaceWith(
                    routes::HOME,
                )))
            }
            None => {
                error!("sign-in completed without a session id");
                Ok(SubmissionResult::RootError(SIGN_IN_INCOMPLETE.to_string()))
            }
        }
    }

    async fn sign_up(&self, values: &TypedValues) -> Result<SubmissionResult, AuthApiError> {
        let attempt = self
            .client
            .begin_sign_up(values.str_value("email"), values.str_value("password"))
            .await?;

        match attempt.status {
            status if status.is_complete() => Ok(SubmissionResult::Success(
                NavigationIntent::ReplaceWith(routes::HOME),
            )),
            // Deliberate catch-all: missing_requirements and every other
            // non-complete status move the flow to email verification.
            status => {
                debug!(?status, "sign-up incomplete, preparing verification");
                self.client
                    .prepare_verification(VerificationStrategy::EmailCode)
                    .await?;
                Ok(SubmissionResult::Success(NavigationIntent::PushTo(
                    routes::VERIFY,
                )))
            }
        }
    }

    async fn verify(&self, values: &TypedValues) -> Result<SubmissionResult, AuthApiError> {
        let attempt = self
            .client
            .attempt_verification(values.str_value("code"))
            .await?;

        if attempt.status.is_complete() {
            self.client.reload().await?;
            Ok(SubmissionResult::Success(NavigationIntent::ReplaceWith(
                routes::HOME,
            )))
        } else {
            debug!(status = ?attempt.status, "verification did not complete");
            Ok(SubmissionResult::RootError(VERIFICATION_FAILED.to_string()))
        }
    }
}

/// Pass through the terminal state and return to `Idle`. The lock is held
/// for the whole submission, so the terminal state is only observable in the
/// transition log.
fn settle(state: &mut FlowState, terminal: FlowState) {
    debug!(?terminal, "submission settled");
    *state = terminal;
    *state = FlowState::Idle;
}

/// Collapse classified messages into a [`SubmissionResult`].
///
/// Entirely root-scoped classifications surface as a single root error;
/// anything field-scoped becomes a field-error map (which may also carry a
/// root entry alongside). The first message wins per field.
fn field_messages_to_result(messages: Vec<(&'static str, String)>) -> SubmissionResult {
    if messages.iter().all(|(field, _)| *field == ROOT_FIELD) {
        let message = messages
            .into_iter()
            .next()
            .map_or_else(String::new, |(_, message)| message);
        return SubmissionResult::RootError(message);
    }

    let mut errors = FieldErrors::new();
    for (field, message) in messages {
        errors.entry(field.to_string()).or_insert(message);
    }
    SubmissionResult::FieldErrors(errors)
}
