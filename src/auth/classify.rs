//! Mapping of remote failures onto form fields.
//!
//! Classification is total over [`AuthApiError`]: structured provider
//! rejections map each sub-error through the flow's parameter table, and
//! everything else falls back to a single root-scoped message.

use crate::client::AuthApiError;

use super::types::{FlowKind, ROOT_FIELD};

/// Provider parameter name → form field, per flow. Unknown parameters (and
/// sub-errors with no parameter at all) land on the synthetic root field.
fn field_for_param(flow: FlowKind, param_name: &str) -> &'static str {
    match (flow, param_name) {
        (FlowKind::SignIn, "identifier") | (FlowKind::SignUp, "email_address") => "email",
        (FlowKind::SignIn | FlowKind::SignUp, "password") => "password",
        (FlowKind::Verify, "code") => "code",
        _ => ROOT_FIELD,
    }
}

/// Root message used when the remote error carries no structure.
fn fallback_message(flow: FlowKind) -> &'static str {
    match flow {
        FlowKind::SignUp => "An unexpected error occurred",
        FlowKind::SignIn | FlowKind::Verify => "Unknown error",
    }
}

/// Classify a remote error into `(field, message)` pairs.
///
/// Always yields at least one entry. Multiple sub-errors are all reported;
/// the UI attaches scoped ones to their field and shows the root-scoped one
/// (if present) below the form.
#[must_use]
pub fn classify(flow: FlowKind, error: &AuthApiError) -> Vec<(&'static str, String)> {
    match error {
        AuthApiError::Provider(errors) if !errors.is_empty() => errors
            .iter()
            .map(|sub| {
                let field = field_for_param(flow, sub.param_name.as_deref().unwrap_or(""));
                (field, sub.message.clone())
            })
            .collect(),
        _ => vec![(ROOT_FIELD, fallback_message(flow).to_string())],
    }
}
