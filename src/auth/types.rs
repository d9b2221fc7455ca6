//! Core types shared across the authentication flows.

use std::collections::BTreeMap;

/// Synthetic field name for errors not attributable to a specific input.
pub const ROOT_FIELD: &str = "root";

/// Routes the flows navigate between.
pub mod routes {
    pub const HOME: &str = "/";
    pub const SIGN_IN: &str = "/sign-in";
    pub const SIGN_UP: &str = "/sign-up";
    pub const VERIFY: &str = "/verify";
}

/// The three authentication flows. Each picks a field schema and the remote
/// operations that apply to a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowKind {
    SignIn,
    SignUp,
    Verify,
}

/// Navigation requested from the host app's router after a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationIntent {
    /// Replace the current screen in place.
    ReplaceWith(&'static str),
    /// Push a new screen onto the stack.
    PushTo(&'static str),
    None,
}

/// Field name → user-facing message, in deterministic field order.
pub type FieldErrors = BTreeMap<String, String>;

/// Outcome of one submission attempt, consumed directly by the UI layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionResult {
    Success(NavigationIntent),
    /// Field-scoped messages; may include the synthetic [`ROOT_FIELD`].
    FieldErrors(FieldErrors),
    /// A single failure with no field to land on.
    RootError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_intent_equality() {
        assert_eq!(
            NavigationIntent::ReplaceWith(routes::HOME),
            NavigationIntent::ReplaceWith("/")
        );
        assert_ne!(
            NavigationIntent::PushTo(routes::VERIFY),
            NavigationIntent::ReplaceWith(routes::VERIFY)
        );
    }

    #[test]
    fn field_errors_iterate_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.insert("password".to_string(), "too short".to_string());
        errors.insert("email".to_string(), "invalid".to_string());
        let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }
}
