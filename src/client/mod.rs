//! Remote identity-provider interface and error taxonomy.
//!
//! The provider owns credential verification, OAuth handshakes, and session
//! issuance; this crate only calls into it. Everything the flows need from
//! the provider is behind [`RemoteAuthClient`] so controllers can be driven
//! against a mock in tests.

pub mod http;

pub use http::HttpAuthClient;

use async_trait::async_trait;

/// Third-party sign-in strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthStrategy {
    Google,
    Facebook,
    Apple,
}

impl OAuthStrategy {
    /// Wire name of the strategy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "oauth_google",
            Self::Facebook => "oauth_facebook",
            Self::Apple => "oauth_apple",
        }
    }
}

/// Verification channel requested during sign-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationStrategy {
    EmailCode,
}

impl VerificationStrategy {
    /// Wire name of the strategy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailCode => "email_code",
        }
    }
}

/// Provider-reported progress of a sign-in/sign-up/verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptStatus {
    Complete,
    MissingRequirements,
    NeedsVerification,
    /// Any status the client does not recognize. Flows treat this the same
    /// as `MissingRequirements` where they branch on it.
    OtherIncomplete,
}

impl AttemptStatus {
    /// Decode a wire status string. Unrecognized values map to
    /// [`AttemptStatus::OtherIncomplete`] rather than failing the attempt.
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        match status {
            "complete" => Self::Complete,
            "missing_requirements" => Self::MissingRequirements,
            "needs_verification" => Self::NeedsVerification,
            _ => Self::OtherIncomplete,
        }
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Result of beginning a sign-in attempt.
#[derive(Clone, Debug)]
pub struct SignInAttempt {
    pub status: AttemptStatus,
    /// Session created by the provider when the attempt is complete.
    pub session_id: Option<String>,
}

/// Result of beginning a sign-up attempt.
#[derive(Clone, Debug)]
pub struct SignUpAttempt {
    pub status: AttemptStatus,
}

/// Result of submitting a verification code.
#[derive(Clone, Debug)]
pub struct VerificationAttempt {
    pub status: AttemptStatus,
}

/// A single provider sub-error, optionally scoped to a request parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderError {
    pub code: String,
    pub message: String,
    /// Provider-specific parameter name (e.g. `identifier`, `email_address`).
    pub param_name: Option<String>,
}

/// Errors surfaced by a [`RemoteAuthClient`].
///
/// Structured rejections keep their sub-errors so the classifier can map
/// them onto form fields; everything else collapses into the unstructured
/// variants and classifies to a root message.
#[derive(Debug, thiserror::Error)]
pub enum AuthApiError {
    #[error("provider rejected the request")]
    Provider(Vec<ProviderError>),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Asynchronous interface to the identity provider.
///
/// All operations suspend the caller and may fail with [`AuthApiError`].
#[async_trait]
pub trait RemoteAuthClient: Send + Sync {
    /// Begin a credential sign-in with an identifier and password.
    async fn begin_sign_in(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<SignInAttempt, AuthApiError>;

    /// Begin a sign-up with an email address and password.
    async fn begin_sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpAttempt, AuthApiError>;

    /// Ask the provider to send a verification challenge (e.g. email code).
    async fn prepare_verification(
        &self,
        strategy: VerificationStrategy,
    ) -> Result<(), AuthApiError>;

    /// Submit a verification code for the pending sign-up.
    async fn attempt_verification(&self, code: &str) -> Result<VerificationAttempt, AuthApiError>;

    /// Activate the session created by a completed sign-in.
    async fn activate_session(&self, session_id: &str) -> Result<(), AuthApiError>;

    /// Refresh the provider-side view of the current identity.
    async fn reload(&self) -> Result<(), AuthApiError>;

    /// Kick off a provider-driven OAuth redirect for the given strategy.
    async fn start_oauth(&self, strategy: OAuthStrategy) -> Result<(), AuthApiError>;
}
