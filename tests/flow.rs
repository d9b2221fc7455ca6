//! End-to-end controller scenarios against a recording mock client.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use ensaluti::auth::{
    AuthFlowController, FlowKind, FlowState, NavigationIntent, OAuthInitiator, SubmissionResult,
};
use ensaluti::client::{
    AttemptStatus, AuthApiError, OAuthStrategy, ProviderError, RemoteAuthClient, SignInAttempt,
    SignUpAttempt, VerificationAttempt, VerificationStrategy,
};

type RespFn<T> = Box<dyn Fn() -> Result<T, AuthApiError> + Send + Sync>;

#[derive(Default)]
struct Calls {
    begin_sign_in: AtomicUsize,
    begin_sign_up: AtomicUsize,
    prepare_verification: AtomicUsize,
    attempt_verification: AtomicUsize,
    activate_session: AtomicUsize,
    reload: AtomicUsize,
    start_oauth: AtomicUsize,
}

struct MockAuthClient {
    calls: Calls,
    /// When set, `begin_sign_in` waits here before responding.
    gate: Option<Arc<Notify>>,
    sign_in: RespFn<SignInAttempt>,
    sign_up: RespFn<SignUpAttempt>,
    verification: RespFn<VerificationAttempt>,
}

impl MockAuthClient {
    fn new() -> Self {
        Self {
            calls: Calls::default(),
            gate: None,
            sign_in: Box::new(|| {
                Ok(SignInAttempt {
                    status: AttemptStatus::Complete,
                    session_id: Some("sess_123".to_string()),
                })
            }),
            sign_up: Box::new(|| {
                Ok(SignUpAttempt {
                    status: AttemptStatus::Complete,
                })
            }),
            verification: Box::new(|| {
                Ok(VerificationAttempt {
                    status: AttemptStatus::Complete,
                })
            }),
        }
    }

    fn with_sign_in(mut self, response: RespFn<SignInAttempt>) -> Self {
        self.sign_in = response;
        self
    }

    fn with_sign_up(mut self, response: RespFn<SignUpAttempt>) -> Self {
        self.sign_up = response;
        self
    }

    fn with_verification(mut self, response: RespFn<VerificationAttempt>) -> Self {
        self.verification = response;
        self
    }

    fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl RemoteAuthClient for MockAuthClient {
    async fn begin_sign_in(
        &self,
        _identifier: &str,
        _password: &str,
    ) -> Result<SignInAttempt, AuthApiError> {
        self.calls.begin_sign_in.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        (self.sign_in)()
    }

    async fn begin_sign_up(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<SignUpAttempt, AuthApiError> {
        self.calls.begin_sign_up.fetch_add(1, Ordering::SeqCst);
        (self.sign_up)()
    }

    async fn prepare_verification(
        &self,
        _strategy: VerificationStrategy,
    ) -> Result<(), AuthApiError> {
        self.calls.prepare_verification.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn attempt_verification(&self, _code: &str) -> Result<VerificationAttempt, AuthApiError> {
        self.calls.attempt_verification.fetch_add(1, Ordering::SeqCst);
        (self.verification)()
    }

    async fn activate_session(&self, _session_id: &str) -> Result<(), AuthApiError> {
        self.calls.activate_session.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reload(&self) -> Result<(), AuthApiError> {
        self.calls.reload.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn start_oauth(&self, _strategy: OAuthStrategy) -> Result<(), AuthApiError> {
        self.calls.start_oauth.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn valid_credentials() -> BTreeMap<String, String> {
    raw(&[("email", "user@test.com"), ("password", "password123")])
}

fn controller_with(client: MockAuthClient) -> (AuthFlowController, Arc<MockAuthClient>) {
    let client = Arc::new(client);
    (AuthFlowController::new(client.clone()), client)
}

#[tokio::test]
async fn short_password_reports_field_error_without_remote_call() -> Result<()> {
    let (controller, client) = controller_with(MockAuthClient::new());
    let input = raw(&[("email", "user@test.com"), ("password", "short")]);

    let result = controller
        .submit(FlowKind::SignIn, &input)
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    match result {
        SubmissionResult::FieldErrors(errors) => {
            assert_eq!(
                errors.get("password").map(String::as_str),
                Some("Password should be at least 8 characters long")
            );
        }
        other => return Err(anyhow!("expected field errors, got {other:?}")),
    }
    assert_eq!(client.calls.begin_sign_in.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_input_short_circuits_every_flow() -> Result<()> {
    let (controller, client) = controller_with(MockAuthClient::new());
    let empty = raw(&[]);

    for flow in [FlowKind::SignIn, FlowKind::SignUp, FlowKind::Verify] {
        let result = controller
            .submit(flow, &empty)
            .await
            .ok_or_else(|| anyhow!("expected a result"))?;
        assert!(matches!(result, SubmissionResult::FieldErrors(_)));
    }

    assert_eq!(client.calls.begin_sign_in.load(Ordering::SeqCst), 0);
    assert_eq!(client.calls.begin_sign_up.load(Ordering::SeqCst), 0);
    assert_eq!(client.calls.attempt_verification.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn sign_in_complete_activates_session_and_navigates_home() -> Result<()> {
    let (controller, client) = controller_with(MockAuthClient::new());

    let result = controller
        .submit(FlowKind::SignIn, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    assert_eq!(
        result,
        SubmissionResult::Success(NavigationIntent::ReplaceWith("/"))
    );
    assert_eq!(client.calls.begin_sign_in.load(Ordering::SeqCst), 1);
    assert_eq!(client.calls.activate_session.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), FlowState::Idle);
    Ok(())
}

#[tokio::test]
async fn sign_in_incomplete_status_reports_root_error() -> Result<()> {
    let mock = MockAuthClient::new().with_sign_in(Box::new(|| {
        Ok(SignInAttempt {
            status: AttemptStatus::NeedsVerification,
            session_id: None,
        })
    }));
    let (controller, client) = controller_with(mock);

    let result = controller
        .submit(FlowKind::SignIn, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    assert_eq!(
        result,
        SubmissionResult::RootError("Sign in could not be completed".to_string())
    );
    assert_eq!(client.calls.activate_session.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn sign_up_missing_requirements_prepares_verification() -> Result<()> {
    let mock = MockAuthClient::new().with_sign_up(Box::new(|| {
        Ok(SignUpAttempt {
            status: AttemptStatus::MissingRequirements,
        })
    }));
    let (controller, client) = controller_with(mock);

    let result = controller
        .submit(FlowKind::SignUp, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    assert_eq!(
        result,
        SubmissionResult::Success(NavigationIntent::PushTo("/verify"))
    );
    assert_eq!(client.calls.prepare_verification.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn sign_up_unrecognized_status_takes_verification_path() -> Result<()> {
    let mock = MockAuthClient::new().with_sign_up(Box::new(|| {
        Ok(SignUpAttempt {
            status: AttemptStatus::OtherIncomplete,
        })
    }));
    let (controller, client) = controller_with(mock);

    let result = controller
        .submit(FlowKind::SignUp, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    assert_eq!(
        result,
        SubmissionResult::Success(NavigationIntent::PushTo("/verify"))
    );
    assert_eq!(client.calls.prepare_verification.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn sign_up_complete_navigates_home_without_verification() -> Result<()> {
    let (controller, client) = controller_with(MockAuthClient::new());

    let result = controller
        .submit(FlowKind::SignUp, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    assert_eq!(
        result,
        SubmissionResult::Success(NavigationIntent::ReplaceWith("/"))
    );
    assert_eq!(client.calls.prepare_verification.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn structured_identifier_error_maps_to_email_field() -> Result<()> {
    let mock = MockAuthClient::new().with_sign_in(Box::new(|| {
        Err(AuthApiError::Provider(vec![ProviderError {
            code: "form_identifier_not_found".to_string(),
            message: "Couldn't find your account.".to_string(),
            param_name: Some("identifier".to_string()),
        }]))
    }));
    let (controller, _client) = controller_with(mock);

    let result = controller
        .submit(FlowKind::SignIn, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    match result {
        SubmissionResult::FieldErrors(errors) => {
            assert_eq!(
                errors.get("email").map(String::as_str),
                Some("Couldn't find your account.")
            );
        }
        other => return Err(anyhow!("expected field errors, got {other:?}")),
    }
    Ok(())
}

#[tokio::test]
async fn short_code_never_reaches_verification_endpoint() -> Result<()> {
    let (controller, client) = controller_with(MockAuthClient::new());

    let result = controller
        .submit(FlowKind::Verify, &raw(&[("code", "123")]))
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    match result {
        SubmissionResult::FieldErrors(errors) => {
            assert_eq!(
                errors.get("code").map(String::as_str),
                Some("Code should be 6 digits")
            );
        }
        other => return Err(anyhow!("expected field errors, got {other:?}")),
    }
    assert_eq!(client.calls.attempt_verification.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn verify_complete_reloads_then_navigates_home() -> Result<()> {
    let (controller, client) = controller_with(MockAuthClient::new());

    let result = controller
        .submit(FlowKind::Verify, &raw(&[("code", "123456")]))
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    assert_eq!(
        result,
        SubmissionResult::Success(NavigationIntent::ReplaceWith("/"))
    );
    assert_eq!(client.calls.reload.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn verify_incomplete_status_reports_root_error() -> Result<()> {
    let mock = MockAuthClient::new().with_verification(Box::new(|| {
        Ok(VerificationAttempt {
            status: AttemptStatus::OtherIncomplete,
        })
    }));
    let (controller, client) = controller_with(mock);

    let result = controller
        .submit(FlowKind::Verify, &raw(&[("code", "123456")]))
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    assert_eq!(
        result,
        SubmissionResult::RootError("Verification failed".to_string())
    );
    assert_eq!(client.calls.reload.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn network_error_uses_per_flow_fallback_message() -> Result<()> {
    let mock = MockAuthClient::new()
        .with_sign_up(Box::new(|| Err(AuthApiError::Network("timeout".to_string()))));
    let (controller, _client) = controller_with(mock);

    let result = controller
        .submit(FlowKind::SignUp, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;

    assert_eq!(
        result,
        SubmissionResult::RootError("An unexpected error occurred".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn submit_while_in_flight_is_a_no_op() -> Result<()> {
    let gate = Arc::new(Notify::new());
    let mock = MockAuthClient::new().with_gate(gate.clone());
    let (controller, client) = controller_with(mock);
    let controller = Arc::new(controller);

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit(FlowKind::SignIn, &valid_credentials()).await })
    };

    // Wait until the first submission is parked inside the remote call.
    while client.calls.begin_sign_in.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(controller.state(), FlowState::Submitting);

    let second = controller.submit(FlowKind::SignIn, &valid_credentials()).await;
    assert!(second.is_none());
    assert_eq!(client.calls.begin_sign_in.load(Ordering::SeqCst), 1);
    assert_eq!(controller.state(), FlowState::Submitting);

    gate.notify_one();
    let first = first.await?.ok_or_else(|| anyhow!("expected a result"))?;
    assert!(matches!(first, SubmissionResult::Success(_)));
    assert_eq!(controller.state(), FlowState::Idle);
    Ok(())
}

#[tokio::test]
async fn sequential_identical_submissions_both_run() -> Result<()> {
    let (controller, client) = controller_with(MockAuthClient::new());

    for _ in 0..2 {
        let result = controller
            .submit(FlowKind::SignIn, &valid_credentials())
            .await
            .ok_or_else(|| anyhow!("expected a result"))?;
        assert_eq!(
            result,
            SubmissionResult::Success(NavigationIntent::ReplaceWith("/"))
        );
    }
    assert_eq!(client.calls.begin_sign_in.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn retry_after_root_error_is_permitted() -> Result<()> {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let mock = MockAuthClient::new().with_sign_in(Box::new(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(AuthApiError::Network("connection reset".to_string()))
        } else {
            Ok(SignInAttempt {
                status: AttemptStatus::Complete,
                session_id: Some("sess_retry".to_string()),
            })
        }
    }));
    let (controller, _client) = controller_with(mock);

    let first = controller
        .submit(FlowKind::SignIn, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;
    assert_eq!(first, SubmissionResult::RootError("Unknown error".to_string()));

    let second = controller
        .submit(FlowKind::SignIn, &valid_credentials())
        .await
        .ok_or_else(|| anyhow!("expected a result"))?;
    assert!(matches!(second, SubmissionResult::Success(_)));
    Ok(())
}

#[tokio::test]
async fn oauth_initiator_fires_one_remote_call() -> Result<()> {
    let client = Arc::new(MockAuthClient::new());
    let initiator = OAuthInitiator::new(client.clone());

    initiator.start(OAuthStrategy::Google).await;
    assert_eq!(client.calls.start_oauth.load(Ordering::SeqCst), 1);
    Ok(())
}
