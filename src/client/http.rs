//! HTTPS implementation of [`RemoteAuthClient`] against the provider's
//! client API.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, Instrument, info_span};

use super::{
    AttemptStatus, AuthApiError, OAuthStrategy, ProviderError, RemoteAuthClient, SignInAttempt,
    SignUpAttempt, VerificationAttempt, VerificationStrategy,
};
use crate::APP_USER_AGENT;

/// Attempt payload returned by sign-in, sign-up, and verification endpoints.
#[derive(Debug, Deserialize)]
struct AttemptResponse {
    status: String,
    created_session_id: Option<String>,
}

/// Error body shape: `{"errors": [{code, message, long_message, meta: {param_name}}]}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    errors: Vec<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    code: Option<String>,
    message: Option<String>,
    long_message: Option<String>,
    meta: Option<WireErrorMeta>,
}

#[derive(Debug, Deserialize)]
struct WireErrorMeta {
    param_name: Option<String>,
}

impl WireError {
    fn into_provider_error(self) -> ProviderError {
        let message = self
            .long_message
            .or(self.message)
            .unwrap_or_else(|| "Request failed".to_string());
        ProviderError {
            code: self.code.unwrap_or_default(),
            message,
            param_name: self.meta.and_then(|meta| meta.param_name),
        }
    }
}

/// Identity-provider client over HTTPS.
///
/// Holds a single `reqwest::Client`; safe to share behind an `Arc`.
pub struct HttpAuthClient {
    client: Client,
    base_url: url::Url,
}

impl HttpAuthClient {
    /// Build a client for the given provider base URL.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be parsed or the underlying HTTP
    /// client fails to build.
    pub fn new(base_url: &str) -> Result<Self, AuthApiError> {
        let base_url = url::Url::parse(base_url)
            .map_err(|err| AuthApiError::Unexpected(format!("invalid base URL: {err}")))?;
        if base_url.host().is_none() {
            return Err(AuthApiError::Unexpected(
                "invalid base URL: no host specified".to_string(),
            ));
        }
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| AuthApiError::Network(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, AuthApiError> {
        self.base_url
            .join(path)
            .map_err(|err| AuthApiError::Unexpected(format!("invalid endpoint {path}: {err}")))
    }

    /// POST a JSON payload and decode the attempt response.
    async fn post_attempt(
        &self,
        span_name: &'static str,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<AttemptResponse, AuthApiError> {
        let url = self.endpoint(path)?;
        let span = info_span!("auth.request", operation = span_name, url = %url);
        let response = self
            .client
            .post(url.clone())
            .json(&payload)
            .send()
            .instrument(span)
            .await
            .map_err(|err| AuthApiError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(decode_error(&url, response).await);
        }

        response
            .json::<AttemptResponse>()
            .await
            .map_err(|err| AuthApiError::Unexpected(format!("{url}: {err}")))
    }

    /// POST a JSON payload where only the status code matters.
    async fn post_unit(
        &self,
        span_name: &'static str,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<(), AuthApiError> {
        let url = self.endpoint(path)?;
        let span = info_span!("auth.request", operation = span_name, url = %url);
        let response = self
            .client
            .post(url.clone())
            .json(&payload)
            .send()
            .instrument(span)
            .await
            .map_err(|err| AuthApiError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(decode_error(&url, response).await);
        }
        Ok(())
    }
}

/// Turn a non-success response into an [`AuthApiError`].
///
/// Structured provider bodies become [`AuthApiError::Provider`]; anything
/// else is reported as unexpected with the status attached.
async fn decode_error(url: &url::Url, response: reqwest::Response) -> AuthApiError {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => {
            let errors = body
                .errors
                .into_iter()
                .map(WireError::into_provider_error)
                .collect::<Vec<_>>();
            debug!("provider rejected request to {url}: {status}, {} sub-errors", errors.len());
            AuthApiError::Provider(errors)
        }
        Err(_) => AuthApiError::Unexpected(format!("{url} - {status}")),
    }
}

#[async_trait::async_trait]
impl RemoteAuthClient for HttpAuthClient {
    async fn begin_sign_in(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<SignInAttempt, AuthApiError> {
        let payload = json!({
            "identifier": identifier,
            "password": password,
        });
        let response = self
            .post_attempt("sign_in.create", "v1/client/sign_ins", payload)
            .await?;
        Ok(SignInAttempt {
            status: AttemptStatus::from_wire(&response.status),
            session_id: response.created_session_id,
        })
    }

    async fn begin_sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpAttempt, AuthApiError> {
        let payload = json!({
            "email_address": email,
            "password": password,
        });
        let response = self
            .post_attempt("sign_up.create", "v1/client/sign_ups", payload)
            .await?;
        Ok(SignUpAttempt {
            status: AttemptStatus::from_wire(&response.status),
        })
    }

    async fn prepare_verification(
        &self,
        strategy: VerificationStrategy,
    ) -> Result<(), AuthApiError> {
        let payload = json!({ "strategy": strategy.as_str() });
        self.post_unit(
            "sign_up.prepare_verification",
            "v1/client/sign_ups/prepare_verification",
            payload,
        )
        .await
    }

    async fn attempt_verification(&self, code: &str) -> Result<VerificationAttempt, AuthApiError> {
        let payload = json!({ "code": code });
        let response = self
            .post_attempt(
                "sign_up.attempt_verification",
                "v1/client/sign_ups/attempt_verification",
                payload,
            )
            .await?;
        Ok(VerificationAttempt {
            status: AttemptStatus::from_wire(&response.status),
        })
    }

    async fn activate_session(&self, session_id: &str) -> Result<(), AuthApiError> {
        let path = format!("v1/client/sessions/{session_id}/touch");
        self.post_unit("session.activate", &path, json!({})).await
    }

    async fn reload(&self) -> Result<(), AuthApiError> {
        let url = self.endpoint("v1/client")?;
        let span = info_span!("auth.request", operation = "client.reload", url = %url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .instrument(span)
            .await
            .map_err(|err| AuthApiError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(decode_error(&url, response).await);
        }
        Ok(())
    }

    async fn start_oauth(&self, strategy: OAuthStrategy) -> Result<(), AuthApiError> {
        let payload = json!({ "strategy": strategy.as_str() });
        self.post_unit("oauth.start", "v1/client/oauth", payload)
            .await
    }
}
