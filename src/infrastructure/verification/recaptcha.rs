//! Google reCAPTCHA v3 verification.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use ureq::Agent;

use crate::domain::verification::BotVerifier;
use crate::error::AppError;

pub const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

const HTTP_TIMEOUT_SECS: u64 = 5;

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

/// Body returned by the `siteverify` endpoint. Only the fields we check are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteVerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

/// reCAPTCHA v3 verifier.
///
/// A token is accepted only if Google reports `success` and the token was issued
/// for the configured public domain. The score is logged but not enforced.
pub struct RecaptchaVerifier {
    secret_key: String,
    domain: String,
    endpoint: String,
}

impl RecaptchaVerifier {
    pub fn new(secret_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            domain: domain.into(),
            endpoint: RECAPTCHA_VERIFY_URL.to_string(),
        }
    }

    /// Overrides the verification endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Applies the acceptance rule to a decoded response.
    pub fn evaluate(&self, response: &SiteVerifyResponse) -> Result<(), AppError> {
        if !response.success {
            return Err(AppError::verification_failed(
                "Bot verification failed",
                json!({ "error_codes": response.error_codes }),
            ));
        }

        if response.hostname != self.domain {
            return Err(AppError::verification_failed(
                "Bot verification failed",
                json!({ "reason": "hostname mismatch" }),
            ));
        }

        Ok(())
    }

    fn call_sync(
        endpoint: String,
        secret: String,
        token: String,
    ) -> Result<SiteVerifyResponse, String> {
        let response = agent()
            .post(&endpoint)
            .send_form([("secret", secret.as_str()), ("response", token.as_str())])
            .map_err(|e| e.to_string())?;

        response
            .into_body()
            .read_json::<SiteVerifyResponse>()
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl BotVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<(), AppError> {
        if token.is_empty() {
            return Err(AppError::verification_failed(
                "Verification token is required",
                json!({ "field": "token" }),
            ));
        }

        let endpoint = self.endpoint.clone();
        let secret = self.secret_key.clone();
        let token = token.to_string();

        let outcome = tokio::task::spawn_blocking(move || Self::call_sync(endpoint, secret, token))
            .await
            .map_err(|e| e.to_string())
            .and_then(|result| result);

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "reCAPTCHA request failed");
                return Err(AppError::verification_failed(
                    "Bot verification unavailable",
                    json!({}),
                ));
            }
        };

        debug!(
            success = response.success,
            hostname = %response.hostname,
            score = ?response.score,
            "reCAPTCHA response"
        );

        self.evaluate(&response)
    }

    fn is_enabled(&self) -> bool {
        true
    }
}
