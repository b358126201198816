//! HTTP client for the backend's registration endpoint.
//!
//!   POST {base_url}/api/auth/register
//!   body:  { name, email, password, passwordConfirmation }
//!   reply: { "message": "success" | "user already exists" | ... }

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::{register_schema, RegisterForm, RegisterOutcome};
use crate::validation::{Schema, ValidationErrors};

const REGISTER_PATH: &str = "/api/auth/register";

// ─── Config ───────────────────────────────────────────────────────────────────

fn default_base_url() -> String { "http://localhost:3000".to_owned() }
fn default_timeout()  -> u64    { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url:        String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url:        default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("form is invalid: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(StatusCode),
}

// ─── Client ───────────────────────────────────────────────────────────────────

pub struct RegisterClient {
    http:     Client,
    endpoint: String,
    schema:   Schema,
}

impl RegisterClient {
    pub fn new(config: &ApiConfig) -> Result<Self, RegisterError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("daygrid/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, config))
    }

    pub fn with_http(http: Client, config: &ApiConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}{REGISTER_PATH}", config.base_url.trim_end_matches('/')),
            schema:   register_schema(),
        }
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }

    /// Validates `form`, then submits it. Invalid forms never reach the
    /// network.
    pub async fn register(&self, form: &RegisterForm) -> Result<RegisterOutcome, RegisterError> {
        self.schema.validate(form)?;

        tracing::info!(endpoint = %self.endpoint, email = %form.email, "submitting registration");
        let resp   = self.http.post(&self.endpoint).json(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, "registration rejected");
            return Err(RegisterError::Status(status));
        }

        let body: Value = resp.json().await?;
        let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
        let outcome = RegisterOutcome::from_message(message);
        tracing::info!(?outcome, "registration finished");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::testing::{serve_once, valid_form};
    use crate::register::RegisterForm;

    fn client_for(base_url: &str) -> RegisterClient {
        let http = Client::builder().no_proxy().build().unwrap();
        RegisterClient::with_http(http, &ApiConfig { base_url: base_url.to_owned(), timeout_seconds: 5 })
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let c = client_for("http://api.local/");
        assert_eq!(c.endpoint(), "http://api.local/api/auth/register");
    }

    #[test]
    fn config_defaults() {
        let cfg = ApiConfig::default();
        assert_eq!(cfg.base_url, "http://localhost:3000");
        assert_eq!(cfg.timeout_seconds, 30);
    }

    #[tokio::test]
    async fn success_reply_means_created() {
        let (url, server) = serve_once("200 OK", r#"{"message":"success"}"#).await;
        let outcome = client_for(&url).register(&valid_form()).await.unwrap();
        assert_eq!(outcome, RegisterOutcome::Created);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/auth/register HTTP/1.1"));
        let body  = request.split("\r\n\r\n").nth(1).unwrap();
        let json: Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["passwordConfirmation"], "hunter22");
    }

    #[tokio::test]
    async fn existing_user_reply() {
        let (url, _server) = serve_once("200 OK", r#"{"message":"user already exists"}"#).await;
        let outcome = client_for(&url).register(&valid_form()).await.unwrap();
        assert_eq!(outcome, RegisterOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn reply_without_message_is_other() {
        let (url, _server) = serve_once("200 OK", r#"{"ok":true}"#).await;
        let outcome = client_for(&url).register(&valid_form()).await.unwrap();
        assert_eq!(outcome, RegisterOutcome::Other(String::new()));
    }

    #[tokio::test]
    async fn server_error_status_is_an_error() {
        let (url, _server) = serve_once("500 Internal Server Error", r#"{"message":"boom"}"#).await;
        let err = client_for(&url).register(&valid_form()).await.unwrap_err();
        assert!(matches!(err, RegisterError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_before_sending() {
        // Nothing listens here; reaching the network would surface as Http.
        let err = client_for("http://127.0.0.1:9").register(&RegisterForm::default()).await.unwrap_err();
        match err {
            RegisterError::Invalid(errs) => assert_eq!(errs.first("name"), Some("name too short - should be 2 chars minimum")),
            other => panic!("expected validation error, got {other}"),
        }
    }
}
