use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::IdentityConfig;

/// Errors from the identity-provider admin API.
///
/// The provider's own message is passed through verbatim so the dispatcher
/// can surface it to the caller on create/update failures.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0}")]
    Rejected(String),

    #[error("Identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Administrative interface of the host authentication service.
///
/// One attempt per call, no retry or backoff; failures surface immediately.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an unconfirmed account and return its opaque id
    async fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    /// Overwrite the account's password
    async fn set_password(&self, account_id: &str, password: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, Deserialize)]
struct CreatedAccount {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AdminApiError {
    #[serde(alias = "msg", alias = "message", alias = "error_description")]
    error: Option<String>,
}

/// Reqwest client for the auth service's `/admin/users` endpoints, keyed by
/// a service-level credential distinct from end-user credentials.
pub struct AdminApiClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl AdminApiClient {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    /// Extract the provider's error message from a non-2xx response body,
    /// falling back to the HTTP status line.
    async fn rejection(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let message = response
            .json::<AdminApiError>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("identity provider returned {}", status));
        IdentityError::Rejected(message)
    }
}

#[async_trait]
impl IdentityProvider for AdminApiClient {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let response = self
            .http
            .post(format!("{}/admin/users", self.base_url))
            .bearer_auth(&self.service_key)
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": false,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let account = response.json::<CreatedAccount>().await?;
        Ok(account.id)
    }

    async fn set_password(&self, account_id: &str, password: &str) -> Result<(), IdentityError> {
        let response = self
            .http
            .put(format!("{}/admin/users/{}", self.base_url, account_id))
            .bearer_auth(&self.service_key)
            .json(&json!({ "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(())
    }
}
