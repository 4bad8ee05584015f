use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::MessagingConfig;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Messaging dispatcher rejected request: {0}")]
    Rejected(String),

    #[error("Messaging dispatcher unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Structured payload for the outbound messaging dispatcher, which performs
/// the actual WhatsApp/SMS delivery.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    pub evento: String,
    pub dados: MessageData,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageData {
    pub igreja_id: Option<Uuid>,
    pub telefone: String,
    pub nome: String,
    pub mensagem: String,
    pub template: String,
}

/// Outbound delivery boundary. Callers decide whether a failure is fatal;
/// for OTP delivery it never is (the code already exists in the store).
#[async_trait]
pub trait MessagingDispatcher: Send + Sync {
    async fn dispatch(&self, payload: &MessagePayload) -> Result<(), MessagingError>;
}

/// Posts payloads to the platform's messaging endpoint (a sibling function,
/// same service credential).
pub struct HttpMessagingDispatcher {
    http: reqwest::Client,
    endpoint: String,
    service_key: String,
}

impl HttpMessagingDispatcher {
    pub fn new(config: &MessagingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            service_key: config.service_key.clone(),
        }
    }
}

#[async_trait]
impl MessagingDispatcher for HttpMessagingDispatcher {
    async fn dispatch(&self, payload: &MessagePayload) -> Result<(), MessagingError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.service_key)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MessagingError::Rejected(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}
