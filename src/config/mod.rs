use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),
}

/// Runtime configuration, read once at startup and injected from `main`.
///
/// Collaborator clients are constructed from this and passed into the app
/// state explicitly, so tests never need to touch process environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub identity: IdentityConfig,
    pub messaging: MessagingConfig,
}

/// Identity-provider admin API: base URL plus the service-level credential
/// (distinct from any end-user credential).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub service_key: String,
}

/// Outbound messaging dispatcher endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub service_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let database_url = require("DATABASE_URL")?;
        let identity_base_url = require("IDENTITY_API_URL")?;
        let identity_service_key = require("IDENTITY_SERVICE_KEY")?;
        let messaging_endpoint = require("MESSAGING_DISPATCH_URL")?;
        let messaging_service_key = env::var("MESSAGING_SERVICE_KEY")
            .unwrap_or_else(|_| identity_service_key.clone());

        Ok(Self {
            port,
            database_url,
            identity: IdentityConfig {
                base_url: identity_base_url,
                service_key: identity_service_key,
            },
            messaging: MessagingConfig {
                endpoint: messaging_endpoint,
                service_key: messaging_service_key,
            },
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}
