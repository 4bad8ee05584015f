// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request (missing/invalid fields, unknown action, provider rejections)
    BadRequest(String),

    // 401 Unauthorized (missing authorization header on privileged actions)
    Unauthorized(String),

    // 404 Not Found (profile or linked account absent)
    NotFound(String),

    // 500 with a distinguished message: identity account exists but the
    // profile link failed, operator remediation may be needed
    PartialFailure(String),

    // 500 Internal Server Error, generic client message
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::PartialFailure(_) => 500,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::PartialFailure(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to the `{success, error}` JSON envelope
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert domain errors to ApiError
impl From<crate::services::provision::ProvisionError> for ApiError {
    fn from(err: crate::services::provision::ProvisionError) -> Self {
        use crate::services::provision::ProvisionError;

        match err {
            ProvisionError::Provider(msg) => ApiError::bad_request(msg),
            ProvisionError::ProfileNotFound => ApiError::not_found(err.to_string()),
            ProvisionError::CreatedButNotLinked { ref source, .. } => {
                // Full detail server-side; the distinguished message (with the
                // orphaned account id) goes to the caller
                tracing::error!("Profile link failed after account creation: {}", source);
                ApiError::PartialFailure(err.to_string())
            }
            ProvisionError::Store(e) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Store error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::database::StoreError> for ApiError {
    fn from(err: crate::database::StoreError) -> Self {
        tracing::error!("Store error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
