use axum::{extract::State, http::HeaderMap, response::Json};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::services::provision::{
    self, CreateUserRequest, ProvisionResponse, RecoveryOtpRequest, ResetPasswordRequest,
};
use crate::state::AppState;

/// POST /auth/criar-usuario - single dispatch endpoint
///
/// Routes on the `action` discriminator: `create_user` and `reset_password`
/// are privileged (Authorization header must be present; signature and role
/// checks belong to the platform gateway in front of this service),
/// `recovery_otp` is self-service and unauthenticated.
pub async fn provision_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<ProvisionResponse>, ApiError> {
    let action = body
        .get("action")
        .and_then(Value::as_str)
        .map(str::to_owned);

    match action.as_deref() {
        Some("create_user") => {
            require_authorization(&headers)?;
            let req: CreateUserRequest = parse_payload(body)?;
            require_fields(&[("email", &req.email), ("password", &req.password)])?;
            let response = provision::create_user(&state, req).await?;
            Ok(Json(response))
        }
        Some("reset_password") => {
            require_authorization(&headers)?;
            let req: ResetPasswordRequest = parse_payload(body)?;
            require_fields(&[("password", &req.password)])?;
            let response = provision::reset_password(&state, req).await?;
            Ok(Json(response))
        }
        Some("recovery_otp") => {
            let req: RecoveryOtpRequest = parse_payload(body)?;
            require_fields(&[("telefone", &req.telefone)])?;
            Ok(Json(provision::recovery_otp(&state, req).await))
        }
        _ => Err(ApiError::bad_request("Invalid action")),
    }
}

/// Presence-only check; no token validation happens here
fn require_authorization(headers: &HeaderMap) -> Result<(), ApiError> {
    if headers.get("authorization").is_none() {
        return Err(ApiError::unauthorized("Missing Authorization header"));
    }
    Ok(())
}

/// Deserialize the action-specific payload, rejecting before any side effect
fn parse_payload<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid request: {}", e)))
}

/// Reject blank required fields the same way missing ones are rejected
fn require_fields(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}
