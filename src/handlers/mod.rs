use axum::response::Json;
use serde_json::{json, Value};

pub mod provision;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Igreja API",
            "version": version,
            "description": "Credential provisioning and OTP recovery for the church management platform",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "provision": "/auth/criar-usuario (POST; create_user and reset_password require an Authorization header, recovery_otp is public)",
            }
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
