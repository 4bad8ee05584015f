use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod messaging;
pub mod services;
pub mod state;

use state::AppState;

/// Build the router over an injected set of collaborators.
///
/// CORS is wide open (the permissive layer also answers OPTIONS preflight);
/// origin restrictions are a platform concern, not this service's.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/auth/criar-usuario", post(handlers::provision::provision_post))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
