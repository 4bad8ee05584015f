use thiserror::Error;

pub mod models;
pub mod otp_store;
pub mod profile_store;

/// Errors from the persistence collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    RowNotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
