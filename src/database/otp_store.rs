use async_trait::async_trait;
use sqlx::PgPool;

use super::models::NewOtpRecord;
use super::StoreError;

/// Persistence boundary for the `otp_codes` table.
///
/// Append-only: prior unexpired codes for the same profile are never
/// invalidated here; the verification flow owns that policy.
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn insert(&self, record: &NewOtpRecord) -> Result<(), StoreError>;
}

pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpStore for PgOtpStore {
    async fn insert(&self, record: &NewOtpRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO otp_codes (pessoa_id, codigo, tipo, telefone, igreja_id, expira_em)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.pessoa_id)
        .bind(&record.codigo)
        .bind(record.tipo.as_str())
        .bind(&record.telefone)
        .bind(record.igreja_id)
        .bind(record.expira_em)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
