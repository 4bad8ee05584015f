use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::Profile;
use super::StoreError;

/// Persistence boundary for the `pessoas` table.
///
/// Injected as a trait object so tests can substitute an in-memory fake
/// without touching process environment or a live database.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Attach an identity-provider account id and force a password change.
    /// Fails with `RowNotFound` when the profile does not exist.
    async fn link_account(&self, id: Uuid, user_id: &str) -> Result<(), StoreError>;

    async fn set_must_change_password(&self, id: Uuid) -> Result<(), StoreError>;

    /// Find at most one profile with a linked account whose phone number
    /// matches the given digits exactly, or by suffix on the last 9 digits
    /// (tolerates differing country/area-code prefixes). Inputs shorter
    /// than 9 digits match exactly only.
    async fn find_by_phone(&self, digits: &str) -> Result<Option<Profile>, StoreError>;
}

const PROFILE_COLUMNS: &str = "id, nome, telefone, igreja_id, user_id, deve_trocar_senha";

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM pessoas WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn link_account(&self, id: Uuid, user_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE pessoas SET user_id = $2, deve_trocar_senha = true WHERE id = $1",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound(format!("pessoa {}", id)));
        }

        Ok(())
    }

    async fn set_must_change_password(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE pessoas SET deve_trocar_senha = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound(format!("pessoa {}", id)));
        }

        Ok(())
    }

    async fn find_by_phone(&self, digits: &str) -> Result<Option<Profile>, StoreError> {
        // The prefix-tolerant branch needs a full 9-digit suffix; anything
        // shorter would wildcard-match unrelated numbers, so it only gets
        // the exact comparison.
        if digits.len() < 9 {
            let profile = sqlx::query_as::<_, Profile>(&format!(
                r#"
                SELECT {}
                FROM pessoas
                WHERE user_id IS NOT NULL
                  AND regexp_replace(telefone, '\D', '', 'g') = $1
                LIMIT 1
                "#,
                PROFILE_COLUMNS
            ))
            .bind(digits)
            .fetch_optional(&self.pool)
            .await?;

            return Ok(profile);
        }

        let suffix = &digits[digits.len() - 9..];

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {}
            FROM pessoas
            WHERE user_id IS NOT NULL
              AND (regexp_replace(telefone, '\D', '', 'g') = $1
                   OR regexp_replace(telefone, '\D', '', 'g') LIKE '%' || $2)
            LIMIT 1
            "#,
            PROFILE_COLUMNS
        ))
        .bind(digits)
        .bind(suffix)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}
