use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::database::models::{NewOtpRecord, OtpPurpose};
use crate::database::otp_store::OtpStore;
use crate::database::StoreError;
use crate::messaging::{MessageData, MessagePayload, MessagingDispatcher};

/// Codes expire this many minutes after issuance
pub const OTP_TTL_MINUTES: i64 = 10;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("Não foi possível gerar o código de verificação")]
    Store(#[source] StoreError),
}

/// Outcome of a successful issuance: the record exists either way, delivery
/// is best-effort and reported separately (`otp_enviado` in responses).
#[derive(Debug, Clone, Copy)]
pub struct IssueOutcome {
    pub delivered: bool,
}

/// Uniform random draw over [100000, 999999], always 6 decimal digits
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Strip everything that is not an ASCII digit
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Random internal password used when `recovery_otp` rotates an account's
/// credential before the OTP-driven reset.
pub fn generate_recovery_password() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

/// Generates, persists and (best-effort) delivers one verification code.
pub struct OtpIssuer {
    otps: Arc<dyn OtpStore>,
    messaging: Arc<dyn MessagingDispatcher>,
}

impl OtpIssuer {
    pub fn new(otps: Arc<dyn OtpStore>, messaging: Arc<dyn MessagingDispatcher>) -> Self {
        Self { otps, messaging }
    }

    /// Issue one OTP for a profile.
    ///
    /// Persistence failure aborts with a generic error and no delivery
    /// attempt. Delivery failure is logged and reported through
    /// `IssueOutcome::delivered` only; the code remains valid in the store.
    pub async fn issue(
        &self,
        pessoa_id: Uuid,
        raw_phone: &str,
        igreja_id: Option<Uuid>,
        nome: &str,
        purpose: OtpPurpose,
    ) -> Result<IssueOutcome, OtpError> {
        let codigo = generate_code();
        let telefone = normalize_phone(raw_phone);
        let expira_em = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        let record = NewOtpRecord {
            pessoa_id,
            codigo: codigo.clone(),
            tipo: purpose,
            telefone: telefone.clone(),
            igreja_id,
            expira_em,
        };

        self.otps.insert(&record).await.map_err(OtpError::Store)?;

        let payload = MessagePayload {
            evento: "enviar_otp".to_string(),
            dados: MessageData {
                igreja_id,
                telefone,
                nome: nome.to_string(),
                mensagem: format!(
                    "Seu código de verificação é {}. Ele expira em {} minutos.",
                    codigo, OTP_TTL_MINUTES
                ),
                template: purpose.as_str().to_string(),
            },
        };

        match self.messaging.dispatch(&payload).await {
            Ok(()) => Ok(IssueOutcome { delivered: true }),
            Err(e) => {
                warn!(pessoa_id = %pessoa_id, tipo = purpose.as_str(), "OTP delivery failed: {}", e);
                Ok(IssueOutcome { delivered: false })
            }
        }
    }
}
