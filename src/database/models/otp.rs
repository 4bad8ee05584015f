use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why an OTP was issued. Stored as the snake_case tag in `otp_codes.tipo`
/// and reused as the delivery template identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    CriarSenha,
    ResetarSenha,
    RecuperarSenha,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::CriarSenha => "criar_senha",
            OtpPurpose::ResetarSenha => "resetar_senha",
            OtpPurpose::RecuperarSenha => "recuperar_senha",
        }
    }
}

/// Insert payload for one row of the append-only `otp_codes` table.
///
/// Verification and expiry enforcement happen elsewhere; this service only
/// ever inserts, so there is no read model here.
#[derive(Debug, Clone)]
pub struct NewOtpRecord {
    pub pessoa_id: Uuid,
    pub codigo: String,
    pub tipo: OtpPurpose,
    /// Digits-only phone number the code was sent to
    pub telefone: String,
    pub igreja_id: Option<Uuid>,
    pub expira_em: DateTime<Utc>,
}
