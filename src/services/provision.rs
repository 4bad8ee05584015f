use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::database::models::{OtpPurpose, Profile};
use crate::database::StoreError;
use crate::identity::IdentityError;
use crate::services::otp::{generate_recovery_password, normalize_phone, OtpIssuer};
use crate::state::AppState;

pub const MSG_USER_CREATED: &str = "Usuário criado";
pub const MSG_USER_CREATED_OTP: &str = "Usuário criado e código enviado via WhatsApp";
pub const MSG_PASSWORD_RESET: &str = "Senha resetada";
pub const MSG_PASSWORD_RESET_OTP: &str = "Senha resetada e código enviado via WhatsApp";
/// Returned for every `recovery_otp` call, found or not, so responses never
/// reveal whether a phone number is registered.
pub const MSG_RECOVERY_GENERIC: &str =
    "Se o telefone estiver cadastrado, você receberá um código de verificação";

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub profile_id: Uuid,
    pub telefone: Option<String>,
    pub nome: Option<String>,
    pub igreja_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub profile_id: Uuid,
    pub telefone: Option<String>,
    pub nome: Option<String>,
    pub igreja_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RecoveryOtpRequest {
    pub telefone: String,
}

/// Success envelope; absent fields are omitted so the `recovery_otp` body is
/// identical in the found and not-found cases.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_enviado: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Identity-provider rejection, message passed through verbatim
    #[error("{0}")]
    Provider(String),

    #[error("Perfil não encontrado ou sem conta vinculada")]
    ProfileNotFound,

    /// The account exists at the identity provider but the profile link
    /// failed: an orphaned account that needs manual reconciliation.
    #[error("Usuário {user_id} criado no provedor de identidade, mas o perfil {profile_id} não foi vinculado")]
    CreatedButNotLinked {
        profile_id: Uuid,
        user_id: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<IdentityError> for ProvisionError {
    fn from(err: IdentityError) -> Self {
        ProvisionError::Provider(err.to_string())
    }
}

/// Contact data for OTP delivery: caller-supplied overrides win, stored
/// profile values are the fallback. A phone counts as present only if it
/// still has digits after normalization.
struct Contact {
    telefone: Option<String>,
    nome: String,
    igreja_id: Option<Uuid>,
}

fn resolve_contact(
    profile: Option<&Profile>,
    telefone: Option<String>,
    nome: Option<String>,
    igreja_id: Option<Uuid>,
) -> Contact {
    let telefone = telefone
        .or_else(|| profile.and_then(|p| p.telefone.clone()))
        .filter(|t| !normalize_phone(t).is_empty());
    let nome = nome
        .or_else(|| profile.map(|p| p.nome.clone()))
        .unwrap_or_default();
    let igreja_id = igreja_id.or_else(|| profile.and_then(|p| p.igreja_id));

    Contact { telefone, nome, igreja_id }
}

/// Issue an OTP, degrading to `otp_enviado: false` on any issuer failure.
/// The account mutation already succeeded by the time this runs, so a
/// missing code must not fail the overall action.
async fn try_issue(
    state: &AppState,
    pessoa_id: Uuid,
    contact: &Contact,
    purpose: OtpPurpose,
) -> bool {
    let Some(telefone) = contact.telefone.as_deref() else {
        return false;
    };

    let issuer = OtpIssuer::new(state.otps.clone(), state.messaging.clone());
    match issuer
        .issue(pessoa_id, telefone, contact.igreja_id, &contact.nome, purpose)
        .await
    {
        Ok(outcome) => outcome.delivered,
        Err(e) => {
            error!(pessoa_id = %pessoa_id, "OTP issuance failed: {}", e);
            false
        }
    }
}

/// `create_user`: identity account first, then profile link, then OTP.
///
/// The create-then-link sequence spans two systems with no shared
/// transaction; a link failure is surfaced as `CreatedButNotLinked` so the
/// orphaned account is visible to operators.
pub async fn create_user(
    state: &AppState,
    req: CreateUserRequest,
) -> Result<ProvisionResponse, ProvisionError> {
    let user_id = state
        .identity
        .create_account(&req.email, &req.password)
        .await?;

    if let Err(source) = state.profiles.link_account(req.profile_id, &user_id).await {
        return Err(ProvisionError::CreatedButNotLinked {
            profile_id: req.profile_id,
            user_id,
            source,
        });
    }

    let profile = state.profiles.fetch(req.profile_id).await?;
    let contact = resolve_contact(profile.as_ref(), req.telefone, req.nome, req.igreja_id);
    let otp_enviado = try_issue(state, req.profile_id, &contact, OtpPurpose::CriarSenha).await;

    let message = if otp_enviado { MSG_USER_CREATED_OTP } else { MSG_USER_CREATED };
    Ok(ProvisionResponse {
        success: true,
        user_id: Some(user_id),
        otp_enviado: Some(otp_enviado),
        message: Some(message.to_string()),
    })
}

/// `reset_password`: rotate the linked account's password, force a change
/// on next login, then OTP.
pub async fn reset_password(
    state: &AppState,
    req: ResetPasswordRequest,
) -> Result<ProvisionResponse, ProvisionError> {
    let profile = state
        .profiles
        .fetch(req.profile_id)
        .await?
        .ok_or(ProvisionError::ProfileNotFound)?;
    let user_id = profile
        .user_id
        .clone()
        .ok_or(ProvisionError::ProfileNotFound)?;

    state.identity.set_password(&user_id, &req.password).await?;
    state.profiles.set_must_change_password(req.profile_id).await?;

    let contact = resolve_contact(Some(&profile), req.telefone, req.nome, req.igreja_id);
    let otp_enviado = try_issue(state, req.profile_id, &contact, OtpPurpose::ResetarSenha).await;

    let message = if otp_enviado { MSG_PASSWORD_RESET_OTP } else { MSG_PASSWORD_RESET };
    Ok(ProvisionResponse {
        success: true,
        user_id: None,
        otp_enviado: Some(otp_enviado),
        message: Some(message.to_string()),
    })
}

/// `recovery_otp`: self-service, unauthenticated. The response is a fixed
/// generic body; failures on the matched path are logged and swallowed so
/// neither content nor status leaks whether the phone is registered.
pub async fn recovery_otp(state: &AppState, req: RecoveryOtpRequest) -> ProvisionResponse {
    let digits = normalize_phone(&req.telefone);

    if !digits.is_empty() {
        if let Err(e) = rotate_and_notify(state, &digits).await {
            error!("recovery_otp failure (masked from caller): {}", e);
        }
    }

    ProvisionResponse {
        success: true,
        user_id: None,
        otp_enviado: None,
        message: Some(MSG_RECOVERY_GENERIC.to_string()),
    }
}

/// Rotate the matched account's password to a random internal value (the
/// user can only get back in through the OTP-driven reset) and send the
/// recovery code to the stored phone number.
async fn rotate_and_notify(state: &AppState, digits: &str) -> Result<(), ProvisionError> {
    let Some(profile) = state.profiles.find_by_phone(digits).await? else {
        return Ok(());
    };
    // find_by_phone only returns linked profiles, but don't rely on it
    let Some(user_id) = profile.user_id.clone() else {
        return Ok(());
    };

    let new_password = generate_recovery_password();
    state.identity.set_password(&user_id, &new_password).await?;
    state.profiles.set_must_change_password(profile.id).await?;

    let telefone = profile.telefone.clone().unwrap_or_else(|| digits.to_string());
    let contact = Contact {
        telefone: Some(telefone),
        nome: profile.nome.clone(),
        igreja_id: profile.igreja_id,
    };
    try_issue(state, profile.id, &contact, OtpPurpose::RecuperarSenha).await;

    Ok(())
}
