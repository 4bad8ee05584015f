use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use igreja_api::database::models::{NewOtpRecord, Profile};
use igreja_api::database::otp_store::OtpStore;
use igreja_api::database::profile_store::ProfileStore;
use igreja_api::database::StoreError;
use igreja_api::identity::{IdentityError, IdentityProvider};
use igreja_api::messaging::{MessagePayload, MessagingDispatcher, MessagingError};
use igreja_api::services::otp::normalize_phone;
use igreja_api::state::AppState;

/// In-memory `pessoas` table mirroring the store's matching semantics
#[derive(Default, Clone)]
pub struct FakeProfileStore {
    pub profiles: Arc<Mutex<Vec<Profile>>>,
    pub fail_link: Arc<AtomicBool>,
}

impl FakeProfileStore {
    pub fn insert(&self, profile: Profile) {
        self.profiles.lock().unwrap().push(profile);
    }

    pub fn get(&self, id: Uuid) -> Option<Profile> {
        self.profiles.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.get(id))
    }

    async fn link_account(&self, id: Uuid, user_id: &str) -> Result<(), StoreError> {
        if self.fail_link.load(Ordering::SeqCst) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolClosed));
        }
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::RowNotFound(format!("pessoa {}", id)))?;
        profile.user_id = Some(user_id.to_string());
        profile.deve_trocar_senha = true;
        Ok(())
    }

    async fn set_must_change_password(&self, id: Uuid) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::RowNotFound(format!("pessoa {}", id)))?;
        profile.deve_trocar_senha = true;
        Ok(())
    }

    async fn find_by_phone(&self, digits: &str) -> Result<Option<Profile>, StoreError> {
        // Suffix tolerance only applies with a full 9-digit suffix,
        // matching the SQL store
        let suffix = if digits.len() >= 9 { Some(&digits[digits.len() - 9..]) } else { None };
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles
            .iter()
            .filter(|p| p.user_id.is_some())
            .find(|p| {
                p.telefone.as_deref().is_some_and(|t| {
                    let stored = normalize_phone(t);
                    stored == digits || suffix.is_some_and(|s| stored.ends_with(s))
                })
            })
            .cloned())
    }
}

/// Records every inserted OTP row; can be switched to fail
#[derive(Default, Clone)]
pub struct RecordingOtpStore {
    pub records: Arc<Mutex<Vec<NewOtpRecord>>>,
    pub fail: Arc<AtomicBool>,
}

#[async_trait]
impl OtpStore for RecordingOtpStore {
    async fn insert(&self, record: &NewOtpRecord) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolClosed));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Programmable identity provider recording every admin call
#[derive(Default, Clone)]
pub struct FakeIdentity {
    pub created: Arc<Mutex<Vec<(String, String)>>>,
    pub password_updates: Arc<Mutex<Vec<(String, String)>>>,
    pub reject_create: Arc<Mutex<Option<String>>>,
    pub reject_set_password: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        if let Some(msg) = self.reject_create.lock().unwrap().clone() {
            return Err(IdentityError::Rejected(msg));
        }
        let mut created = self.created.lock().unwrap();
        created.push((email.to_string(), password.to_string()));
        Ok(format!("account-{}", created.len()))
    }

    async fn set_password(&self, account_id: &str, password: &str) -> Result<(), IdentityError> {
        if let Some(msg) = self.reject_set_password.lock().unwrap().clone() {
            return Err(IdentityError::Rejected(msg));
        }
        self.password_updates
            .lock()
            .unwrap()
            .push((account_id.to_string(), password.to_string()));
        Ok(())
    }
}

/// Records dispatched payloads; can simulate a messaging outage
#[derive(Default, Clone)]
pub struct FakeMessaging {
    pub sent: Arc<Mutex<Vec<MessagePayload>>>,
    pub fail: Arc<AtomicBool>,
}

#[async_trait]
impl MessagingDispatcher for FakeMessaging {
    async fn dispatch(&self, payload: &MessagePayload) -> Result<(), MessagingError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MessagingError::Rejected("503: simulated outage".to_string()));
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

pub struct TestHarness {
    pub app: Router,
    pub profiles: FakeProfileStore,
    pub otps: RecordingOtpStore,
    pub identity: FakeIdentity,
    pub messaging: FakeMessaging,
}

pub fn harness() -> TestHarness {
    let profiles = FakeProfileStore::default();
    let otps = RecordingOtpStore::default();
    let identity = FakeIdentity::default();
    let messaging = FakeMessaging::default();

    let app = igreja_api::app(AppState {
        profiles: Arc::new(profiles.clone()),
        otps: Arc::new(otps.clone()),
        identity: Arc::new(identity.clone()),
        messaging: Arc::new(messaging.clone()),
    });

    TestHarness { app, profiles, otps, identity, messaging }
}

pub fn profile(nome: &str, telefone: Option<&str>, user_id: Option<&str>) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        nome: nome.to_string(),
        telefone: telefone.map(str::to_string),
        igreja_id: None,
        user_id: user_id.map(str::to_string),
        deve_trocar_senha: false,
    }
}

/// POST a JSON body to the dispatch endpoint, returning status and raw body
/// bytes (the enumeration-resistance test compares bodies byte for byte).
pub async fn post_provision(
    app: &Router,
    body: Value,
    authorized: bool,
) -> (StatusCode, Bytes) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/auth/criar-usuario")
        .header("content-type", "application/json");
    if authorized {
        request = request.header("authorization", "Bearer service-role-key");
    }
    let request = request
        .body(Body::from(body.to_string()))
        .expect("request build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router call");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, bytes)
}

pub fn json_body(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).expect("valid JSON body")
}
