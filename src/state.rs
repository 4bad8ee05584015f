use std::sync::Arc;

use crate::database::otp_store::OtpStore;
use crate::database::profile_store::ProfileStore;
use crate::identity::IdentityProvider;
use crate::messaging::MessagingDispatcher;

/// Injected collaborators shared by all handlers.
///
/// Everything is behind a trait object so integration tests can run the
/// full router against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub otps: Arc<dyn OtpStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub messaging: Arc<dyn MessagingDispatcher>,
}
