// Application state shared across all handlers

use std::sync::Arc;

use super::config::AppConfig;
use crate::auth::error::AuthError;
use crate::auth::guard::SessionGuard;
use crate::auth::password::PasswordHasher;
use crate::auth::service::{AuthService, AuthSettings};
use crate::auth::store::CredentialStore;
use crate::auth::tokens::TokenService;
use crate::services::{GoogleOAuth, Mailer};

/// Services and read-only configuration, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub session_guard: Arc<SessionGuard>,
    pub google_oauth: Arc<GoogleOAuth>,
    pub frontend_url: String,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenService::new(&config.jwt_secret));
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;

        let session_guard = Arc::new(SessionGuard::new(
            store.clone(),
            tokens.clone(),
            config.admin_emails.clone(),
        ));

        let auth_service = Arc::new(AuthService::new(
            store,
            hasher,
            tokens,
            session_guard.clone(),
            mailer,
            AuthSettings {
                session_ttl: config.session_ttl,
                verification_ttl: config.verification_ttl,
                frontend_url: config.frontend_url.clone(),
            },
        ));

        Ok(Self {
            auth_service,
            session_guard,
            google_oauth: Arc::new(GoogleOAuth::new(config.google.clone())),
            frontend_url: config.frontend_url.clone(),
        })
    }
}
