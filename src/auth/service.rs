//! Core business logic for the authentication system.
//!
//! Orchestrates signup, login, email verification, logout and profile updates
//! on top of the credential store, password hasher, token service and session guard.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::guard::SessionGuard;
use super::models::{
    BlacklistEntry, Identity, LoginRequest, LoginResponse, NewUser, ProfileChanges,
    SignupRequest, User, UserSummary,
};
use super::password::PasswordHasher;
use super::store::{CredentialStore, StoreError};
use super::tokens::{TokenPurpose, TokenService};
use super::validators::{ProfileChangesValidator, SignupValidator};
use crate::common::{generate_user_id, normalize_email, safe_email_log, Validator};
use crate::services::mailer::{verification_email, Mailer};

/// Token lifetimes and links used by the flow
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_ttl: Duration,
    pub verification_ttl: Duration,
    pub frontend_url: String,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    guard: Arc<SessionGuard>,
    mailer: Arc<dyn Mailer>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        guard: Arc<SessionGuard>,
        mailer: Arc<dyn Mailer>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            guard,
            mailer,
            settings,
        }
    }

    /// Register a password account and send its verification link
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AuthError> {
        let validation = SignupValidator.validate(&request);
        if !validation.is_valid {
            return Err(AuthError::Validation(validation.summary()));
        }

        let email = normalize_email(&request.email);

        if self.store.find_user_by_email(&email).await?.is_some() {
            info!(email = %safe_email_log(&email), "Signup rejected: email already registered");
            return Err(AuthError::DuplicateEmail);
        }
        if let Some(username) = &request.username {
            if self.store.find_user_by_username(username).await?.is_some() {
                info!(username = %username, "Signup rejected: username already taken");
                return Err(AuthError::DuplicateUsername);
            }
        }

        let hashed_password = self.hasher.hash_async(request.password).await?;
        let new_user = NewUser {
            id: generate_user_id(),
            email: email.clone(),
            username: request.username,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            profile_image: request.profile_image,
            hashed_password: Some(hashed_password),
            is_google_user: false,
        };

        let user = match self.store.insert_user(&new_user).await {
            Ok(user) => user,
            // Lost a race with a concurrent signup; the unique index decided
            Err(StoreError::Conflict) => return Err(self.conflict_reason(&email).await?),
            Err(e) => return Err(e.into()),
        };
        info!(user_id = %user.id, email = %safe_email_log(&user.email), "User created");

        let verification = self.tokens.issue(
            &user.email,
            Some(&user.id),
            TokenPurpose::EmailVerification,
            self.settings.verification_ttl,
        )?;
        self.send_verification(&user, &verification.token).await;

        Ok(user)
    }

    async fn conflict_reason(&self, email: &str) -> Result<AuthError, AuthError> {
        if self.store.find_user_by_email(email).await?.is_some() {
            Ok(AuthError::DuplicateEmail)
        } else {
            Ok(AuthError::DuplicateUsername)
        }
    }

    async fn send_verification(&self, user: &User, token: &str) {
        let link = format!(
            "{}/profile/overview?token={}",
            self.settings.frontend_url,
            urlencoding::encode(token)
        );
        let mail = verification_email(
            &user.email,
            &link,
            self.settings.verification_ttl.num_minutes(),
        );

        if let Err(e) = self.mailer.send(mail).await {
            warn!(user_id = %user.id, error = %e, "Failed to send verification email");
        }
    }

    /// Check credentials and issue a session token.
    ///
    /// Every failure is the same `InvalidCredentials`, whatever the cause.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let email = normalize_email(&request.email);
        let user = self.store.find_user_by_email(&email).await?;

        let stored_hash = user
            .as_ref()
            .filter(|u| u.is_active)
            .and_then(|u| u.hashed_password.clone());
        let password_ok = self
            .hasher
            .verify_async(request.password, stored_hash)
            .await;

        let user = match user {
            Some(user) if password_ok => user,
            Some(user) => {
                warn!(user_id = %user.id, "Login failed: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                warn!(email = %safe_email_log(&email), "Login failed: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let session = self.tokens.issue(
            &user.email,
            Some(&user.id),
            TokenPurpose::Session,
            self.settings.session_ttl,
        )?;
        info!(user_id = %user.id, "Login successful");

        Ok(LoginResponse {
            access_token: session.token,
            token_type: "bearer".to_string(),
            user: UserSummary::from(&user),
        })
    }

    /// Mark the account named by a verification token as verified
    pub async fn verify_email(&self, token: &str) -> Result<User, AuthError> {
        let claims = self
            .tokens
            .validate_for(token, TokenPurpose::EmailVerification)?;

        let email = normalize_email(&claims.sub);
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Email reused by a newer account after the link was sent
        if claims.id.as_deref().is_some_and(|id| id != user.id) {
            warn!(user_id = %user.id, "Verification token was issued to a different account");
            return Err(AuthError::UserNotFound);
        }

        if !self.store.mark_verified(&user.id).await? {
            return Err(AuthError::UserNotFound);
        }
        info!(user_id = %user.id, "Email verified");

        self.store
            .find_user_by_id(&user.id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Revoke a session token so the guard refuses it from now on
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let (identity, claims) = self.guard.authenticate_with_claims(token).await?;

        let entry = BlacklistEntry {
            token: token.to_string(),
            user_id: Some(identity.user.id.clone()),
            reason: Some("logout".to_string()),
            revoked_at: Utc::now().to_rfc3339(),
            expires_at: claims.exp.unwrap_or_else(|| Utc::now().timestamp()),
        };
        self.store.revoke_token(&entry).await?;
        info!(user_id = %identity.user.id, "Session token revoked");

        Ok(())
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        changes: ProfileChanges,
    ) -> Result<User, AuthError> {
        let validation = ProfileChangesValidator.validate(&changes);
        if !validation.is_valid {
            return Err(AuthError::Validation(validation.summary()));
        }

        if let Some(username) = &changes.username {
            if let Some(owner) = self.store.find_user_by_username(username).await? {
                if owner.id != identity.user.id {
                    return Err(AuthError::DuplicateUsername);
                }
            }
        }

        let updated = match self.store.update_profile(&identity.user.id, &changes).await {
            Ok(updated) => updated,
            Err(StoreError::Conflict) => return Err(AuthError::DuplicateUsername),
            Err(e) => return Err(e.into()),
        };
        debug!(user_id = %identity.user.id, "Profile updated");

        updated.ok_or(AuthError::UserNotFound)
    }
}
