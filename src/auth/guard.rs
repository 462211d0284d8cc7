//! Session guard: turns a bearer token into an authenticated identity.
//!
//! Checks run in a fixed order and stop at the first failure:
//! empty token, blacklist, signature/expiry/claims, user lookup.
//! Every rejection collapses to `AuthError::Unauthenticated`; only credential
//! store failures come back as something else.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::AuthError;
use super::models::{Identity, Role};
use super::store::CredentialStore;
use super::tokens::{TokenClaims, TokenPurpose, TokenService};
use crate::common::{normalize_email, safe_email_log, safe_token_log};

pub struct SessionGuard {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    admin_emails: HashSet<String>,
}

impl SessionGuard {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        admin_emails: HashSet<String>,
    ) -> Self {
        Self {
            store,
            tokens,
            admin_emails,
        }
    }

    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        self.authenticate_with_claims(token)
            .await
            .map(|(identity, _)| identity)
    }

    /// Like `authenticate`, also returning the verified claims
    pub async fn authenticate_with_claims(
        &self,
        token: &str,
    ) -> Result<(Identity, TokenClaims), AuthError> {
        if token.trim().is_empty() {
            debug!("Authentication failed: empty token");
            return Err(AuthError::Unauthenticated);
        }

        if self.store.is_token_revoked(token).await? {
            warn!(token = %safe_token_log(token), "Authentication failed: token is blacklisted");
            return Err(AuthError::Unauthenticated);
        }

        let claims = self
            .tokens
            .validate_for(token, TokenPurpose::Session)
            .map_err(|reason| {
                debug!(reason = %reason, "Authentication failed: token rejected");
                AuthError::Unauthenticated
            })?;

        let email = normalize_email(&claims.sub);
        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) if user.is_active => user,
            Some(user) => {
                warn!(user_id = %user.id, "Authentication failed: account is deactivated");
                return Err(AuthError::Unauthenticated);
            }
            None => {
                warn!(email = %safe_email_log(&email), "Authentication failed: user not found");
                return Err(AuthError::Unauthenticated);
            }
        };

        let role = Role::for_email(&user.email, &self.admin_emails);
        debug!(user_id = %user.id, role = ?role, "Session authenticated");

        Ok((Identity { user, role }, claims))
    }
}
