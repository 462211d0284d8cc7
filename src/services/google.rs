// src/services/google.rs
//! Google OAuth login initiation.
//!
//! Only the authorization redirect is built here. The provider authenticates the
//! user; exchanging the returned code for a profile happens elsewhere.

use tracing::debug;

use crate::common::config::GoogleOAuthConfig;

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Basic user info scopes requested at login
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Build a Google authorization URL.
///
/// Scopes are space-delimited; every parameter is percent-encoded.
pub fn build_authorization_url(client_id: &str, redirect_uri: &str, scopes: &[&str]) -> String {
    let scope_param = scopes.join(" ");

    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
        GOOGLE_AUTH_ENDPOINT,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&scope_param)
    )
}

/// Builds the consent-screen redirect. The client secret in `GoogleOAuthConfig` is held
/// for the code exchange, which happens outside this service.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    config: GoogleOAuthConfig,
}

impl GoogleOAuth {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self { config }
    }

    /// Authorization URL for the configured client and callback
    pub fn authorization_url(&self) -> String {
        let url = build_authorization_url(
            &self.config.client_id,
            &self.config.redirect_uri,
            &DEFAULT_SCOPES,
        );
        debug!(redirect_uri = %self.config.redirect_uri, "Generated Google OAuth authorization URL");
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::Secret;

    #[test]
    fn test_build_authorization_url() {
        let url = build_authorization_url(
            "client-123",
            "http://localhost:8080/auth/google/callback",
            &DEFAULT_SCOPES,
        );

        assert_eq!(
            url,
            "https://accounts.google.com/o/oauth2/v2/auth?response_type=code&client_id=client-123\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fgoogle%2Fcallback\
             &scope=openid%20email%20profile"
        );
    }

    #[test]
    fn test_parameters_are_encoded() {
        let url = build_authorization_url("id&x=1", "https://app.example.com/cb?a=b", &["email"]);
        assert!(url.contains("client_id=id%26x%3D1"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb%3Fa%3Db"));
        assert!(url.ends_with("&scope=email"));
    }

    #[test]
    fn test_configured_url_never_contains_secret() {
        let google = GoogleOAuth::new(GoogleOAuthConfig {
            client_id: "test_client_id".to_string(),
            client_secret: Secret::new("super-secret"),
            redirect_uri: "http://localhost:3000/callback".to_string(),
        });

        let url = google.authorization_url();
        assert!(url.starts_with(GOOGLE_AUTH_ENDPOINT));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http"));
        assert!(url.contains("scope=openid"));
        assert!(!url.contains("super-secret"));
    }
}
