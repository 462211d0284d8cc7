//! JWT token creation and validation.
//!
//! Tokens are HS256-signed with the process-wide secret. `decode` checks the
//! signature before any claim is looked at, so nothing from an unverified token
//! ever reaches a caller.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{AuthError, TokenInvalid};
use crate::common::config::Secret;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    EmailVerification,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's normalized email
    #[serde(default)]
    pub sub: String,
    /// User id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<TokenPurpose>,
}

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"<redacted>")
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &Secret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.expose().as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.expose().as_bytes()),
            validation,
        }
    }

    /// Sign a claim set expiring `ttl` from now
    pub fn issue(
        &self,
        subject: &str,
        user_id: Option<&str>,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.to_string(),
            id: user_id.map(str::to_string),
            iat: Some(now.timestamp()),
            exp: Some((now + ttl).timestamp()),
            purpose: Some(purpose),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry and require a non-empty subject
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenInvalid> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenInvalid::BadSignature,
                ErrorKind::ExpiredSignature => TokenInvalid::Expired,
                ErrorKind::MissingRequiredClaim(_) => TokenInvalid::MissingClaim,
                _ => TokenInvalid::Malformed,
            },
        )?;

        if data.claims.sub.trim().is_empty() {
            return Err(TokenInvalid::MissingClaim);
        }

        Ok(data.claims)
    }

    /// `validate` plus a check that the token was minted for `purpose`
    pub fn validate_for(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<TokenClaims, TokenInvalid> {
        let claims = self.validate(token)?;
        match claims.purpose {
            Some(p) if p == purpose => Ok(claims),
            Some(_) => Err(TokenInvalid::WrongPurpose),
            None => Err(TokenInvalid::MissingClaim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&Secret::new("test-secret-key-for-testing-only"))
    }

    fn sign_raw(claims: &serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_then_validate_returns_claims() {
        let tokens = service();
        let issued = tokens
            .issue("a@x.com", Some("U_ABCDEFGH"), TokenPurpose::Session, Duration::hours(1))
            .unwrap();

        let claims = tokens.validate(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.id.as_deref(), Some("U_ABCDEFGH"));
        assert_eq!(claims.exp.unwrap() - claims.iat.unwrap(), 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let issued = tokens
            .issue("a@x.com", None, TokenPurpose::Session, Duration::seconds(-10))
            .unwrap();

        assert_eq!(tokens.validate(&issued.token), Err(TokenInvalid::Expired));
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let issued = service()
            .issue("a@x.com", None, TokenPurpose::Session, Duration::hours(1))
            .unwrap();

        let other = TokenService::new(&Secret::new("wrong-secret"));
        assert_eq!(other.validate(&issued.token), Err(TokenInvalid::BadSignature));
    }

    #[test]
    fn test_tampered_payload_is_bad_signature() {
        let tokens = service();
        let issued = tokens
            .issue("a@x.com", None, TokenPurpose::Session, Duration::hours(1))
            .unwrap();

        // Re-sign a different payload with another key and splice in the original signature
        let forged_body = sign_raw(
            &serde_json::json!({ "sub": "admin@x.com", "exp": issued.claims.exp, "purpose": "session" }),
            "attacker",
        );
        let original_sig = issued.token.rsplit('.').next().unwrap();
        let mut parts: Vec<&str> = forged_body.split('.').collect();
        parts[2] = original_sig;
        let forged = parts.join(".");

        assert_eq!(tokens.validate(&forged), Err(TokenInvalid::BadSignature));
    }

    #[test]
    fn test_expired_and_forged_reports_signature_first() {
        let tokens = service();
        let token = sign_raw(
            &serde_json::json!({ "sub": "a@x.com", "exp": 1 }),
            "attacker",
        );
        assert_eq!(tokens.validate(&token), Err(TokenInvalid::BadSignature));
    }

    #[test]
    fn test_missing_exp_is_missing_claim() {
        let tokens = service();
        let token = sign_raw(
            &serde_json::json!({ "sub": "a@x.com" }),
            "test-secret-key-for-testing-only",
        );
        assert_eq!(tokens.validate(&token), Err(TokenInvalid::MissingClaim));
    }

    #[test]
    fn test_missing_or_empty_subject_is_missing_claim() {
        let tokens = service();
        let exp = (Utc::now() + Duration::hours(1)).timestamp();

        let no_sub = sign_raw(
            &serde_json::json!({ "exp": exp }),
            "test-secret-key-for-testing-only",
        );
        assert_eq!(tokens.validate(&no_sub), Err(TokenInvalid::MissingClaim));

        let empty_sub = sign_raw(
            &serde_json::json!({ "sub": "", "exp": exp }),
            "test-secret-key-for-testing-only",
        );
        assert_eq!(tokens.validate(&empty_sub), Err(TokenInvalid::MissingClaim));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service();
        assert_eq!(tokens.validate("invalid-token"), Err(TokenInvalid::Malformed));
        assert_eq!(tokens.validate(""), Err(TokenInvalid::Malformed));
        assert_eq!(tokens.validate("a.b.c"), Err(TokenInvalid::Malformed));
    }

    #[test]
    fn test_validate_for_checks_purpose() {
        let tokens = service();
        let verification = tokens
            .issue(
                "a@x.com",
                Some("U_ABCDEFGH"),
                TokenPurpose::EmailVerification,
                Duration::minutes(3),
            )
            .unwrap();

        assert!(tokens
            .validate_for(&verification.token, TokenPurpose::EmailVerification)
            .is_ok());
        assert_eq!(
            tokens.validate_for(&verification.token, TokenPurpose::Session),
            Err(TokenInvalid::WrongPurpose)
        );

        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let no_purpose = sign_raw(
            &serde_json::json!({ "sub": "a@x.com", "exp": exp }),
            "test-secret-key-for-testing-only",
        );
        assert_eq!(
            tokens.validate_for(&no_purpose, TokenPurpose::Session),
            Err(TokenInvalid::MissingClaim)
        );
    }
}
