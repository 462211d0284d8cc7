//! Authentication failure taxonomy.
//!
//! Variants map onto client-facing responses through `ApiError`; none of them carry
//! internal detail that would be safe to echo back.

use std::fmt;
use thiserror::Error;

use super::store::StoreError;

/// Why a token was refused by the token service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenInvalid {
    BadSignature,
    Expired,
    MissingClaim,
    Malformed,
    /// Valid token minted for a different use (e.g. an email verification token
    /// presented as a session token)
    WrongPurpose,
}

impl fmt::Display for TokenInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            TokenInvalid::BadSignature => "bad signature",
            TokenInvalid::Expired => "expired",
            TokenInvalid::MissingClaim => "missing claim",
            TokenInvalid::Malformed => "malformed",
            TokenInvalid::WrongPurpose => "wrong purpose",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("username already taken")]
    DuplicateUsername,

    /// Wrong password, unknown email, inactive or provider-only account
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token invalid: {0}")]
    TokenInvalid(TokenInvalid),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("user not found")]
    UserNotFound,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
}

impl From<TokenInvalid> for AuthError {
    fn from(reason: TokenInvalid) -> Self {
        AuthError::TokenInvalid(reason)
    }
}
