//! Authentication extractors for Axum
//!
//! Two bearer policies differ only in what happens when the Authorization header
//! is missing or not a Bearer credential:
//! - [`OptionalBearer`] yields `None` and lets the caller decide
//! - [`StrictBearer`] rejects the request with 403 straight away

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::error::AuthError;
use super::models::Identity;
use crate::common::{ApiError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    /// No header, empty header, or a scheme with no credentials
    Missing,
    /// Credentials present under a scheme other than Bearer
    WrongScheme,
}

/// Split `Authorization: <scheme> <credentials>` and require the Bearer scheme
pub fn bearer_credentials(headers: &HeaderMap) -> Result<String, BearerError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(BearerError::Missing)?;

    let (scheme, credentials) = value.split_once(' ').ok_or(BearerError::Missing)?;
    let credentials = credentials.trim();
    if scheme.is_empty() || credentials.is_empty() {
        return Err(BearerError::Missing);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::WrongScheme);
    }

    Ok(credentials.to_string())
}

/// Soft policy: the bearer token if there is a well-formed one
#[derive(Debug, Clone)]
pub struct OptionalBearer(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalBearer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalBearer(bearer_credentials(&parts.headers).ok()))
    }
}

/// Strict policy: a bearer token or an immediate 403
#[derive(Debug, Clone)]
pub struct StrictBearer(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for StrictBearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match bearer_credentials(&parts.headers) {
            Ok(token) => Ok(StrictBearer(token)),
            Err(BearerError::Missing) => {
                warn!("Request rejected: missing Authorization header");
                Err(ApiError::Forbidden("Invalid authorization token".into()))
            }
            Err(BearerError::WrongScheme) => {
                warn!("Request rejected: Authorization scheme is not Bearer");
                Err(ApiError::Forbidden("Invalid authentication token".into()))
            }
        }
    }
}

/// Authenticated user extractor
///
/// Takes the bearer token under the soft policy and runs it through the session
/// guard. Any rejection is a 401 with no detail; store failures are a 500.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let OptionalBearer(token) = OptionalBearer::from_request_parts(parts, state)
            .await
            .unwrap_or(OptionalBearer(None));

        let token = token.unwrap_or_default();
        match app_state.session_guard.authenticate(&token).await {
            Ok(identity) => {
                debug!(user_id = %identity.user.id, "User authentication successful via extractor");
                Ok(AuthedUser(identity))
            }
            Err(AuthError::Store(e)) => {
                error!(error = %e, "Credential store error during authentication");
                Err(ApiError::DatabaseError(e))
            }
            Err(_) => Err(ApiError::Unauthorized("Not authenticated".into())),
        }
    }
}
